use std::path::Path;
use std::process;

use crate::{compile_or_exit, report_error, InputFormat, OutputFormat};

pub(crate) fn cmd_compile(
    file: &Path,
    format: Option<InputFormat>,
    out: Option<&Path>,
    manifest: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let compiled = compile_or_exit(file, format, output, quiet);

    let text = if manifest {
        let wrapped = crate::manifest::build_manifest(compiled.document, &compiled.id);
        match serde_json::to_string_pretty(&wrapped) {
            Ok(text) => text,
            Err(e) => {
                report_error(&format!("serialization error: {}", e), output, quiet);
                process::exit(1);
            }
        }
    } else {
        compiled.json
    };

    match out {
        Some(path) => {
            if let Err(e) = std::fs::write(path, format!("{}\n", text)) {
                let msg = format!("error writing '{}': {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
            tracing::debug!(path = %path.display(), "wrote definition");
        }
        None => println!("{}", text),
    }
}

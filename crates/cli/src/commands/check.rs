use std::path::Path;

use crate::{compile_or_exit, InputFormat, OutputFormat};

pub(crate) fn cmd_check(file: &Path, format: Option<InputFormat>, output: OutputFormat, quiet: bool) {
    let compiled = compile_or_exit(file, format, output, quiet);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => println!("valid"),
        OutputFormat::Json => println!(
            "{}",
            serde_json::json!({
                "valid": true,
                "states": compiled.definition.states.len(),
                "id": compiled.id,
            })
        ),
    }
}

use std::path::Path;

use crate::{compile_or_exit, InputFormat, OutputFormat};

pub(crate) fn cmd_id(file: &Path, format: Option<InputFormat>, output: OutputFormat, quiet: bool) {
    let compiled = compile_or_exit(file, format, output, quiet);
    match output {
        OutputFormat::Text => println!("{}", compiled.id),
        OutputFormat::Json => println!("{}", serde_json::json!({ "id": compiled.id })),
    }
}

mod commands;
mod manifest;

use std::path::PathBuf;
use std::process;

use asl_core::{CompileError, CompiledDefinition, DocumentFormat};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Input document syntax, overriding the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum InputFormat {
    Json,
    Toml,
}

impl From<InputFormat> for DocumentFormat {
    fn from(format: InputFormat) -> Self {
        match format {
            InputFormat::Json => DocumentFormat::Json,
            InputFormat::Toml => DocumentFormat::Toml,
        }
    }
}

/// Amazon States Language definition compiler.
#[derive(Parser)]
#[command(name = "asl", version, about = "Amazon States Language definition compiler")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Log compiler progress to stderr
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile a definition to canonical ASL JSON
    Compile {
        /// Path to the JSON or TOML definition
        file: PathBuf,
        /// Input format (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
        /// Write the document to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Wrap the document with its content identifier
        #[arg(long)]
        manifest: bool,
    },

    /// Check that a definition compiles without printing it
    Check {
        /// Path to the JSON or TOML definition
        file: PathBuf,
        /// Input format (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
    },

    /// Print the content identifier of a compiled definition
    Id {
        /// Path to the JSON or TOML definition
        file: PathBuf,
        /// Input format (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<InputFormat>,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Compile {
            file,
            format,
            out,
            manifest,
        } => {
            commands::compile::cmd_compile(
                &file,
                format,
                out.as_deref(),
                manifest,
                cli.output,
                cli.quiet,
            );
        }
        Commands::Check { file, format } => {
            commands::check::cmd_check(&file, format, cli.output, cli.quiet);
        }
        Commands::Id { file, format } => {
            commands::id::cmd_id(&file, format, cli.output, cli.quiet);
        }
    }
}

/// Logs go to stderr so stdout carries only the document. `ASL_LOG`
/// overrides the level; `--verbose` lowers the default to debug.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("ASL_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Compile `file`, honoring an explicit format override. On failure the
/// error is reported and the process exits with status 1.
pub(crate) fn compile_or_exit(
    file: &std::path::Path,
    format: Option<InputFormat>,
    output: OutputFormat,
    quiet: bool,
) -> CompiledDefinition {
    let result = match format {
        None => asl_core::compile_path(file),
        Some(format) => std::fs::read_to_string(file)
            .map_err(|e| {
                CompileError::document(format!("failed to read {}: {}", file.display(), e))
            })
            .and_then(|text| asl_core::compile_str(&text, format.into())),
    };
    match result {
        Ok(compiled) => compiled,
        Err(e) => {
            report_compile_error(&e, output, quiet);
            process::exit(1);
        }
    }
}

pub(crate) fn report_compile_error(e: &CompileError, output: OutputFormat, quiet: bool) {
    match output {
        OutputFormat::Json => {
            let err_json = serde_json::to_string_pretty(&e.to_json_value())
                .unwrap_or_else(|_| serde_json::json!({ "error": e.to_string() }).to_string());
            eprintln!("{}", err_json);
        }
        OutputFormat::Text => {
            if !quiet {
                eprintln!("error: {}", e);
            }
        }
    }
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("{}", msg),
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
    }
}

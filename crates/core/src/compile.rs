//! Pipeline orchestrator: configuration document -> canonical ASL JSON.

use crate::ast::StateMachineDefinition;
use crate::error::CompileError;
use crate::field::FieldMap;
use crate::identity::definition_id;
use crate::pass1_schema;
use crate::pass3_assemble;
use crate::pass4_serialize;
use crate::source::{self, DocumentFormat, SourceProvider};
use serde_json::Value;
use std::path::Path;

/// Everything produced by one successful compilation.
#[derive(Debug, Clone)]
pub struct CompiledDefinition {
    pub definition: StateMachineDefinition,
    /// Serialized document, keys in canonical order.
    pub document: Value,
    /// Canonical pretty-printed text of `document`.
    pub json: String,
    /// Hex SHA-256 of `json`.
    pub id: String,
}

/// Compile a raw configuration document.
pub fn compile(raw: &Value) -> Result<CompiledDefinition, CompileError> {
    // Pass 1: schema check, defaults
    let fields = pass1_schema::check_definition(raw)?;
    compile_fields(&fields)
}

/// Compile an already shape-checked field map. Passes 2 and 3 run here.
pub fn compile_fields(fields: &FieldMap) -> Result<CompiledDefinition, CompileError> {
    let definition = pass3_assemble::assemble_definition(fields)?;

    // Pass 4: serialization
    let document = pass4_serialize::serialize(&definition);
    let json = pass4_serialize::render(&document)?;
    let id = definition_id(&json);

    tracing::info!(
        id = %id,
        states = definition.states.len(),
        start_at = %definition.start_at,
        "compiled state machine"
    );

    Ok(CompiledDefinition {
        definition,
        document,
        json,
        id,
    })
}

/// Compile document text in the given format.
pub fn compile_str(text: &str, format: DocumentFormat) -> Result<CompiledDefinition, CompileError> {
    let raw = source::parse_document(text, format)?;
    compile(&raw)
}

/// Compile the document at `path` from the filesystem.
pub fn compile_path(path: &Path) -> Result<CompiledDefinition, CompileError> {
    compile_with_provider(path, &source::FileSystemProvider)
}

/// Compile the document at `path` using a caller-supplied provider.
pub fn compile_with_provider(
    path: &Path,
    provider: &dyn SourceProvider,
) -> Result<CompiledDefinition, CompileError> {
    let raw = source::load_document(provider, path)?;
    compile(&raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryProvider;
    use serde_json::json;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn identical_input_yields_identical_output() {
        let raw = json!({
            "start_at": "A",
            "pass": [{"name": "A", "next": "B"}],
            "succeed": [{"name": "B"}]
        });
        let first = compile(&raw).unwrap();
        let second = compile(&raw).unwrap();
        assert_eq!(first.json, second.json);
        assert_eq!(first.id, second.id);
        assert_eq!(first.id.len(), 64);
    }

    #[test]
    fn compile_fields_skips_the_schema() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("state", vec![FieldMap::new().with("name", "A")]);
        let compiled = compile_fields(&fields).unwrap();
        assert_eq!(compiled.document["Version"], "1.0");
        assert_eq!(compiled.document["States"]["A"], json!({}));
    }

    #[test]
    fn json_and_toml_agree() {
        let from_json = compile_str(
            r#"{"start_at": "W", "wait": [{"name": "W", "end": true, "seconds": 5}]}"#,
            DocumentFormat::Json,
        )
        .unwrap();
        let from_toml = compile_str(
            "start_at = \"W\"\n\n[[wait]]\nname = \"W\"\nend = true\nseconds = 5\n",
            DocumentFormat::Toml,
        )
        .unwrap();
        assert_eq!(from_json.json, from_toml.json);
    }

    #[test]
    fn provider_paths_pick_the_format() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("/m.toml"),
            "start_at = \"A\"\n\n[[state]]\nname = \"A\"\n".to_owned(),
        );
        let provider = InMemoryProvider::new(files);
        let compiled = compile_with_provider(Path::new("/m.toml"), &provider).unwrap();
        assert_eq!(compiled.definition.start_at, "A");
    }

    #[test]
    fn no_partial_output_on_error() {
        let raw = json!({
            "start_at": "A",
            "pass": [{"name": "A", "next": "B", "end": true}]
        });
        assert!(compile(&raw).is_err());
    }
}

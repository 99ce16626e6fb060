//! Configuration sources.
//!
//! The [`SourceProvider`] trait abstracts file I/O so a definition can be
//! compiled from disk or from an in-memory map (tests, embedding hosts).
//! Documents are JSON or TOML; both are normalized to a `serde_json::Value`
//! before schema checking.

use crate::error::CompileError;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Syntax of a configuration document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Toml,
}

impl DocumentFormat {
    /// Guess the format from a file extension. Anything other than `.toml`
    /// is read as JSON.
    pub fn from_path(path: &Path) -> DocumentFormat {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("toml") => DocumentFormat::Toml,
            _ => DocumentFormat::Json,
        }
    }
}

pub trait SourceProvider {
    /// Read the document text at `path`.
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error>;
}

/// Filesystem-backed provider.
pub struct FileSystemProvider;

impl SourceProvider for FileSystemProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        std::fs::read_to_string(path)
    }
}

/// Maps paths to document text without touching the filesystem.
pub struct InMemoryProvider {
    files: HashMap<PathBuf, String>,
}

impl InMemoryProvider {
    pub fn new(files: HashMap<PathBuf, String>) -> Self {
        Self { files }
    }

    /// Resolve `.` and `..` lexically.
    fn normalize_path(path: &Path) -> PathBuf {
        let mut components = Vec::new();
        for component in path.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    components.pop();
                }
                other => components.push(other),
            }
        }
        components.iter().collect()
    }
}

impl SourceProvider for InMemoryProvider {
    fn read_source(&self, path: &Path) -> Result<String, std::io::Error> {
        let normalized = Self::normalize_path(path);
        self.files.get(&normalized).cloned().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found in memory: {}", normalized.display()),
            )
        })
    }
}

/// Parse document text into a JSON value.
pub fn parse_document(text: &str, format: DocumentFormat) -> Result<Value, CompileError> {
    match format {
        DocumentFormat::Json => serde_json::from_str(text)
            .map_err(|e| CompileError::document(format!("failed to parse JSON document: {}", e))),
        DocumentFormat::Toml => {
            let value: toml::Value = toml::from_str(text).map_err(|e| {
                CompileError::document(format!("failed to parse TOML document: {}", e))
            })?;
            Ok(toml_value_to_json(value))
        }
    }
}

/// Read and parse the document at `path`, picking the format from its
/// extension.
pub fn load_document(provider: &dyn SourceProvider, path: &Path) -> Result<Value, CompileError> {
    let text = provider.read_source(path).map_err(|e| {
        CompileError::document(format!("failed to read {}: {}", path.display(), e))
    })?;
    tracing::debug!(path = %path.display(), bytes = text.len(), "loaded document");
    parse_document(&text, DocumentFormat::from_path(path))
}

/// TOML has no null; datetimes are carried as their RFC 3339 text.
fn toml_value_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => serde_json::json!(i),
        toml::Value::Float(f) => serde_json::json!(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_value_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_value_to_json(v)))
                .collect(),
        ),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_path_resolves_dot_and_dotdot() {
        let normalized = InMemoryProvider::normalize_path(Path::new("/a/b/../c/./d.json"));
        assert_eq!(normalized, PathBuf::from("/a/c/d.json"));
    }

    #[test]
    fn in_memory_read_source_not_found() {
        let provider = InMemoryProvider::new(HashMap::new());
        let err = provider.read_source(Path::new("/missing.json")).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("m.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("m.TOML")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("m.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("m")), DocumentFormat::Json);
    }

    #[test]
    fn toml_documents_become_json() {
        let text = r#"
start_at = "Wait"

[[wait]]
name = "Wait"
end = true
timestamp = 2016-03-14T01:59:00Z
"#;
        let value = parse_document(text, DocumentFormat::Toml).unwrap();
        assert_eq!(value["start_at"], "Wait");
        assert_eq!(value["wait"][0]["end"], json!(true));
        assert_eq!(value["wait"][0]["timestamp"], "2016-03-14T01:59:00Z");
    }

    #[test]
    fn load_document_reads_through_the_provider() {
        let mut files = HashMap::new();
        files.insert(
            PathBuf::from("/defs/hello.json"),
            r#"{"start_at": "A"}"#.to_owned(),
        );
        let provider = InMemoryProvider::new(files);
        let value = load_document(&provider, Path::new("/defs/./hello.json")).unwrap();
        assert_eq!(value, json!({"start_at": "A"}));
    }

    #[test]
    fn parse_errors_are_document_errors() {
        let err = parse_document("{", DocumentFormat::Json).unwrap_err();
        assert_eq!(err.kind.code(), "document");
    }
}

use serde::Serialize;
use std::fmt;

/// What went wrong, independent of where in the definition it happened.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// A field is missing, unknown, or has the wrong primitive kind.
    #[error("{0}")]
    Shape(String),
    /// `next`/`end` both set or both unset.
    #[error("{0}")]
    Exclusivity(String),
    /// Both members of a seconds/seconds-path pair are set on a Task.
    #[error("{0}")]
    Conflict(String),
    /// A JSON-text field (`result`, `parameters`, `comparison`) does not parse.
    #[error("invalid {field} JSON: {message}")]
    InvalidJson { field: String, message: String },
    #[error("unknown state type '{0}'")]
    UnknownType(String),
    #[error("parallel states nest deeper than the maximum of {max} levels")]
    MaxDepthExceeded { max: usize },
    #[error("duplicate state name '{name}' (declared as {first} and {second})")]
    DuplicateState {
        name: String,
        first: &'static str,
        second: &'static str,
    },
    /// The input document could not be read, parsed, or rendered.
    #[error("{0}")]
    Document(String),
}

impl ErrorKind {
    /// Stable identifier used in machine-readable error reports.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Shape(_) => "shape",
            ErrorKind::Exclusivity(_) => "exclusivity",
            ErrorKind::Conflict(_) => "conflict",
            ErrorKind::InvalidJson { .. } => "invalid_json",
            ErrorKind::UnknownType(_) => "unknown_type",
            ErrorKind::MaxDepthExceeded { .. } => "max_depth_exceeded",
            ErrorKind::DuplicateState { .. } => "duplicate_state",
            ErrorKind::Document(_) => "document",
        }
    }
}

/// One step on the way from the root of the definition to the failing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    State(String),
    Branch(usize),
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::State(name) => f.write_str(name),
            Frame::Branch(index) => write!(f, "branch[{}]", index),
        }
    }
}

/// A compilation error. Compilation is all-or-nothing: the first error
/// aborts the run and no partial document is produced.
///
/// `context` is ordered outermost first, so a failure inside the second
/// branch of a Parallel state named `Fan` renders as
/// `Fan: branch[1]: Inner: <cause>`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileError {
    pub kind: ErrorKind,
    pub context: Vec<Frame>,
}

/// Serializable form of a [`CompileError`].
#[derive(Debug, Clone, Serialize)]
pub struct ErrorReport {
    pub kind: &'static str,
    pub path: Vec<String>,
    pub message: String,
}

impl CompileError {
    pub fn new(kind: ErrorKind) -> Self {
        CompileError {
            kind,
            context: Vec::new(),
        }
    }

    pub fn shape(message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Shape(message.into()))
    }

    pub fn exclusivity(message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Exclusivity(message.into()))
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Conflict(message.into()))
    }

    pub fn invalid_json(field: impl Into<String>, message: impl fmt::Display) -> Self {
        CompileError::new(ErrorKind::InvalidJson {
            field: field.into(),
            message: message.to_string(),
        })
    }

    pub fn document(message: impl Into<String>) -> Self {
        CompileError::new(ErrorKind::Document(message.into()))
    }

    /// Prefix the error with the name of the state it occurred in.
    pub fn in_state(mut self, name: &str) -> Self {
        self.context.insert(0, Frame::State(name.to_owned()));
        self
    }

    /// Prefix the error with the index of the Parallel branch it occurred in.
    pub fn in_branch(mut self, index: usize) -> Self {
        self.context.insert(0, Frame::Branch(index));
        self
    }

    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            kind: self.kind.code(),
            path: self.context.iter().map(Frame::to_string).collect(),
            message: self.to_string(),
        }
    }

    /// Render the error as a JSON object with `kind`, `path` and `message`.
    pub fn to_json_value(&self) -> serde_json::Value {
        serde_json::to_value(self.report()).unwrap_or_else(|_| {
            serde_json::json!({
                "kind": self.kind.code(),
                "message": self.to_string(),
            })
        })
    }
}

impl From<ErrorKind> for CompileError {
    fn from(kind: ErrorKind) -> Self {
        CompileError::new(kind)
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for frame in &self.context {
            write!(f, "{}: ", frame)?;
        }
        write!(f, "{}", self.kind)
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_render_outermost_first() {
        let err = CompileError::exclusivity("state has both next and end set")
            .in_state("Inner")
            .in_branch(1)
            .in_state("Fan");
        assert_eq!(
            err.to_string(),
            "Fan: branch[1]: Inner: state has both next and end set"
        );
    }

    #[test]
    fn json_report_carries_kind_and_path() {
        let err = CompileError::invalid_json("result", "expected value").in_state("P");
        let report = err.to_json_value();
        assert_eq!(report["kind"], "invalid_json");
        assert_eq!(report["path"], serde_json::json!(["P"]));
        assert_eq!(report["message"], "P: invalid result JSON: expected value");
    }
}

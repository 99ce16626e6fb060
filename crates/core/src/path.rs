//! Path normalization for optional JSON-Path fields.
//!
//! `InputPath`, `OutputPath`, `ResultPath` and `ResultSelector` are
//! three-valued, which a plain `Option<String>` cannot express:
//!
//! | raw     | [`PathExpr`]     | emitted                 |
//! |---------|------------------|-------------------------|
//! | `"$"`   | `Default`        | key omitted             |
//! | `""`    | `Null`           | key present, `null`     |
//! | `"$.x"` | `Value("$.x")`   | key present, `"$.x"`    |

/// The identity path. Fields set to it are left out of the document.
pub const DEFAULT_PATH: &str = "$";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PathExpr {
    /// Whole input/output; not serialized.
    #[default]
    Default,
    /// Explicit suppression; serialized as JSON `null`.
    Null,
    Value(String),
}

impl PathExpr {
    pub fn is_default(&self) -> bool {
        matches!(self, PathExpr::Default)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PathExpr::Value(s) => Some(s),
            _ => None,
        }
    }
}

/// Map a raw configuration string onto its [`PathExpr`].
///
/// No JSON-Path syntax checks happen here; the `$` prefix is enforced by the
/// schema layer.
pub fn normalize_path(raw: &str) -> PathExpr {
    match raw {
        "" => PathExpr::Null,
        DEFAULT_PATH => PathExpr::Default,
        other => PathExpr::Value(other.to_owned()),
    }
}

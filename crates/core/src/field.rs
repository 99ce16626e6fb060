//! Typed field maps: the interface between the configuration front end and
//! the state readers.
//!
//! By the time a [`FieldMap`] reaches a reader, every value has already been
//! coerced to the primitive kind the schema registry declares for it. The
//! accessors still check kinds and report a `Shape` error instead of
//! panicking, so a hand-built map with a wrong kind fails cleanly.
//!
//! Absent fields read as the zero value of their kind (`""`, `false`, `0`,
//! empty list), mirroring how the front end fills unset optional fields.

use crate::error::CompileError;
use std::collections::{BTreeMap, BTreeSet};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// Unordered collection of unique strings (e.g. retrier `errors`).
    StringSet(BTreeSet<String>),
    /// Ordered list of nested blocks (e.g. repeated `pass` entries).
    Blocks(Vec<FieldMap>),
}

impl FieldValue {
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::Str(_) => "string",
            FieldValue::Int(_) => "integer",
            FieldValue::Float(_) => "float",
            FieldValue::Bool(_) => "bool",
            FieldValue::StringSet(_) => "string set",
            FieldValue::Blocks(_) => "block list",
        }
    }

    /// Build a string set from any iterator of string-likes.
    pub fn set<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldValue::StringSet(items.into_iter().map(Into::into).collect())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Str(s.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Str(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Int(n)
    }
}

impl From<f64> for FieldValue {
    fn from(f: f64) -> Self {
        FieldValue::Float(f)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<Vec<FieldMap>> for FieldValue {
    fn from(blocks: Vec<FieldMap>) -> Self {
        FieldValue::Blocks(blocks)
    }
}

/// Mapping from field name to value for one configuration block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    fields: BTreeMap<String, FieldValue>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// String field; absent reads as `""`.
    pub fn str(&self, key: &str) -> Result<&str, CompileError> {
        match self.fields.get(key) {
            None => Ok(""),
            Some(FieldValue::Str(s)) => Ok(s),
            Some(other) => Err(wrong_kind(key, "a string", other)),
        }
    }

    /// String field where both absent and empty read as `None`.
    pub fn opt_str(&self, key: &str) -> Result<Option<&str>, CompileError> {
        let s = self.str(key)?;
        Ok(if s.is_empty() { None } else { Some(s) })
    }

    pub fn bool(&self, key: &str) -> Result<bool, CompileError> {
        match self.fields.get(key) {
            None => Ok(false),
            Some(FieldValue::Bool(b)) => Ok(*b),
            Some(other) => Err(wrong_kind(key, "a bool", other)),
        }
    }

    pub fn int(&self, key: &str) -> Result<i64, CompileError> {
        match self.fields.get(key) {
            None => Ok(0),
            Some(FieldValue::Int(n)) => Ok(*n),
            Some(other) => Err(wrong_kind(key, "an integer", other)),
        }
    }

    /// Integer field that must not be negative.
    pub fn uint(&self, key: &str) -> Result<u64, CompileError> {
        let n = self.int(key)?;
        u64::try_from(n)
            .map_err(|_| CompileError::shape(format!("field '{}' must be at least 0, got {}", key, n)))
    }

    /// Float field; integers are widened.
    pub fn float(&self, key: &str) -> Result<f64, CompileError> {
        match self.fields.get(key) {
            None => Ok(0.0),
            Some(FieldValue::Float(f)) => Ok(*f),
            Some(FieldValue::Int(n)) => Ok(*n as f64),
            Some(other) => Err(wrong_kind(key, "a number", other)),
        }
    }

    /// Block list field; absent reads as an empty list.
    pub fn blocks(&self, key: &str) -> Result<&[FieldMap], CompileError> {
        match self.fields.get(key) {
            None => Ok(&[]),
            Some(FieldValue::Blocks(blocks)) => Ok(blocks),
            Some(other) => Err(wrong_kind(key, "a list of blocks", other)),
        }
    }

    /// String set field, returned in sorted order.
    pub fn string_set(&self, key: &str) -> Result<Vec<String>, CompileError> {
        match self.fields.get(key) {
            None => Ok(Vec::new()),
            Some(FieldValue::StringSet(set)) => Ok(set.iter().cloned().collect()),
            Some(other) => Err(wrong_kind(key, "a set of strings", other)),
        }
    }
}

fn wrong_kind(key: &str, expected: &str, found: &FieldValue) -> CompileError {
    CompileError::shape(format!(
        "field '{}' must be {}, found {}",
        key,
        expected,
        found.kind_name()
    ))
}

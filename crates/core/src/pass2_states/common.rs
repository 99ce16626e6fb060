use crate::ast::{CommonFields, Transition};
use crate::error::CompileError;
use crate::field::FieldMap;
use crate::path::{normalize_path, PathExpr};
use serde_json::Value;
use std::collections::BTreeMap;

/// Read the fields shared by Pass, Wait, Task and Parallel states.
///
/// Exactly one of `next` and `end` must be set.
pub(super) fn read_common(fields: &FieldMap) -> Result<CommonFields, CompileError> {
    let next = fields.str("next")?;
    let end = fields.bool("end")?;

    let transition = match (next.is_empty(), end) {
        (true, false) => {
            return Err(CompileError::exclusivity(
                "state has neither next nor end set, exactly one must be specified",
            ))
        }
        (false, true) => {
            return Err(CompileError::exclusivity(format!(
                "state has both next ('{}') and end set, exactly one must be specified",
                next
            )))
        }
        (false, false) => Transition::Next(next.to_owned()),
        (true, true) => Transition::End,
    };

    Ok(CommonFields {
        transition,
        comment: read_comment(fields)?,
        input_path: read_path(fields, "input_path")?,
        output_path: read_path(fields, "output_path")?,
    })
}

pub(super) fn read_comment(fields: &FieldMap) -> Result<Option<String>, CompileError> {
    read_opt_string(fields, "comment")
}

pub(super) fn read_opt_string(fields: &FieldMap, key: &str) -> Result<Option<String>, CompileError> {
    Ok(fields.opt_str(key)?.map(str::to_owned))
}

/// An absent path field is the identity path; a present one goes through
/// the normalizer, so `""` becomes an explicit `null`.
pub(super) fn read_path(fields: &FieldMap, key: &str) -> Result<PathExpr, CompileError> {
    if !fields.contains_key(key) {
        return Ok(PathExpr::Default);
    }
    Ok(normalize_path(fields.str(key)?))
}

/// Parse a JSON-text field. Empty text means unset.
pub(super) fn read_json(fields: &FieldMap, key: &str) -> Result<Option<Value>, CompileError> {
    let text = fields.str(key)?;
    if text.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(text)
        .map(|value| Some(sort_keys(value)))
        .map_err(|e| CompileError::invalid_json(key, e))
}

/// Rebuild every object in `value` with its keys in sorted order, so
/// payloads that are equal as JSON render to the same text.
pub(super) fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

//! Pass 1: Schema registry and shape checking.
//!
//! The registry declares, per state type, which fields exist, their
//! primitive kind, whether they are required and what they default to.
//! [`check_definition`] walks a raw JSON document against it and produces a
//! typed [`FieldMap`] tree with defaults filled in, so the readers in later
//! passes can rely on every field having the declared kind.

use crate::ast::StateType;
use crate::error::{CompileError, ErrorKind};
use crate::field::{FieldMap, FieldValue};
use crate::path::DEFAULT_PATH;
use crate::{ASL_VERSION, MAX_PARALLEL_DEPTH};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

// ──────────────────────────────────────────────
// Registry types
// ──────────────────────────────────────────────

/// Primitive kind of a configuration field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Str,
    Int,
    Float,
    Bool,
    /// A string holding a JSON document, parsed by the readers.
    JsonText,
    StringSet,
    Blocks(BlockKind),
}

/// Shape of the nested blocks in a [`FieldKind::Blocks`] field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    ChoiceRule,
    Retrier,
    Catcher,
    /// A nested state collection one level deeper than its Parallel state.
    Branch,
}

/// Value constraint checked after kind coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    /// Empty, or begins with `$`.
    Path,
    NonNegative,
    Positive,
    Rfc3339,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub check: Option<Check>,
}

const fn optional(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
        default: None,
        check: None,
    }
}

const fn required(name: &'static str, kind: FieldKind) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: true,
        default: None,
        check: None,
    }
}

const fn checked(name: &'static str, kind: FieldKind, check: Check) -> FieldSpec {
    FieldSpec {
        name,
        kind,
        required: false,
        default: None,
        check: Some(check),
    }
}

/// Path field defaulting to the identity path.
const fn default_path(name: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        kind: FieldKind::Str,
        required: false,
        default: Some(DEFAULT_PATH),
        check: Some(Check::Path),
    }
}

/// Path field with no default; empty means unset.
const fn plain_path(name: &'static str) -> FieldSpec {
    checked(name, FieldKind::Str, Check::Path)
}

// ──────────────────────────────────────────────
// Registry tables
// ──────────────────────────────────────────────

pub const START_AT: FieldSpec = required("start_at", FieldKind::Str);

pub const ROOT_FIELDS: &[FieldSpec] = &[
    optional("comment", FieldKind::Str),
    FieldSpec {
        name: "version",
        kind: FieldKind::Str,
        required: false,
        default: Some(ASL_VERSION),
        check: None,
    },
    checked("timeout_seconds", FieldKind::Int, Check::NonNegative),
];

const NAME: FieldSpec = required("name", FieldKind::Str);
const COMMENT: FieldSpec = optional("comment", FieldKind::Str);

const COMMON_FIELDS: &[FieldSpec] = &[
    NAME,
    optional("next", FieldKind::Str),
    optional("end", FieldKind::Bool),
    COMMENT,
    default_path("input_path"),
    default_path("output_path"),
];

const BARE_FIELDS: &[FieldSpec] = &[NAME];

const PASS_FIELDS: &[FieldSpec] = &[
    optional("result", FieldKind::JsonText),
    default_path("result_path"),
    optional("parameters", FieldKind::JsonText),
];

const SUCCEED_FIELDS: &[FieldSpec] = &[NAME, COMMENT];

const FAIL_FIELDS: &[FieldSpec] = &[
    NAME,
    COMMENT,
    optional("cause", FieldKind::Str),
    optional("error", FieldKind::Str),
];

const CHOICE_FIELDS: &[FieldSpec] = &[
    required("option", FieldKind::Blocks(BlockKind::ChoiceRule)),
    optional("default", FieldKind::Str),
];

const WAIT_FIELDS: &[FieldSpec] = &[
    checked("seconds", FieldKind::Int, Check::NonNegative),
    checked("timestamp", FieldKind::Str, Check::Rfc3339),
    plain_path("seconds_path"),
    plain_path("timestamp_path"),
];

const TASK_FIELDS: &[FieldSpec] = &[
    required("resource", FieldKind::Str),
    optional("parameters", FieldKind::JsonText),
    default_path("result_path"),
    default_path("result_selector"),
    optional("retry", FieldKind::Blocks(BlockKind::Retrier)),
    optional("catch", FieldKind::Blocks(BlockKind::Catcher)),
    checked("timeout", FieldKind::Int, Check::Positive),
    plain_path("timeout_path"),
    checked("heartbeat", FieldKind::Int, Check::Positive),
    plain_path("heartbeat_path"),
];

const PARALLEL_FIELDS: &[FieldSpec] = &[
    required("branch", FieldKind::Blocks(BlockKind::Branch)),
    default_path("result_path"),
    default_path("result_selector"),
    optional("retry", FieldKind::Blocks(BlockKind::Retrier)),
    optional("catch", FieldKind::Blocks(BlockKind::Catcher)),
];

const CHOICE_RULE_FIELDS: &[FieldSpec] = &[
    required("next", FieldKind::Str),
    required("comparison", FieldKind::JsonText),
];

const RETRIER_FIELDS: &[FieldSpec] = &[
    required("errors", FieldKind::StringSet),
    checked("interval", FieldKind::Int, Check::NonNegative),
    checked("max_attempts", FieldKind::Int, Check::NonNegative),
    checked("backoff", FieldKind::Float, Check::NonNegative),
];

const CATCHER_FIELDS: &[FieldSpec] = &[
    required("errors", FieldKind::StringSet),
    required("next", FieldKind::Str),
];

/// Every field a block of the given state type may carry.
pub fn state_fields(ty: StateType) -> Vec<&'static FieldSpec> {
    let (common, own): (&'static [FieldSpec], &'static [FieldSpec]) = match ty {
        StateType::Bare => (&[], BARE_FIELDS),
        StateType::Pass => (COMMON_FIELDS, PASS_FIELDS),
        StateType::Succeed => (&[], SUCCEED_FIELDS),
        StateType::Fail => (&[], FAIL_FIELDS),
        StateType::Choice => (COMMON_FIELDS, CHOICE_FIELDS),
        StateType::Wait => (COMMON_FIELDS, WAIT_FIELDS),
        StateType::Task => (COMMON_FIELDS, TASK_FIELDS),
        StateType::Parallel => (COMMON_FIELDS, PARALLEL_FIELDS),
    };
    common.iter().chain(own.iter()).collect()
}

/// Fields of a non-state nested block. Branches are collections and are
/// described by [`collection_state_types`] instead.
pub fn block_fields(kind: BlockKind) -> &'static [FieldSpec] {
    match kind {
        BlockKind::ChoiceRule => CHOICE_RULE_FIELDS,
        BlockKind::Retrier => RETRIER_FIELDS,
        BlockKind::Catcher => CATCHER_FIELDS,
        BlockKind::Branch => &[START_AT],
    }
}

/// State types a collection at `depth` may contain. `parallel` is only
/// offered while another nesting level is allowed.
pub fn collection_state_types(depth: usize) -> impl Iterator<Item = StateType> {
    StateType::ALL
        .into_iter()
        .filter(move |ty| *ty != StateType::Parallel || depth < MAX_PARALLEL_DEPTH)
}

// ──────────────────────────────────────────────
// Shape checking
// ──────────────────────────────────────────────

/// Check a raw definition document against the registry.
pub fn check_definition(raw: &Value) -> Result<FieldMap, CompileError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| CompileError::shape("definition must be an object"))?;
    check_collection(obj, 0, ROOT_FIELDS)
}

fn check_collection(
    obj: &Map<String, Value>,
    depth: usize,
    extra: &[FieldSpec],
) -> Result<FieldMap, CompileError> {
    for key in obj.keys() {
        let known = key == START_AT.name
            || extra.iter().any(|spec| spec.name == key)
            || StateType::from_block_key(key).is_some();
        if !known {
            return Err(ErrorKind::UnknownType(key.clone()).into());
        }
    }

    let mut out = FieldMap::new();
    for spec in std::iter::once(&START_AT).chain(extra.iter()) {
        check_field(obj, spec, depth, &mut out)?;
    }

    for ty in StateType::ALL {
        let Some(value) = present(obj, ty.block_key()) else {
            continue;
        };
        let blocks = as_block_list(value, ty.block_key())?;
        if !collection_state_types(depth).any(|allowed| allowed == ty) {
            if let Some(first) = blocks.first() {
                let err = CompileError::new(ErrorKind::MaxDepthExceeded {
                    max: MAX_PARALLEL_DEPTH,
                });
                return Err(match block_name(first) {
                    Some(name) => err.in_state(name),
                    None => err,
                });
            }
        }
        let specs = state_fields(ty);
        let mut checked = Vec::with_capacity(blocks.len());
        for block in blocks {
            let fields = check_block(block, &specs, depth).map_err(|e| match block_name(block) {
                Some(name) => e.in_state(name),
                None => e,
            })?;
            checked.push(fields);
        }
        out.insert(ty.block_key(), FieldValue::Blocks(checked));
    }

    Ok(out)
}

fn check_block(
    obj: &Map<String, Value>,
    specs: &[&FieldSpec],
    depth: usize,
) -> Result<FieldMap, CompileError> {
    for key in obj.keys() {
        if !specs.iter().any(|spec| spec.name == key) {
            return Err(CompileError::shape(format!("unknown field '{}'", key)));
        }
    }
    let mut out = FieldMap::new();
    for spec in specs {
        check_field(obj, spec, depth, &mut out)?;
    }
    Ok(out)
}

fn check_field(
    obj: &Map<String, Value>,
    spec: &FieldSpec,
    depth: usize,
    out: &mut FieldMap,
) -> Result<(), CompileError> {
    match present(obj, spec.name) {
        Some(value) => {
            let coerced = coerce(spec, value, depth)?;
            if let Some(check) = spec.check {
                apply_check(spec.name, check, &coerced)?;
            }
            out.insert(spec.name, coerced);
        }
        None if spec.required => {
            return Err(CompileError::shape(format!(
                "missing required field '{}'",
                spec.name
            )));
        }
        None => {
            if let Some(default) = spec.default {
                out.insert(spec.name, default);
            }
        }
    }
    Ok(())
}

fn coerce(spec: &FieldSpec, value: &Value, depth: usize) -> Result<FieldValue, CompileError> {
    let name = spec.name;
    match spec.kind {
        FieldKind::Str => value
            .as_str()
            .map(FieldValue::from)
            .ok_or_else(|| wrong_kind(name, "a string", value)),
        FieldKind::Int => value
            .as_i64()
            .map(FieldValue::Int)
            .ok_or_else(|| wrong_kind(name, "an integer", value)),
        FieldKind::Float => value
            .as_f64()
            .map(FieldValue::Float)
            .ok_or_else(|| wrong_kind(name, "a number", value)),
        FieldKind::Bool => value
            .as_bool()
            .map(FieldValue::Bool)
            .ok_or_else(|| wrong_kind(name, "a bool", value)),
        // Inline structures are accepted and re-encoded so the readers only
        // ever see text.
        FieldKind::JsonText => match value {
            Value::String(s) => Ok(FieldValue::Str(s.clone())),
            other => serde_json::to_string(other)
                .map(FieldValue::Str)
                .map_err(|e| CompileError::invalid_json(name, e)),
        },
        FieldKind::StringSet => {
            let items = value
                .as_array()
                .ok_or_else(|| wrong_kind(name, "a list of strings", value))?;
            let mut set = BTreeSet::new();
            for item in items {
                let s = item
                    .as_str()
                    .ok_or_else(|| wrong_kind(name, "a list of strings", value))?;
                set.insert(s.to_owned());
            }
            Ok(FieldValue::StringSet(set))
        }
        FieldKind::Blocks(BlockKind::Branch) => {
            let blocks = as_block_list(value, name)?;
            let mut branches = Vec::with_capacity(blocks.len());
            for (i, block) in blocks.into_iter().enumerate() {
                branches.push(check_collection(block, depth + 1, &[]).map_err(|e| e.in_branch(i))?);
            }
            Ok(FieldValue::Blocks(branches))
        }
        FieldKind::Blocks(kind) => {
            let specs: Vec<&FieldSpec> = block_fields(kind).iter().collect();
            let blocks = as_block_list(value, name)?;
            let mut checked = Vec::with_capacity(blocks.len());
            for (i, block) in blocks.into_iter().enumerate() {
                let fields = check_block(block, &specs, depth).map_err(|e| {
                    if let ErrorKind::Shape(msg) = &e.kind {
                        return CompileError::shape(format!("{}[{}]: {}", name, i, msg));
                    }
                    e
                })?;
                checked.push(fields);
            }
            Ok(FieldValue::Blocks(checked))
        }
    }
}

fn apply_check(name: &str, check: Check, value: &FieldValue) -> Result<(), CompileError> {
    let ok = match (check, value) {
        (Check::Path, FieldValue::Str(s)) => s.is_empty() || s.starts_with('$'),
        (Check::NonNegative, FieldValue::Int(n)) => *n >= 0,
        (Check::NonNegative, FieldValue::Float(f)) => *f >= 0.0,
        (Check::Positive, FieldValue::Int(n)) => *n >= 1,
        (Check::Rfc3339, FieldValue::Str(s)) => {
            s.is_empty() || OffsetDateTime::parse(s, &Rfc3339).is_ok()
        }
        _ => true,
    };
    if ok {
        return Ok(());
    }
    let expectation = match check {
        Check::Path => "must be empty or a JSON Path beginning with '$'",
        Check::NonNegative => "must be at least 0",
        Check::Positive => "must be at least 1",
        Check::Rfc3339 => "must be an RFC 3339 timestamp",
    };
    Err(CompileError::shape(format!("field '{}' {}", name, expectation)))
}

/// A key counts as present unless it is missing or JSON `null`.
fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Repeated blocks arrive as a list of objects; a lone object is accepted
/// as a one-element list.
fn as_block_list<'a>(value: &'a Value, name: &str) -> Result<Vec<&'a Map<String, Value>>, CompileError> {
    match value {
        Value::Object(obj) => Ok(vec![obj]),
        Value::Array(items) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| wrong_kind(name, "a list of blocks", value))
            })
            .collect(),
        other => Err(wrong_kind(name, "a list of blocks", other)),
    }
}

fn block_name(block: &Map<String, Value>) -> Option<&str> {
    block.get("name").and_then(Value::as_str)
}

fn wrong_kind(name: &str, expected: &str, found: &Value) -> CompileError {
    let found = match found {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "block",
    };
    CompileError::shape(format!(
        "field '{}' must be {}, found {}",
        name, expected, found
    ))
}

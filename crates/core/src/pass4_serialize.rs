//! Pass 4: Canonical JSON serialization.
//!
//! Keys are inserted in a fixed order per object and `serde_json` is built
//! with `preserve_order`, so the rendered text is byte-for-byte stable for
//! a given definition. States come out sorted by name (they live in a
//! `BTreeMap`), and absent optional fields are left out entirely.

use crate::ast::*;
use crate::error::CompileError;
use crate::path::PathExpr;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

pub fn serialize(def: &StateMachineDefinition) -> Value {
    let mut m = Map::new();
    insert_opt_str(&mut m, "Comment", def.comment.as_deref());
    m.insert("StartAt".to_owned(), json!(def.start_at));
    if let Some(timeout) = def.timeout_seconds {
        m.insert("TimeoutSeconds".to_owned(), json!(timeout));
    }
    insert_opt_str(&mut m, "Version", def.version.as_deref());
    m.insert("States".to_owned(), serialize_states(&def.states));
    Value::Object(m)
}

/// Pretty-print a serialized document with two-space indentation.
pub fn render(document: &Value) -> Result<String, CompileError> {
    serde_json::to_string_pretty(document)
        .map_err(|e| CompileError::document(format!("failed to render definition: {}", e)))
}

fn serialize_states(states: &BTreeMap<String, StateNode>) -> Value {
    let mut m = Map::new();
    for (name, state) in states {
        m.insert(name.clone(), serialize_state(state));
    }
    Value::Object(m)
}

fn serialize_branch(branch: &Branch) -> Value {
    let mut m = Map::new();
    m.insert("StartAt".to_owned(), json!(branch.start_at));
    m.insert("States".to_owned(), serialize_states(&branch.states));
    Value::Object(m)
}

fn serialize_state(state: &StateNode) -> Value {
    let mut m = Map::new();
    if let Some(type_name) = state.state_type().type_name() {
        m.insert("Type".to_owned(), json!(type_name));
    }

    match state {
        StateNode::Bare => {}
        StateNode::Pass(p) => {
            insert_common(&mut m, &p.common);
            if let Some(result) = &p.result {
                m.insert("Result".to_owned(), result.clone());
            }
            insert_path(&mut m, "ResultPath", &p.result_path);
            if let Some(params) = &p.parameters {
                m.insert("Parameters".to_owned(), params.clone());
            }
        }
        StateNode::Succeed(s) => {
            insert_opt_str(&mut m, "Comment", s.comment.as_deref());
        }
        StateNode::Fail(f) => {
            insert_opt_str(&mut m, "Comment", f.comment.as_deref());
            insert_opt_str(&mut m, "Cause", f.cause.as_deref());
            insert_opt_str(&mut m, "Error", f.error.as_deref());
        }
        StateNode::Choice(c) => {
            insert_opt_str(&mut m, "Comment", c.comment.as_deref());
            insert_path(&mut m, "InputPath", &c.input_path);
            insert_path(&mut m, "OutputPath", &c.output_path);
            let choices: Vec<Value> = c.choices.iter().map(serialize_rule).collect();
            m.insert("Choices".to_owned(), Value::Array(choices));
            insert_opt_str(&mut m, "Default", c.default.as_deref());
        }
        StateNode::Wait(w) => {
            insert_common(&mut m, &w.common);
            let (key, value) = match &w.duration {
                WaitDuration::Timestamp(ts) => ("Timestamp", json!(ts)),
                WaitDuration::SecondsPath(p) => ("SecondsPath", json!(p)),
                WaitDuration::TimestampPath(p) => ("TimestampPath", json!(p)),
                WaitDuration::Seconds(n) => ("Seconds", json!(n)),
            };
            m.insert(key.to_owned(), value);
        }
        StateNode::Task(t) => {
            insert_common(&mut m, &t.common);
            m.insert("Resource".to_owned(), json!(t.resource));
            if let Some(params) = &t.parameters {
                m.insert("Parameters".to_owned(), params.clone());
            }
            insert_path(&mut m, "ResultPath", &t.result_path);
            insert_path(&mut m, "ResultSelector", &t.result_selector);
            insert_policies(&mut m, &t.retry, &t.catch);
            insert_timing(&mut m, "TimeoutSeconds", "TimeoutSecondsPath", t.timeout.as_ref());
            insert_timing(
                &mut m,
                "HeartbeatSeconds",
                "HeartbeatSecondsPath",
                t.heartbeat.as_ref(),
            );
        }
        StateNode::Parallel(p) => {
            insert_common(&mut m, &p.common);
            let branches: Vec<Value> = p.branches.iter().map(serialize_branch).collect();
            m.insert("Branches".to_owned(), Value::Array(branches));
            insert_path(&mut m, "ResultPath", &p.result_path);
            insert_path(&mut m, "ResultSelector", &p.result_selector);
            insert_policies(&mut m, &p.retry, &p.catch);
        }
    }
    Value::Object(m)
}

fn insert_common(m: &mut Map<String, Value>, common: &CommonFields) {
    match &common.transition {
        Transition::Next(next) => {
            m.insert("Next".to_owned(), json!(next));
        }
        Transition::End => {
            m.insert("End".to_owned(), json!(true));
        }
    }
    insert_opt_str(m, "Comment", common.comment.as_deref());
    insert_path(m, "InputPath", &common.input_path);
    insert_path(m, "OutputPath", &common.output_path);
}

/// A rule is flattened: the comparison's own keys in their written order,
/// then `Next`. A stray `Next` inside the comparison is overridden.
fn serialize_rule(rule: &ChoiceRule) -> Value {
    let mut m = Map::new();
    for (key, value) in &rule.comparison {
        if key != "Next" {
            m.insert(key.clone(), value.clone());
        }
    }
    m.insert("Next".to_owned(), json!(rule.next));
    Value::Object(m)
}

fn insert_policies(m: &mut Map<String, Value>, retry: &[Retrier], catch: &[Catcher]) {
    if !retry.is_empty() {
        let retriers: Vec<Value> = retry.iter().map(serialize_retrier).collect();
        m.insert("Retry".to_owned(), Value::Array(retriers));
    }
    if !catch.is_empty() {
        let catchers: Vec<Value> = catch.iter().map(serialize_catcher).collect();
        m.insert("Catch".to_owned(), Value::Array(catchers));
    }
}

fn serialize_retrier(r: &Retrier) -> Value {
    let mut m = Map::new();
    m.insert("ErrorEquals".to_owned(), json!(r.error_equals));
    if r.interval_seconds != 0 {
        m.insert("IntervalSeconds".to_owned(), json!(r.interval_seconds));
    }
    if r.max_attempts != 0 {
        m.insert("MaxAttempts".to_owned(), json!(r.max_attempts));
    }
    if r.backoff_rate != 0.0 {
        m.insert("BackoffRate".to_owned(), json!(r.backoff_rate));
    }
    Value::Object(m)
}

fn serialize_catcher(c: &Catcher) -> Value {
    let mut m = Map::new();
    m.insert("ErrorEquals".to_owned(), json!(c.error_equals));
    m.insert("Next".to_owned(), json!(c.next));
    Value::Object(m)
}

fn insert_timing(
    m: &mut Map<String, Value>,
    seconds_key: &str,
    path_key: &str,
    timing: Option<&Timing>,
) {
    match timing {
        Some(Timing::Seconds(n)) => {
            m.insert(seconds_key.to_owned(), json!(n));
        }
        Some(Timing::Path(p)) => {
            m.insert(path_key.to_owned(), json!(p));
        }
        None => {}
    }
}

fn insert_path(m: &mut Map<String, Value>, key: &str, path: &PathExpr) {
    match path {
        PathExpr::Default => {}
        PathExpr::Null => {
            m.insert(key.to_owned(), Value::Null);
        }
        PathExpr::Value(p) => {
            m.insert(key.to_owned(), json!(p));
        }
    }
}

fn insert_opt_str(m: &mut Map<String, Value>, key: &str, value: Option<&str>) {
    if let Some(s) = value {
        m.insert(key.to_owned(), json!(s));
    }
}

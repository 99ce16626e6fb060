//! Typed state-machine tree.
//!
//! These types are produced by the state readers and consumed by the
//! serializer. Every value is built once and never mutated afterwards;
//! ownership is strictly top-down (a Parallel state owns its branches,
//! each branch owns its states).

use crate::path::PathExpr;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

// ──────────────────────────────────────────────
// State types
// ──────────────────────────────────────────────

/// The closed set of state kinds a collection can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateType {
    /// Untyped placeholder carrying only a name; serializes to `{}`.
    Bare,
    Pass,
    Succeed,
    Fail,
    Choice,
    Wait,
    Task,
    Parallel,
}

impl StateType {
    /// Every state type, in the order collections are read.
    pub const ALL: [StateType; 8] = [
        StateType::Bare,
        StateType::Pass,
        StateType::Succeed,
        StateType::Fail,
        StateType::Choice,
        StateType::Wait,
        StateType::Task,
        StateType::Parallel,
    ];

    /// Configuration key holding the list of blocks of this type.
    pub fn block_key(self) -> &'static str {
        match self {
            StateType::Bare => "state",
            StateType::Pass => "pass",
            StateType::Succeed => "succeed",
            StateType::Fail => "fail",
            StateType::Choice => "choice",
            StateType::Wait => "wait",
            StateType::Task => "task",
            StateType::Parallel => "parallel",
        }
    }

    /// `Type` value written to the document. `None` for bare states.
    pub fn type_name(self) -> Option<&'static str> {
        match self {
            StateType::Bare => None,
            StateType::Pass => Some("Pass"),
            StateType::Succeed => Some("Succeed"),
            StateType::Fail => Some("Fail"),
            StateType::Choice => Some("Choice"),
            StateType::Wait => Some("Wait"),
            StateType::Task => Some("Task"),
            StateType::Parallel => Some("Parallel"),
        }
    }

    pub fn from_block_key(key: &str) -> Option<StateType> {
        StateType::ALL.into_iter().find(|t| t.block_key() == key)
    }
}

// ──────────────────────────────────────────────
// Definition and branches
// ──────────────────────────────────────────────

/// Root of a compiled state machine.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMachineDefinition {
    /// `None` when the configuration explicitly blanks the version.
    pub version: Option<String>,
    pub comment: Option<String>,
    pub start_at: String,
    pub timeout_seconds: Option<u64>,
    pub states: BTreeMap<String, StateNode>,
}

/// An independently rooted sub-machine run as one arm of a Parallel state.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub start_at: String,
    pub states: BTreeMap<String, StateNode>,
}

// ──────────────────────────────────────────────
// States
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum StateNode {
    Bare,
    Pass(PassState),
    Succeed(SucceedState),
    Fail(FailState),
    Choice(ChoiceState),
    Wait(WaitState),
    Task(TaskState),
    Parallel(ParallelState),
}

impl StateNode {
    pub fn state_type(&self) -> StateType {
        match self {
            StateNode::Bare => StateType::Bare,
            StateNode::Pass(_) => StateType::Pass,
            StateNode::Succeed(_) => StateType::Succeed,
            StateNode::Fail(_) => StateType::Fail,
            StateNode::Choice(_) => StateType::Choice,
            StateNode::Wait(_) => StateType::Wait,
            StateNode::Task(_) => StateType::Task,
            StateNode::Parallel(_) => StateType::Parallel,
        }
    }
}

/// Where control goes after a non-terminal, non-branching state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Next(String),
    End,
}

/// Fields shared by Pass, Wait, Task and Parallel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonFields {
    pub transition: Transition,
    pub comment: Option<String>,
    pub input_path: PathExpr,
    pub output_path: PathExpr,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PassState {
    pub common: CommonFields,
    pub result: Option<Value>,
    pub result_path: PathExpr,
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SucceedState {
    pub comment: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailState {
    pub comment: Option<String>,
    pub cause: Option<String>,
    pub error: Option<String>,
}

/// Choice states route through `choices`/`default` only, so they carry no
/// [`Transition`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceState {
    pub comment: Option<String>,
    pub input_path: PathExpr,
    pub output_path: PathExpr,
    pub choices: Vec<ChoiceRule>,
    pub default: Option<String>,
}

/// A comparison object whose keys are opaque to the compiler, plus the
/// state to go to when it matches. Serialized flat: the comparison's keys
/// sit alongside `Next`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChoiceRule {
    pub comparison: Map<String, Value>,
    pub next: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitDuration {
    Seconds(u64),
    Timestamp(String),
    SecondsPath(String),
    TimestampPath(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitState {
    pub common: CommonFields,
    pub duration: WaitDuration,
}

/// A Task timeout or heartbeat: a fixed number of seconds or a path into
/// the state input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Timing {
    Seconds(u64),
    Path(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskState {
    pub common: CommonFields,
    pub resource: String,
    pub parameters: Option<Value>,
    pub result_path: PathExpr,
    pub result_selector: PathExpr,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
    pub timeout: Option<Timing>,
    pub heartbeat: Option<Timing>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParallelState {
    pub common: CommonFields,
    pub branches: Vec<Branch>,
    pub result_path: PathExpr,
    pub result_selector: PathExpr,
    pub retry: Vec<Retrier>,
    pub catch: Vec<Catcher>,
}

// ──────────────────────────────────────────────
// Error handling policies
// ──────────────────────────────────────────────

/// Zero-valued numeric fields are treated as unset and omitted on output.
#[derive(Debug, Clone, PartialEq)]
pub struct Retrier {
    /// Sorted; the configuration supplies an unordered set.
    pub error_equals: Vec<String>,
    pub interval_seconds: u64,
    pub max_attempts: u64,
    pub backoff_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catcher {
    pub error_equals: Vec<String>,
    pub next: String,
}

//! Pass 2: Per-type state readers.
//!
//! Each reader turns one checked configuration block into a typed
//! [`StateNode`]. Dispatch is a static match over [`StateType`]; there is no
//! runtime table of reader functions.

mod choice;
mod common;
mod parallel;
mod pass;
mod policy;
mod task;
mod terminal;
mod wait;

use crate::ast::{StateNode, StateType};
use crate::error::CompileError;
use crate::field::FieldMap;

/// Read a single state block of type `ty` found in a collection at `depth`.
///
/// Errors are returned without the state's name; the caller knows it and
/// adds the frame.
pub fn read_state(ty: StateType, fields: &FieldMap, depth: usize) -> Result<StateNode, CompileError> {
    match ty {
        StateType::Bare => Ok(StateNode::Bare),
        StateType::Pass => pass::read_pass(fields).map(StateNode::Pass),
        StateType::Succeed => terminal::read_succeed(fields).map(StateNode::Succeed),
        StateType::Fail => terminal::read_fail(fields).map(StateNode::Fail),
        StateType::Choice => choice::read_choice(fields).map(StateNode::Choice),
        StateType::Wait => wait::read_wait(fields).map(StateNode::Wait),
        StateType::Task => task::read_task(fields).map(StateNode::Task),
        StateType::Parallel => parallel::read_parallel(fields, depth).map(StateNode::Parallel),
    }
}

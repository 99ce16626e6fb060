//! Succeed and Fail: terminal states with bespoke minimal readers.

use super::common::{read_comment, read_opt_string};
use crate::ast::{FailState, SucceedState};
use crate::error::CompileError;
use crate::field::FieldMap;

pub(super) fn read_succeed(fields: &FieldMap) -> Result<SucceedState, CompileError> {
    Ok(SucceedState {
        comment: read_comment(fields)?,
    })
}

pub(super) fn read_fail(fields: &FieldMap) -> Result<FailState, CompileError> {
    Ok(FailState {
        comment: read_comment(fields)?,
        cause: read_opt_string(fields, "cause")?,
        error: read_opt_string(fields, "error")?,
    })
}

//! Retry and Catch policies shared by Task and Parallel states.

use crate::ast::{Catcher, Retrier};
use crate::error::CompileError;
use crate::field::FieldMap;

pub(super) fn read_retriers(fields: &FieldMap) -> Result<Vec<Retrier>, CompileError> {
    fields
        .blocks("retry")?
        .iter()
        .enumerate()
        .map(|(i, block)| -> Result<Retrier, CompileError> {
            Ok(Retrier {
                error_equals: read_errors(block, "retry", i)?,
                interval_seconds: block.uint("interval")?,
                max_attempts: block.uint("max_attempts")?,
                backoff_rate: read_backoff(block, i)?,
            })
        })
        .collect()
}

pub(super) fn read_catchers(fields: &FieldMap) -> Result<Vec<Catcher>, CompileError> {
    fields
        .blocks("catch")?
        .iter()
        .enumerate()
        .map(|(i, block)| -> Result<Catcher, CompileError> {
            let next = block.str("next")?;
            if next.is_empty() {
                return Err(CompileError::shape(format!(
                    "catch[{}]: missing required field 'next'",
                    i
                )));
            }
            Ok(Catcher {
                error_equals: read_errors(block, "catch", i)?,
                next: next.to_owned(),
            })
        })
        .collect()
}

fn read_errors(block: &FieldMap, list: &str, index: usize) -> Result<Vec<String>, CompileError> {
    let errors = block.string_set("errors")?;
    if errors.is_empty() {
        return Err(CompileError::shape(format!(
            "{}[{}]: errors must name at least one error",
            list, index
        )));
    }
    Ok(errors)
}

fn read_backoff(block: &FieldMap, index: usize) -> Result<f64, CompileError> {
    let rate = block.float("backoff")?;
    if rate < 0.0 || !rate.is_finite() {
        return Err(CompileError::shape(format!(
            "retry[{}]: backoff must be a finite number of at least 0",
            index
        )));
    }
    Ok(rate)
}

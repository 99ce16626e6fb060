use super::common::{read_common, read_json, read_path};
use super::policy::{read_catchers, read_retriers};
use crate::ast::{TaskState, Timing};
use crate::error::CompileError;
use crate::field::FieldMap;

pub(super) fn read_task(fields: &FieldMap) -> Result<TaskState, CompileError> {
    let common = read_common(fields)?;

    let resource = fields.str("resource")?;
    if resource.is_empty() {
        return Err(CompileError::shape("missing required field 'resource'"));
    }

    Ok(TaskState {
        common,
        resource: resource.to_owned(),
        parameters: read_json(fields, "parameters")?,
        result_path: read_path(fields, "result_path")?,
        result_selector: read_path(fields, "result_selector")?,
        retry: read_retriers(fields)?,
        catch: read_catchers(fields)?,
        timeout: read_timing(fields, "timeout", "timeout_path")?,
        heartbeat: read_timing(fields, "heartbeat", "heartbeat_path")?,
    })
}

/// Read a seconds/seconds-path pair. A zero count and an empty path both
/// mean unset; setting both is a conflict.
fn read_timing(
    fields: &FieldMap,
    seconds_key: &str,
    path_key: &str,
) -> Result<Option<Timing>, CompileError> {
    let seconds = fields.uint(seconds_key)?;
    let path = fields.str(path_key)?;
    match (seconds != 0, !path.is_empty()) {
        (true, true) => Err(CompileError::conflict(format!(
            "both {} and {} are set ({}, {})",
            seconds_key, path_key, seconds, path
        ))),
        (true, false) => Ok(Some(Timing::Seconds(seconds))),
        (false, true) => Ok(Some(Timing::Path(path.to_owned()))),
        (false, false) => Ok(None),
    }
}

use super::common::read_common;
use crate::ast::{WaitDuration, WaitState};
use crate::error::CompileError;
use crate::field::FieldMap;

/// Read a Wait state.
///
/// Only one duration source should be configured. When several are, the
/// first non-empty one wins in the order `timestamp`, `seconds_path`,
/// `timestamp_path`; `seconds` is the fallback and is emitted even when 0.
pub(super) fn read_wait(fields: &FieldMap) -> Result<WaitState, CompileError> {
    let common = read_common(fields)?;

    let duration = if let Some(ts) = fields.opt_str("timestamp")? {
        WaitDuration::Timestamp(ts.to_owned())
    } else if let Some(path) = fields.opt_str("seconds_path")? {
        WaitDuration::SecondsPath(path.to_owned())
    } else if let Some(path) = fields.opt_str("timestamp_path")? {
        WaitDuration::TimestampPath(path.to_owned())
    } else {
        WaitDuration::Seconds(fields.uint("seconds")?)
    };

    Ok(WaitState { common, duration })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_is_the_fallback() {
        let wait = read_wait(&FieldMap::new().with("end", true)).unwrap();
        assert_eq!(wait.duration, WaitDuration::Seconds(0));

        let wait = read_wait(&FieldMap::new().with("end", true).with("seconds", 10i64)).unwrap();
        assert_eq!(wait.duration, WaitDuration::Seconds(10));
    }

    #[test]
    fn timestamp_beats_everything() {
        let fields = FieldMap::new()
            .with("end", true)
            .with("seconds", 5i64)
            .with("seconds_path", "$.s")
            .with("timestamp_path", "$.t")
            .with("timestamp", "2016-03-14T01:59:00Z");
        assert_eq!(
            read_wait(&fields).unwrap().duration,
            WaitDuration::Timestamp("2016-03-14T01:59:00Z".to_owned())
        );
    }

    #[test]
    fn seconds_path_beats_timestamp_path() {
        let fields = FieldMap::new()
            .with("next", "Done")
            .with("seconds_path", "$.s")
            .with("timestamp_path", "$.t");
        assert_eq!(
            read_wait(&fields).unwrap().duration,
            WaitDuration::SecondsPath("$.s".to_owned())
        );
    }

    #[test]
    fn timestamp_path_beats_seconds() {
        let fields = FieldMap::new()
            .with("end", true)
            .with("seconds", 5i64)
            .with("timestamp_path", "$.t");
        assert_eq!(
            read_wait(&fields).unwrap().duration,
            WaitDuration::TimestampPath("$.t".to_owned())
        );
    }
}

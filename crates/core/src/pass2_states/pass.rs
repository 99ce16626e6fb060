use super::common::{read_common, read_json, read_path};
use crate::ast::PassState;
use crate::error::CompileError;
use crate::field::FieldMap;

pub(super) fn read_pass(fields: &FieldMap) -> Result<PassState, CompileError> {
    Ok(PassState {
        common: read_common(fields)?,
        result: read_json(fields, "result")?,
        result_path: read_path(fields, "result_path")?,
        parameters: read_json(fields, "parameters")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::path::PathExpr;
    use serde_json::json;

    #[test]
    fn result_is_parsed() {
        let fields = FieldMap::new()
            .with("end", true)
            .with("result", r#"{"x-datum": 0.381018}"#)
            .with("result_path", "$.coords");
        let pass = read_pass(&fields).unwrap();
        assert_eq!(pass.result, Some(json!({"x-datum": 0.381018})));
        assert_eq!(pass.result_path, PathExpr::Value("$.coords".to_owned()));
        assert_eq!(pass.parameters, None);
    }

    #[test]
    fn scalar_results_are_allowed() {
        let fields = FieldMap::new().with("end", true).with("result", "42");
        assert_eq!(read_pass(&fields).unwrap().result, Some(json!(42)));
    }

    #[test]
    fn invalid_result_json_is_rejected() {
        let fields = FieldMap::new().with("end", true).with("result", "{");
        let err = read_pass(&fields).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidJson { ref field, .. } if field == "result"));
    }
}

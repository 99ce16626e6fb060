use super::common::{read_comment, read_opt_string, read_path, sort_keys};
use crate::ast::{ChoiceRule, ChoiceState};
use crate::error::CompileError;
use crate::field::FieldMap;
use serde_json::Value;

/// Choice states do not go through the common reader: they route through
/// their rules and `default`, so `next`/`end` are ignored here.
pub(super) fn read_choice(fields: &FieldMap) -> Result<ChoiceState, CompileError> {
    let options = fields.blocks("option")?;
    if options.is_empty() {
        return Err(CompileError::shape(
            "choice state requires at least one option",
        ));
    }

    let choices = options
        .iter()
        .enumerate()
        .map(|(i, option)| read_rule(i, option))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ChoiceState {
        comment: read_comment(fields)?,
        input_path: read_path(fields, "input_path")?,
        output_path: read_path(fields, "output_path")?,
        choices,
        default: read_opt_string(fields, "default")?,
    })
}

fn read_rule(index: usize, option: &FieldMap) -> Result<ChoiceRule, CompileError> {
    let label = format!("option[{}] comparison", index);
    let text = option.str("comparison")?;
    let comparison = match serde_json::from_str::<Value>(text).map(sort_keys) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            return Err(CompileError::invalid_json(
                label,
                "comparison must be a JSON object",
            ))
        }
        Err(e) => return Err(CompileError::invalid_json(label, e)),
    };

    let next = option.str("next")?;
    if next.is_empty() {
        return Err(CompileError::shape(format!(
            "option[{}]: missing required field 'next'",
            index
        )));
    }

    Ok(ChoiceRule {
        comparison,
        next: next.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use serde_json::json;

    fn option(comparison: &str, next: &str) -> FieldMap {
        FieldMap::new()
            .with("comparison", comparison)
            .with("next", next)
    }

    #[test]
    fn rules_keep_their_order() {
        let fields = FieldMap::new()
            .with(
                "option",
                vec![
                    option(r#"{"Variable": "$.value", "NumericEquals": 0}"#, "Zero"),
                    option(r#"{"Variable": "$.value", "NumericGreaterThan": 0}"#, "Positive"),
                ],
            )
            .with("default", "Negative");
        let choice = read_choice(&fields).unwrap();
        assert_eq!(choice.choices.len(), 2);
        assert_eq!(choice.choices[0].next, "Zero");
        assert_eq!(choice.choices[1].next, "Positive");
        assert_eq!(
            Value::Object(choice.choices[0].comparison.clone()),
            json!({"Variable": "$.value", "NumericEquals": 0})
        );
        assert_eq!(choice.default.as_deref(), Some("Negative"));
    }

    #[test]
    fn comparison_keys_are_sorted() {
        let fields = FieldMap::new().with(
            "option",
            vec![option(r#"{"Variable": "$.v", "NumericEquals": 1}"#, "A")],
        );
        let choice = read_choice(&fields).unwrap();
        let keys: Vec<&str> = choice.choices[0].comparison.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["NumericEquals", "Variable"]);
    }

    #[test]
    fn next_and_end_do_not_matter() {
        let fields = FieldMap::new()
            .with("next", "X")
            .with("end", true)
            .with("option", vec![option(r#"{"Variable": "$.v", "IsNull": true}"#, "Y")]);
        assert!(read_choice(&fields).is_ok());
    }

    #[test]
    fn invalid_comparison_names_the_option() {
        let fields = FieldMap::new().with(
            "option",
            vec![option(r#"{"Variable": "$.v"}"#, "A"), option("{oops", "B")],
        );
        let err = read_choice(&fields).unwrap_err();
        match err.kind {
            ErrorKind::InvalidJson { field, .. } => assert_eq!(field, "option[1] comparison"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn comparison_must_be_an_object() {
        let fields = FieldMap::new().with("option", vec![option("[1, 2]", "A")]);
        let err = read_choice(&fields).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidJson { .. }));
    }

    #[test]
    fn at_least_one_option_is_required() {
        let err = read_choice(&FieldMap::new()).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Shape(_)));
    }
}

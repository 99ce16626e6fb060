//! Pass 3: Collection assembly.
//!
//! Walks the typed field maps of a collection (the root definition or a
//! Parallel branch), dispatches every block to its reader and gathers the
//! results into a name-keyed map. State names must be unique within a
//! collection; branches are independent namespaces.

use crate::ast::{Branch, StateMachineDefinition, StateNode, StateType};
use crate::error::{CompileError, ErrorKind};
use crate::field::FieldMap;
use crate::pass2_states::read_state;
use crate::{ASL_VERSION, MAX_PARALLEL_DEPTH};
use std::collections::BTreeMap;

/// Assemble the root of a state machine definition.
///
/// An absent `version` falls back to `1.0`; an explicitly empty one is
/// omitted from the document. `timeout_seconds` of 0 means unset.
pub fn assemble_definition(fields: &FieldMap) -> Result<StateMachineDefinition, CompileError> {
    let root = assemble_states(fields, 0)?;

    let version = if fields.contains_key("version") {
        fields.opt_str("version")?.map(str::to_owned)
    } else {
        Some(ASL_VERSION.to_owned())
    };
    let timeout_seconds = match fields.uint("timeout_seconds")? {
        0 => None,
        n => Some(n),
    };

    Ok(StateMachineDefinition {
        version,
        comment: fields.opt_str("comment")?.map(str::to_owned),
        start_at: root.start_at,
        timeout_seconds,
        states: root.states,
    })
}

/// Assemble a collection at nesting `depth` (the root is 0).
pub fn assemble_states(fields: &FieldMap, depth: usize) -> Result<Branch, CompileError> {
    for key in fields.keys() {
        let root_only = matches!(key, "comment" | "version" | "timeout_seconds");
        let known = key == "start_at"
            || (root_only && depth == 0)
            || StateType::from_block_key(key).is_some();
        if !known {
            return Err(ErrorKind::UnknownType(key.to_owned()).into());
        }
    }

    let start_at = fields.str("start_at")?;
    if start_at.is_empty() {
        return Err(CompileError::shape("missing required field 'start_at'"));
    }

    let mut states: BTreeMap<String, StateNode> = BTreeMap::new();
    for ty in StateType::ALL {
        let blocks = fields.blocks(ty.block_key())?;
        if ty == StateType::Parallel && depth >= MAX_PARALLEL_DEPTH {
            if let Some(first) = blocks.first() {
                let err = CompileError::new(ErrorKind::MaxDepthExceeded {
                    max: MAX_PARALLEL_DEPTH,
                });
                return Err(match first.opt_str("name")? {
                    Some(name) => err.in_state(name),
                    None => err,
                });
            }
        }

        for block in blocks {
            let name = block.str("name")?;
            if name.is_empty() {
                return Err(CompileError::shape(format!(
                    "{} block is missing required field 'name'",
                    ty.block_key()
                )));
            }
            let node = read_state(ty, block, depth).map_err(|e| e.in_state(name))?;
            if let Some(existing) = states.get(name) {
                return Err(ErrorKind::DuplicateState {
                    name: name.to_owned(),
                    first: existing.state_type().block_key(),
                    second: ty.block_key(),
                }
                .into());
            }
            tracing::debug!(state = name, kind = ty.block_key(), depth, "assembled state");
            states.insert(name.to_owned(), node);
        }
    }

    tracing::debug!(start_at, states = states.len(), depth, "assembled collection");
    Ok(Branch {
        start_at: start_at.to_owned(),
        states,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Transition;

    fn pass(name: &str, next: &str) -> FieldMap {
        let fields = FieldMap::new().with("name", name);
        if next.is_empty() {
            fields.with("end", true)
        } else {
            fields.with("next", next)
        }
    }

    /// A parallel state nested `levels` deep, innermost branch holding a
    /// single bare state.
    fn nested_parallel(levels: usize) -> FieldMap {
        let mut collection = FieldMap::new()
            .with("start_at", "Leaf")
            .with("state", vec![FieldMap::new().with("name", "Leaf")]);
        for level in (0..levels).rev() {
            let name = format!("Fan{}", level);
            let parallel = FieldMap::new()
                .with("name", name.as_str())
                .with("end", true)
                .with("branch", vec![collection]);
            collection = FieldMap::new()
                .with("start_at", name.as_str())
                .with("parallel", vec![parallel]);
        }
        collection
    }

    #[test]
    fn root_defaults() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("pass", vec![pass("A", "")]);
        let def = assemble_definition(&fields).unwrap();
        assert_eq!(def.version.as_deref(), Some("1.0"));
        assert_eq!(def.comment, None);
        assert_eq!(def.timeout_seconds, None);
        assert_eq!(def.states.len(), 1);
    }

    #[test]
    fn empty_version_is_dropped() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("version", "")
            .with("state", vec![FieldMap::new().with("name", "A")]);
        assert_eq!(assemble_definition(&fields).unwrap().version, None);
    }

    #[test]
    fn states_of_all_types_share_one_map() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("pass", vec![pass("A", "B")])
            .with("succeed", vec![FieldMap::new().with("name", "B")]);
        let branch = assemble_states(&fields, 0).unwrap();
        assert_eq!(branch.states.keys().collect::<Vec<_>>(), vec!["A", "B"]);
        match &branch.states["A"] {
            StateNode::Pass(p) => assert_eq!(p.common.transition, Transition::Next("B".into())),
            other => panic!("unexpected state: {:?}", other),
        }
    }

    #[test]
    fn reader_errors_are_framed_with_the_state_name() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("pass", vec![FieldMap::new().with("name", "A")]);
        let err = assemble_states(&fields, 0).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::Exclusivity(_)));
        assert!(err.to_string().starts_with("A: "));
    }

    #[test]
    fn duplicate_names_across_types_are_rejected() {
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("pass", vec![pass("A", "")])
            .with("succeed", vec![FieldMap::new().with("name", "A")]);
        let err = assemble_states(&fields, 0).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::DuplicateState {
                name: "A".into(),
                first: "pass",
                second: "succeed"
            }
        );
    }

    #[test]
    fn branches_are_separate_namespaces() {
        let branch = FieldMap::new()
            .with("start_at", "A")
            .with("state", vec![FieldMap::new().with("name", "A")]);
        let parallel = FieldMap::new()
            .with("name", "A")
            .with("end", true)
            .with("branch", vec![branch.clone(), branch]);
        let fields = FieldMap::new()
            .with("start_at", "A")
            .with("parallel", vec![parallel]);
        assert!(assemble_states(&fields, 0).is_ok());
    }

    #[test]
    fn unknown_collection_key() {
        let fields = FieldMap::new().with("start_at", "A").with("map", Vec::<FieldMap>::new());
        let err = assemble_states(&fields, 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType("map".into()));
    }

    #[test]
    fn root_fields_are_unknown_inside_a_branch() {
        let branch = FieldMap::new()
            .with("start_at", "A")
            .with("comment", "not here")
            .with("state", vec![FieldMap::new().with("name", "A")]);
        assert!(assemble_states(&branch, 0).is_ok());
        let err = assemble_states(&branch, 1).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType("comment".into()));
    }

    #[test]
    fn five_levels_of_parallel_are_accepted() {
        assert!(assemble_states(&nested_parallel(MAX_PARALLEL_DEPTH), 0).is_ok());
    }

    #[test]
    fn six_levels_of_parallel_are_rejected() {
        let err = assemble_states(&nested_parallel(MAX_PARALLEL_DEPTH + 1), 0).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded { max: MAX_PARALLEL_DEPTH });
        assert_eq!(
            err.to_string(),
            "Fan0: branch[0]: Fan1: branch[0]: Fan2: branch[0]: Fan3: branch[0]: \
             Fan4: branch[0]: Fan5: parallel states nest deeper than the maximum of 5 levels"
        );
    }
}

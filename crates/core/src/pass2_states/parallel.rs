use super::common::{read_common, read_path};
use super::policy::{read_catchers, read_retriers};
use crate::ast::ParallelState;
use crate::error::CompileError;
use crate::field::FieldMap;
use crate::pass3_assemble::assemble_states;

/// Read a Parallel state found in a collection at `depth`. Each branch is
/// assembled as a collection at `depth + 1`.
pub(super) fn read_parallel(fields: &FieldMap, depth: usize) -> Result<ParallelState, CompileError> {
    let common = read_common(fields)?;

    let branch_fields = fields.blocks("branch")?;
    if branch_fields.is_empty() {
        return Err(CompileError::shape(
            "parallel state requires at least one branch",
        ));
    }
    let branches = branch_fields
        .iter()
        .enumerate()
        .map(|(i, branch)| assemble_states(branch, depth + 1).map_err(|e| e.in_branch(i)))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParallelState {
        common,
        branches,
        result_path: read_path(fields, "result_path")?,
        result_selector: read_path(fields, "result_selector")?,
        retry: read_retriers(fields)?,
        catch: read_catchers(fields)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::StateNode;

    fn branch(start: &str) -> FieldMap {
        FieldMap::new()
            .with("start_at", start)
            .with("state", vec![FieldMap::new().with("name", start)])
    }

    #[test]
    fn branches_keep_their_order() {
        let fields = FieldMap::new()
            .with("end", true)
            .with("branch", vec![branch("First"), branch("Second")]);
        let state = read_parallel(&fields, 0).unwrap();
        assert_eq!(state.branches.len(), 2);
        assert_eq!(state.branches[0].start_at, "First");
        assert_eq!(state.branches[1].start_at, "Second");
        assert_eq!(state.branches[1].states.get("Second"), Some(&StateNode::Bare));
    }

    #[test]
    fn branch_errors_are_indexed() {
        let bad = FieldMap::new().with("start_at", "X").with(
            "pass",
            vec![FieldMap::new().with("name", "X")],
        );
        let fields = FieldMap::new()
            .with("end", true)
            .with("branch", vec![branch("Ok"), bad]);
        let err = read_parallel(&fields, 0).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("branch[1]: X: state has neither next nor end set"));
    }

    #[test]
    fn a_branch_is_required() {
        assert!(read_parallel(&FieldMap::new().with("end", true), 0).is_err());
    }
}

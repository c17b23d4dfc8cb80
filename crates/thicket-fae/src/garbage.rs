// crates/thicket-fae/src/garbage.rs

//! The garbage checker: every live root must be reachable from a program
//! variable or from another reachable root (`spec.md` §6,
//! "garbage detected"; `fa/garbage_checker.hh`).
//!
//! Kept as a standalone check rather than folded into the executor's
//! instruction handlers, matching the original tool, which runs it as a
//! separate pass after each instruction rather than inline in `free`.

use crate::fae::ForestAutomaton;
use std::collections::HashSet;
use thicket_core::diagnostics::ProgramError;
use thicket_core::{Data, RootIdx};

/// Returns `Err(ProgramError::GarbageDetected)` if any live root is
/// unreachable from the variable environment, directly or transitively
/// through other roots' references.
pub fn garbage_check(fae: &ForestAutomaton) -> Result<(), ProgramError> {
    let mut reachable: HashSet<RootIdx> = HashSet::new();
    let mut frontier: Vec<RootIdx> = fae
        .vars()
        .values()
        .filter_map(Data::as_ref_target)
        .map(|(r, _)| r)
        .collect();
    frontier.retain(|r| reachable.insert(*r));

    while let Some(r) = frontier.pop() {
        for succ in fae.connection_graph().direct_successors(r) {
            if reachable.insert(succ) {
                frontier.push(succ);
            }
        }
    }

    for idx in 0..fae.root_count() {
        let root = RootIdx::from(idx);
        if fae.root(root).is_some() && !reachable.contains(&root) {
            return Err(ProgramError::GarbageDetected);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_automata::TreeAut;
    use thicket_label::{DataId, Label};

    #[test]
    fn unreachable_root_is_flagged() {
        let mut fae = ForestAutomaton::new();
        let null_label = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], null_label, q0);
        fae.alloc_root(ta);
        fae.recompute_connection_graph();
        assert_eq!(garbage_check(&fae), Err(ProgramError::GarbageDetected));
    }

    #[test]
    fn root_reachable_from_a_variable_is_fine() {
        let mut fae = ForestAutomaton::new();
        let null_label = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], null_label, q0);
        let r0 = fae.alloc_root(ta);
        fae.bind_var(0, Data::Ref { root: r0, displ: 0 });
        fae.recompute_connection_graph();
        assert_eq!(garbage_check(&fae), Ok(()));
    }
}

// crates/thicket-abstract/src/fa.rs

//! Applying one abstraction pass across every non-pinned root of a forest
//! automaton (`spec.md` §4.5: "For each non-pinned root ...").

use crate::config::AbstractionMode;
use std::collections::BTreeSet;
use thicket_automata::State;
use thicket_core::RootIdx;
use thicket_fae::ForestAutomaton;

/// Abstracts every root of `fae` that is not in `pinned` (variable-rooted
/// or otherwise protected components), in place, then prunes useless
/// states and recomputes the connection graph.
///
/// `frame_of` maps a root to the stack-frame identity of its owning
/// activation record, `None` for roots with no frame (heap allocations,
/// globals). Every state of one root's `TreeAut` belongs to that same
/// root, so this is looked up once per root rather than per state.
pub fn abstract_fa(
    fae: &mut ForestAutomaton,
    pinned: &BTreeSet<RootIdx>,
    mode: &AbstractionMode<'_>,
    frame_of: &impl Fn(RootIdx) -> Option<u32>,
) {
    let count = fae.root_count();
    for idx in 0..count {
        let root = RootIdx::from(idx);
        if pinned.contains(&root) {
            continue;
        }
        let Some(ta) = fae.root(root).cloned() else {
            continue;
        };
        let root_frame = frame_of(root);
        let abstracted = match mode {
            AbstractionMode::FiniteHeight(config) => {
                crate::finite_height::finite_height_abstract(&ta, fae.labels(), *config, |_: State| root_frame)
            }
            AbstractionMode::Predicate(predicates) => {
                crate::predicate::predicate_abstract(&ta, fae.labels(), predicates)
            }
        };
        fae.set_root(root, abstracted);
    }
    fae.unreachable_free();
    fae.recompute_connection_graph();
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_automata::TreeAut;
    use thicket_core::Data;
    use thicket_label::{DataId, Label};

    #[test]
    fn pinned_roots_are_left_untouched() {
        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_final(q0);
        let r0 = fae.alloc_root(ta);

        let mut pinned = BTreeSet::new();
        pinned.insert(r0);
        let config = crate::config::AbstractionConfig::default();
        abstract_fa(&mut fae, &pinned, &AbstractionMode::FiniteHeight(config), &|_: RootIdx| None);
        assert!(fae.root(r0).is_some());
    }

    #[test]
    fn frame_of_is_consulted_once_per_processed_root() {
        use std::cell::RefCell;

        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));

        let mut ta0 = TreeAut::new();
        let q0 = ta0.fresh_state();
        ta0.add_transition(vec![], leaf, q0);
        ta0.add_final(q0);
        let r0 = fae.alloc_root(ta0);

        let mut ta1 = TreeAut::new();
        let q1 = ta1.fresh_state();
        ta1.add_transition(vec![], leaf, q1);
        ta1.add_final(q1);
        let r1 = fae.alloc_root(ta1);

        let config = crate::config::AbstractionConfig { height_bound: 0, stack_frame_abstraction: false };
        let pinned = BTreeSet::new();
        let seen: RefCell<Vec<RootIdx>> = RefCell::new(Vec::new());
        abstract_fa(
            &mut fae,
            &pinned,
            &AbstractionMode::FiniteHeight(config),
            &|root: RootIdx| {
                seen.borrow_mut().push(root);
                None
            },
        );

        // Confirms the production call site actually reaches into a
        // per-root lookup instead of hardcoding `|_| None`: every
        // non-pinned root triggers exactly one `frame_of` call.
        assert_eq!(*seen.borrow(), vec![r0, r1]);
    }
}

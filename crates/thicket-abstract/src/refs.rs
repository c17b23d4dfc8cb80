// crates/thicket-abstract/src/refs.rs

//! Per-state cutpoint-signature and data/non-data classification, shared
//! by both abstraction modes.
//!
//! [`thicket_fae::ConnectionGraph`] computes this same "which roots are
//! reachable" summary, but at the granularity of a whole *root*; here we
//! need it per *state* of one root's automaton, to decide which states of
//! that single `TreeAut` are allowed to merge with each other.

use std::collections::{BTreeSet, HashMap, HashSet};
use thicket_automata::{State, TreeAut};
use thicket_core::{Data, RootIdx};
use thicket_label::{Label, LabelArena};

/// The set of other roots reachable by following `Ref` leaves downward
/// from each state of `ta`. A leaf state that is itself a `Ref` reaches
/// just its own target; an interior state reaches the union of what its
/// children reach.
#[must_use]
pub fn per_state_refs(ta: &TreeAut, arena: &LabelArena) -> HashMap<State, BTreeSet<RootIdx>> {
    let mut refs: HashMap<State, BTreeSet<RootIdx>> = HashMap::new();
    let mut changed = true;
    while changed {
        changed = false;
        for t in ta.transitions() {
            let mut acc: BTreeSet<RootIdx> = BTreeSet::new();
            if let Label::Data(Data::Ref { root, .. }, _) = arena.get(t.label) {
                acc.insert(*root);
            }
            for child in &t.lhs {
                if let Some(child_refs) = refs.get(child) {
                    acc.extend(child_refs.iter().copied());
                }
            }
            let entry = refs.entry(t.rhs).or_default();
            let before = entry.len();
            entry.extend(acc);
            if entry.len() != before {
                changed = true;
            }
        }
    }
    refs
}

/// States produced solely by a `Label::Data` leaf transition: the states
/// that abstraction must never merge with anything but themselves.
#[must_use]
pub fn data_leaf_states(ta: &TreeAut, arena: &LabelArena) -> HashSet<State> {
    ta.states()
        .iter()
        .copied()
        .filter(|&s| {
            let mut incoming = ta.transitions_with_rhs(s);
            incoming.all(|t| t.is_leaf() && arena.get(t.label).is_data())
                && ta.transitions_with_rhs(s).next().is_some()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::DataId;

    #[test]
    fn a_ref_leaf_reaches_its_own_target() {
        let mut arena = LabelArena::new();
        let lbl = arena.intern(Label::Data(Data::Ref { root: RootIdx::new(3), displ: 0 }, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], lbl, q0);
        let refs = per_state_refs(&ta, &arena);
        assert!(refs.get(&q0).unwrap().contains(&RootIdx::new(3)));
    }

    #[test]
    fn an_interior_state_inherits_its_childs_refs() {
        let mut arena = LabelArena::new();
        let leaf_lbl = arena.intern(Label::Data(Data::Ref { root: RootIdx::new(1), displ: 0 }, DataId(0)));
        let node_lbl = arena.intern(Label::Node(vec![]));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf_lbl, q0);
        let n0 = ta.fresh_state();
        ta.add_transition(vec![q0], node_lbl, n0);
        let refs = per_state_refs(&ta, &arena);
        assert!(refs.get(&n0).unwrap().contains(&RootIdx::new(1)));
    }

    #[test]
    fn data_leaf_states_excludes_interior_states() {
        let mut arena = LabelArena::new();
        let leaf_lbl = arena.intern(Label::Data(Data::Null, DataId(0)));
        let node_lbl = arena.intern(Label::Node(vec![]));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf_lbl, q0);
        let n0 = ta.fresh_state();
        ta.add_transition(vec![q0], node_lbl, n0);
        let data_states = data_leaf_states(&ta, &arena);
        assert!(data_states.contains(&q0));
        assert!(!data_states.contains(&n0));
    }
}

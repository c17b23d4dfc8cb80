// crates/thicket-abstract/src/predicate.rs

//! Predicate abstraction: collapse states that intersect the same set of
//! predicate tree automata (`spec.md` §4.5, "Predicate").

use crate::refs::{data_leaf_states, per_state_refs};
use std::collections::{BTreeSet, HashMap};
use thicket_automata::{intersection, State, TreeAut};
use thicket_core::RootIdx;
use thicket_label::LabelArena;

#[derive(Clone, PartialEq, Eq, Hash)]
enum Key {
    Data(State),
    Membership(BTreeSet<(usize, State)>, BTreeSet<RootIdx>),
}

/// Computes, for every state of `ta`, which `(predicate index, predicate
/// state)` pairs it can simultaneously land on — via `predicates.len()`
/// independent `intersection_bu` calls — then collapses states that agree
/// on that set, on cutpoint signature, and are not data leaves.
///
/// An empty `predicates` slice still performs the cutpoint-signature /
/// data-vs-non-data refinement: the predicate part of the key is vacuously
/// equal for every state, so only that refinement discriminates.
#[must_use]
pub fn predicate_abstract(ta: &TreeAut, arena: &LabelArena, predicates: &[TreeAut]) -> TreeAut {
    let refs = per_state_refs(ta, arena);
    let data_states = data_leaf_states(ta, arena);

    let mut membership: HashMap<State, BTreeSet<(usize, State)>> = HashMap::new();
    for (k, predicate) in predicates.iter().enumerate() {
        let (_, prod_map) = intersection::intersection_bu(ta, predicate);
        for &(pa, pb) in prod_map.keys() {
            membership.entry(pa).or_default().insert((k, pb));
        }
    }

    let mut groups: HashMap<Key, Vec<State>> = HashMap::new();
    let mut classes: Vec<Vec<State>> = Vec::new();
    for &s in ta.states() {
        let key = if data_states.contains(&s) {
            Key::Data(s)
        } else {
            Key::Membership(
                membership.get(&s).cloned().unwrap_or_default(),
                refs.get(&s).cloned().unwrap_or_default(),
            )
        };
        match key {
            Key::Data(_) => classes.push(vec![s]),
            other => groups.entry(other).or_default().push(s),
        }
    }
    classes.extend(groups.into_values());

    let collapsed = ta.collapsed(&classes);
    thicket_automata::reduce::useless_and_unreachable_free(&collapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::Data;
    use thicket_label::{DataId, Label};

    fn leaf_ta(label: thicket_label::LabelId) -> TreeAut {
        let mut ta = TreeAut::new();
        let q = ta.fresh_state();
        ta.add_transition(vec![], label, q);
        ta.add_final(q);
        ta
    }

    #[test]
    fn empty_predicates_still_applies_cutpoint_refinement() {
        let mut arena = LabelArena::new();
        let node = arena.intern(Label::Node(vec![]));
        let leaf = arena.intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let l0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, l0);
        let n1 = ta.fresh_state();
        ta.add_transition(vec![l0], node, n1);
        let n2 = ta.fresh_state();
        ta.add_transition(vec![l0], node, n2);
        ta.add_final(n1);
        ta.add_final(n2);

        let abstracted = predicate_abstract(&ta, &arena, &[]);
        assert_eq!(abstracted.final_states().len(), 1);
    }

    #[test]
    fn distinct_predicate_membership_keeps_states_apart() {
        let mut arena = LabelArena::new();
        let node = arena.intern(Label::Node(vec![]));
        let leaf1 = arena.intern(Label::Data(Data::Int(1), DataId(1)));
        let leaf2 = arena.intern(Label::Data(Data::Int(2), DataId(2)));

        let mut ta = TreeAut::new();
        let l1 = ta.fresh_state();
        ta.add_transition(vec![], leaf1, l1);
        let l2 = ta.fresh_state();
        ta.add_transition(vec![], leaf2, l2);
        let n1 = ta.fresh_state();
        ta.add_transition(vec![l1], node, n1);
        let n2 = ta.fresh_state();
        ta.add_transition(vec![l2], node, n2);
        ta.add_final(n1);
        ta.add_final(n2);

        let predicate = leaf_ta(leaf1);
        let abstracted = predicate_abstract(&ta, &arena, std::slice::from_ref(&predicate));
        assert_eq!(abstracted.final_states().len(), 2);
    }
}

// crates/thicket-automata/src/reduce.rs

//! Removing useless (unproductive) and unreachable states
//! (`spec.md` §4.1, "useless_and_unreachable_free").

use crate::state::State;
use crate::ta::TreeAut;
use std::collections::HashSet;

/// A state is *productive* if some transition builds it out of already
/// productive children (base case: a leaf transition, whose `lhs` is
/// empty, is trivially satisfied).
fn productive_states(ta: &TreeAut) -> HashSet<State> {
    let mut productive: HashSet<State> = HashSet::new();
    loop {
        let mut changed = false;
        for t in ta.transitions() {
            if productive.contains(&t.rhs) {
                continue;
            }
            if t.lhs.iter().all(|q| productive.contains(q)) {
                productive.insert(t.rhs);
                changed = true;
            }
        }
        if !changed {
            break;
        }
    }
    productive
}

/// A state is *reachable* if it is final, or is a child of a transition
/// whose `rhs` is reachable. (Top-down from the accepting states, against
/// the direction the automaton runs bottom-up.)
fn reachable_states(ta: &TreeAut) -> HashSet<State> {
    let mut reachable: HashSet<State> = ta.final_states().iter().copied().collect();
    loop {
        let mut changed = false;
        for t in ta.transitions() {
            if !reachable.contains(&t.rhs) {
                continue;
            }
            for &q in &t.lhs {
                if reachable.insert(q) {
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    reachable
}

/// Drops every state that is not both productive and reachable, and every
/// transition that touches one. Preserves the automaton's language
/// exactly: a dropped state can never participate in an accepting run.
#[must_use]
pub fn useless_and_unreachable_free(ta: &TreeAut) -> TreeAut {
    let productive = productive_states(ta);
    let reachable = reachable_states(ta);
    let live = |q: &State| productive.contains(q) && reachable.contains(q);

    let mut out = TreeAut::new();
    for t in ta.transitions() {
        if live(&t.rhs) && t.lhs.iter().all(live) {
            out.add_transition(t.lhs.clone(), t.label, t.rhs);
        }
    }
    for &f in ta.final_states() {
        if live(&f) {
            out.add_final(f);
        }
    }
    out
}

/// Whether the automaton accepts no trees at all: equivalently, whether
/// any final state is productive.
#[must_use]
pub fn is_empty(ta: &TreeAut) -> bool {
    let productive = productive_states(ta);
    !ta.final_states().iter().any(|f| productive.contains(f))
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::{Label, LabelArena};

    #[test]
    fn drops_unreachable_branch() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, thicket_label::DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        let stray = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_transition(vec![], leaf, stray);
        ta.add_final(q0);

        let reduced = useless_and_unreachable_free(&ta);
        assert_eq!(reduced.transitions().len(), 1);
        assert!(!is_empty(&reduced));
    }

    #[test]
    fn empty_when_only_final_state_is_unproductive() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, thicket_label::DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        let unreachable_final = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_final(unreachable_final);
        assert!(is_empty(&ta));
    }
}

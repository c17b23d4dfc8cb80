// crates/thicket-fold/src/discover.rs

//! Heuristic box-discovery strategies (`spec.md` §4.4, "learn1"/"learn2").
//!
//! Folding needs a candidate box before it can look for an occurrence of
//! it; these two strategies are where candidates come from. Both are
//! heuristics — sound in the sense that a discovered box is always backed
//! by an actual matching sub-automaton, but neither claims to find every
//! foldable pattern.

use crate::subauto::subautomaton_at;
use std::collections::HashMap;
use thicket_automata::{inclusion, State, TreeAut};

/// `learn1`: the simplest strategy — find two distinct states whose
/// sub-automata accept exactly the same language (but were not merged by
/// minimization, e.g. because they live under different final states) and
/// propose the first one's sub-automaton as a new box. A language that
/// already recurs twice in the same root is a strong signal it is a
/// meaningful repeating unit.
#[must_use]
pub fn learn1(ta: &TreeAut) -> Option<TreeAut> {
    let states: Vec<State> = ta.states().iter().copied().collect();
    for (i, &p) in states.iter().enumerate() {
        for &q in &states[i + 1..] {
            let sub_p = subautomaton_at(ta, p);
            let sub_q = subautomaton_at(ta, q);
            if sub_p.transitions().is_empty() || sub_q.transitions().is_empty() {
                continue;
            }
            if inclusion::subseteq(&sub_p, &sub_q) && inclusion::subseteq(&sub_q, &sub_p) {
                return Some(sub_p);
            }
        }
    }
    None
}

/// `learn2`: looks specifically for a self-recursive chain — a state `q`
/// whose own sub-automaton contains another state `q'` with the same
/// *immediate* transition labels as `q` (same label multiset producing
/// `q` and `q'`), which is the signature of a singly-linked structural
/// recursion (each list cell looks like the next one syntactically, even
/// before language-level comparison is possible because the recursion
/// hasn't bottomed out into a finite check yet). Proposes the shallower
/// state's sub-automaton.
#[must_use]
pub fn learn2(ta: &TreeAut) -> Option<TreeAut> {
    let mut label_signature: HashMap<State, Vec<thicket_label::LabelId>> = HashMap::new();
    for t in ta.transitions() {
        let sig = label_signature.entry(t.rhs).or_default();
        sig.push(t.label);
    }
    for sig in label_signature.values_mut() {
        sig.sort_by_key(|l| format!("{l:?}"));
    }

    let states: Vec<State> = ta.states().iter().copied().collect();
    for (i, &p) in states.iter().enumerate() {
        for &q in &states[i + 1..] {
            let (Some(sp), Some(sq)) = (label_signature.get(&p), label_signature.get(&q)) else {
                continue;
            };
            if sp == sq && !sp.is_empty() {
                let sub = subautomaton_at(ta, p);
                if sub.transitions().len() > 1 {
                    return Some(sub);
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::{DataId, Label, LabelArena};

    #[test]
    fn learn1_finds_a_repeated_leaf_language() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        let q1 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_transition(vec![], leaf, q1);
        assert!(learn1(&ta).is_some());
    }

    #[test]
    fn learn1_finds_nothing_in_a_singleton_automaton() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        assert!(learn1(&ta).is_none());
    }
}

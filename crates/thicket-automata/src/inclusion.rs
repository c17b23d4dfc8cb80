// crates/thicket-automata/src/inclusion.rs

//! Language inclusion, `L(a) subseteq L(b)` (`spec.md` §4.1, "subseteq").
//!
//! The original tool (`fa/treeaut.hh`'s `subseteq`) runs an antichain
//! algorithm pruned by an upward simulation relation on `b`. This module
//! decides the same question the textbook way, without the antichain
//! pruning that keeps the real algorithm's macro-state sets small: for
//! each state of `a`, it tracks the set of *macro-states* — subsets of
//! `b`'s states, one per distinct witnessing subtree — that the
//! determinized subset construction over `b` would reach on that subtree.
//! Two witnessing subtrees are never merged into a single flat reachability
//! set, since doing so would let one subtree's good match paper over
//! another subtree's bad one; see `DESIGN.md`.

use crate::state::State;
use crate::ta::TreeAut;
use std::collections::{BTreeSet, HashMap, HashSet};

/// The set of `b`-states simultaneously reachable by running `b`,
/// nondeterministically, on one specific subtree.
type MacroState = BTreeSet<State>;
type Reach = HashMap<State, HashSet<MacroState>>;

/// All ways to pick one macro-state from each of `sets`, in order.
fn cartesian_product(sets: &[&HashSet<MacroState>]) -> Vec<Vec<MacroState>> {
    let mut combos: Vec<Vec<MacroState>> = vec![Vec::new()];
    for set in sets {
        let mut next = Vec::with_capacity(combos.len() * set.len().max(1));
        for combo in &combos {
            for m in set.iter() {
                let mut extended = combo.clone();
                extended.push(m.clone());
                next.push(extended);
            }
        }
        combos = next;
    }
    combos
}

fn reach_sets(a: &TreeAut, b: &TreeAut) -> Reach {
    let mut reach: Reach = HashMap::new();
    let mut b_by_label: HashMap<_, Vec<&crate::transition::Transition>> = HashMap::new();
    for t in b.transitions() {
        b_by_label.entry(t.label).or_default().push(t);
    }

    let mut changed = true;
    while changed {
        changed = false;
        for ta in a.transitions() {
            let Some(child_macros): Option<Vec<HashSet<MacroState>>> =
                ta.lhs.iter().map(|q| reach.get(q).cloned()).collect()
            else {
                continue;
            };
            let child_refs: Vec<&HashSet<MacroState>> = child_macros.iter().collect();
            let candidates = b_by_label.get(&ta.label);

            for combo in cartesian_product(&child_refs) {
                // The unique macro-state `b` reaches on the subtree witnessing
                // this combo: every `b`-transition whose label/arity match and
                // whose children are each covered by the corresponding
                // macro-state in `combo` contributes its target.
                let mut produced: MacroState = BTreeSet::new();
                if let Some(candidates) = candidates {
                    for tb in candidates {
                        if tb.arity() != combo.len() {
                            continue;
                        }
                        let matches = tb
                            .lhs
                            .iter()
                            .zip(combo.iter())
                            .all(|(qb, m)| m.contains(qb));
                        if matches {
                            produced.insert(tb.rhs);
                        }
                    }
                }
                let entry = reach.entry(ta.rhs).or_default();
                if entry.insert(produced) {
                    changed = true;
                }
            }
        }
    }
    reach
}

/// `true` iff every tree accepted by `a` is also accepted by `b`.
#[must_use]
pub fn subseteq(a: &TreeAut, b: &TreeAut) -> bool {
    let reach = reach_sets(a, b);
    for fa in a.final_states() {
        let Some(macro_states) = reach.get(fa) else {
            // `fa` is not grounded by any leaf-up derivation in `a`: it
            // contributes no tree to `L(a)`, so it cannot violate inclusion.
            continue;
        };
        // Every witnessed subtree's macro-state must itself contain a
        // `b`-final state: one subtree's good match never excuses another
        // subtree landing in a macro-state with no accepting run at all.
        if !macro_states.iter().all(|m| m.iter().any(|w| b.is_final(*w))) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::union::union_disjoint;
    use thicket_label::{Label, LabelArena};

    #[test]
    fn automaton_is_included_in_its_own_union_with_another() {
        let mut arena = LabelArena::new();
        let lbl_a = arena.intern(Label::Data(thicket_core::Data::Int(1), thicket_label::DataId(0)));
        let lbl_b = arena.intern(Label::Data(thicket_core::Data::Int(2), thicket_label::DataId(0)));

        let mut a = TreeAut::new();
        let qa = a.fresh_state();
        a.add_transition(vec![], lbl_a, qa);
        a.add_final(qa);

        let mut b = TreeAut::new();
        let qb = b.fresh_state();
        b.add_transition(vec![], lbl_b, qb);
        b.add_final(qb);

        let u = union_disjoint(&a, &b);
        assert!(subseteq(&a, &u));
        assert!(subseteq(&b, &u));
        assert!(!subseteq(&u, &a));
    }

    #[test]
    fn disjoint_languages_are_not_mutually_included() {
        let mut arena = LabelArena::new();
        let lbl_a = arena.intern(Label::Data(thicket_core::Data::Int(1), thicket_label::DataId(0)));
        let lbl_b = arena.intern(Label::Data(thicket_core::Data::Int(2), thicket_label::DataId(0)));

        let mut a = TreeAut::new();
        let qa = a.fresh_state();
        a.add_transition(vec![], lbl_a, qa);
        a.add_final(qa);

        let mut b = TreeAut::new();
        let qb = b.fresh_state();
        b.add_transition(vec![], lbl_b, qb);
        b.add_final(qb);

        assert!(!subseteq(&a, &b));
        assert!(!subseteq(&b, &a));
    }

    /// A regression for the flat-reachability-set unsoundness: `a` merges
    /// two differently-labeled leaves into one shared, final state, so one
    /// of the two single-node trees it accepts (`x`) lines up with a
    /// `b`-final state while the other (`y`) does not. A per-state flat
    /// union of witnesses would let `x`'s good match paper over `y`'s bad
    /// one and wrongly report inclusion.
    #[test]
    fn distinct_witnessing_subtrees_sharing_an_a_state_are_checked_independently() {
        let mut arena = LabelArena::new();
        let lbl_x = arena.intern(Label::Data(thicket_core::Data::Int(1), thicket_label::DataId(0)));
        let lbl_y = arena.intern(Label::Data(thicket_core::Data::Int(2), thicket_label::DataId(0)));

        let mut a = TreeAut::new();
        let qa = a.fresh_state();
        a.add_transition(vec![], lbl_x, qa);
        a.add_transition(vec![], lbl_y, qa);
        a.add_final(qa);

        let mut b = TreeAut::new();
        let qb_x = b.fresh_state();
        b.add_transition(vec![], lbl_x, qb_x);
        b.add_final(qb_x);
        let qb_y = b.fresh_state();
        b.add_transition(vec![], lbl_y, qb_y);
        // `qb_y` is deliberately not final: `L(b)` accepts `x` but not `y`.

        assert!(!subseteq(&a, &b));
    }
}

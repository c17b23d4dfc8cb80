// crates/thicket-automata/src/intersection.rs

//! Synchronous bottom-up product construction (`spec.md` §4.1,
//! "intersection_BU"; `fa/bu_intersection.hh`).

use crate::state::State;
use crate::ta::TreeAut;
use std::collections::HashMap;
use thicket_label::LabelId;

/// Maps a pair of source states to the single state that represents them
/// in the product automaton. Exposed so callers (the backward run in
/// particular, `spec.md` §4.7) can recover which source states a product
/// state came from.
pub type ProdMap = HashMap<(State, State), State>;

/// Computes `a` intersected with `b` bottom-up: a product transition
/// `label(p1,q1 .. pn,qn) -> p,q` exists exactly when `label(p1..pn) -> p`
/// is a transition of `a` and `label(q1..qn) -> q` is a transition of `b`
/// with the same label and arity. Returns the product automaton together
/// with the `(a-state, b-state) -> product-state` map the backward run
/// needs to invert.
#[must_use]
pub fn intersection_bu(a: &TreeAut, b: &TreeAut) -> (TreeAut, ProdMap) {
    let mut out = TreeAut::new();
    let mut prod_map: ProdMap = HashMap::new();

    // Index b's transitions by label for fast pairing.
    let mut b_by_label: HashMap<LabelId, Vec<&crate::transition::Transition>> = HashMap::new();
    for t in b.transitions() {
        b_by_label.entry(t.label).or_default().push(t);
    }

    let mut product_state = |out: &mut TreeAut, prod_map: &mut ProdMap, pa: State, pb: State| {
        *prod_map.entry((pa, pb)).or_insert_with(|| out.fresh_state())
    };

    // Fixpoint: a product transition can only be formed once both children's
    // product states exist, so iterate until no new product states appear.
    let mut frontier_grew = true;
    while frontier_grew {
        frontier_grew = false;
        for ta in a.transitions() {
            let Some(candidates) = b_by_label.get(&ta.label) else {
                continue;
            };
            for tb in candidates {
                if ta.arity() != tb.arity() {
                    continue;
                }
                // All child pairs must already have an established product
                // state (both being leaves satisfies this trivially).
                let children: Option<Vec<State>> = ta
                    .lhs
                    .iter()
                    .zip(tb.lhs.iter())
                    .map(|(&pa, &pb)| prod_map.get(&(pa, pb)).copied())
                    .collect();
                let Some(children) = children else {
                    continue;
                };
                let before = prod_map.len();
                let rhs = product_state(&mut out, &mut prod_map, ta.rhs, tb.rhs);
                if prod_map.len() != before {
                    frontier_grew = true;
                }
                out.add_transition(children, ta.label, rhs);
            }
        }
        // Seed leaves explicitly: a pair of nullary transitions with equal
        // label always establishes a product state even before the loop
        // above would visit it via a child lookup.
        for ta in a.transitions().iter().filter(|t| t.is_leaf()) {
            let Some(candidates) = b_by_label.get(&ta.label) else {
                continue;
            };
            for tb in candidates.iter().filter(|t| t.is_leaf()) {
                let before = prod_map.len();
                let rhs = product_state(&mut out, &mut prod_map, ta.rhs, tb.rhs);
                if prod_map.len() != before {
                    frontier_grew = true;
                }
                out.add_transition(vec![], ta.label, rhs);
            }
        }
    }

    for &fa in a.final_states() {
        for &fb in b.final_states() {
            if let Some(&rhs) = prod_map.get(&(fa, fb)) {
                out.add_final(rhs);
            }
        }
    }

    (out, prod_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::is_empty;
    use thicket_label::{Label, LabelArena};

    #[test]
    fn intersection_of_disjoint_leaf_languages_is_empty() {
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

        let (product, _) = intersection_bu(&a, &b);
        assert!(is_empty(&product));
    }

    #[test]
    fn intersection_of_equal_leaf_languages_is_nonempty() {
        let mut arena = LabelArena::new();
        let lbl = arena.intern(Label::Data(thicket_core::Data::Int(1), thicket_label::DataId(0)));

        let mut a = TreeAut::new();
        let qa = a.fresh_state();
        a.add_transition(vec![], lbl, qa);
        a.add_final(qa);

        let mut b = TreeAut::new();
        let qb = b.fresh_state();
        b.add_transition(vec![], lbl, qb);
        b.add_final(qb);

        let (product, prod_map) = intersection_bu(&a, &b);
        assert!(!is_empty(&product));
        assert!(prod_map.contains_key(&(qa, qb)));
    }
}

// crates/thicket-refine/src/normalize_revert.rs

//! Reverting one normalization pass against the product automata computed
//! while walking a trace backward (`spec.md` §4.7, steps (i)-(iv)).

use std::collections::{HashMap, HashSet};
use thicket_automata::intersection::ProdMap;
use thicket_automata::{reduce, State, TreeAut};
use thicket_core::{Data, RootIdx};
use thicket_label::{DataId, Label, LabelArena};
use thicket_normalize::NormalizationLog;

/// Splits the product automaton computed per surviving root back into one
/// component per original root, undoing every merge `log` recorded, most
/// recent first (`log.merges_reversed()`). Roots untouched by any merge
/// pass their product straight through unchanged.
#[must_use]
pub fn revert_normalization(
    products: &HashMap<RootIdx, (TreeAut, ProdMap)>,
    log: &NormalizationLog,
    arena: &mut LabelArena,
) -> HashMap<RootIdx, TreeAut> {
    let mut reconstructed: HashMap<RootIdx, TreeAut> = products
        .iter()
        .map(|(&root, (ta, _))| (root, ta.clone()))
        .collect();

    for merge in log.merges_reversed() {
        let survivor_key = log.resolve(merge.survivor);
        let Some((product, prod_map)) = products.get(&survivor_key) else {
            continue;
        };

        // (i) copy the product TA to both the survivor's and the merged
        // root's original position, (ii) erase the accepting states that
        // no longer correspond to either alone.
        let mut merged_ta = product.clone();
        for &f in product.final_states() {
            merged_ta.remove_final(f);
        }

        // (iii) the product states reached from each join state become the
        // reconstructed merged component's accepting states: they mark
        // "recognized everything below, ending where the splice happened".
        let mut cut_states: Vec<State> = Vec::new();
        for &(in_survivor, _in_merged) in log.join_states_for(merge.survivor) {
            for (&(_backward, forward), &product_state) in prod_map {
                if forward == in_survivor {
                    merged_ta.add_final(product_state);
                    cut_states.push(product_state);
                }
            }
        }
        let merged_ta = reduce::useless_and_unreachable_free(&merged_ta);

        // (iv) in the survivor's reconstructed component, those same
        // product states become `Ref` leaves to the newly reconstructed
        // merged component, and the subtree they used to carry is dropped
        // (it now lives in `merged_ta` instead).
        let survivor_ta = reconstructed
            .get(&survivor_key)
            .cloned()
            .unwrap_or_else(|| product.clone());
        let cut_survivor = cut_below(&survivor_ta, &cut_states, merge.merged, arena);

        reconstructed.insert(survivor_key, cut_survivor);
        reconstructed.insert(merge.merged, merged_ta);
    }

    reconstructed
}

/// Replaces every transition producing a state in `cut_states` with a
/// single `Ref` leaf to `target`, dropping whatever now lives below it.
fn cut_below(ta: &TreeAut, cut_states: &[State], target: RootIdx, arena: &mut LabelArena) -> TreeAut {
    let cut: HashSet<State> = cut_states.iter().copied().collect();
    if cut.is_empty() {
        return ta.clone();
    }
    let ref_label = arena.intern(Label::Data(Data::Ref { root: target, displ: 0 }, DataId(0)));

    let mut out = TreeAut::new();
    for t in ta.transitions() {
        if cut.contains(&t.rhs) {
            continue;
        }
        out.add_transition(t.lhs.clone(), t.label, t.rhs);
    }
    for &q in &cut {
        out.register_state(q);
        out.add_transition(vec![], ref_label, q);
    }
    for &f in ta.final_states() {
        out.add_final(f);
    }
    reduce::useless_and_unreachable_free(&out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_automata::intersection::intersection_bu;
    use thicket_core::RootIdx;
    use thicket_fae::ForestAutomaton;

    #[test]
    fn reconstructs_the_merged_away_component_and_re_adds_its_ref() {
        let mut fae = ForestAutomaton::new();
        let leaf = fae
            .labels_mut()
            .intern(Label::Data(thicket_core::Data::Null, DataId(0)));
        let mut child_ta = TreeAut::new();
        let cq = child_ta.fresh_state();
        child_ta.add_transition(vec![], leaf, cq);
        child_ta.add_final(cq);
        let child = fae.alloc_root(child_ta);

        let ref_label = fae
            .labels_mut()
            .intern(Label::Data(Data::Ref { root: child, displ: 0 }, DataId(1)));
        let mut pred_ta = TreeAut::new();
        let pq = pred_ta.fresh_state();
        pred_ta.add_transition(vec![], ref_label, pq);
        pred_ta.add_final(pq);
        let pred = fae.alloc_root(pred_ta);
        fae.bind_var(0, Data::Ref { root: pred, displ: 0 });

        let log = thicket_normalize::normalize(&mut fae);
        assert_eq!(log.len(), 1);
        let merged_survivor = fae.root(pred).expect("survivor still present").clone();

        // Stand in for "the backward FA intersected against this snapshot"
        // with a trivial self-intersection.
        let (product, prod_map) = intersection_bu(&merged_survivor, &merged_survivor);
        let mut products = HashMap::new();
        products.insert(pred, (product, prod_map));

        let mut arena = fae.labels().clone();
        let reconstructed = revert_normalization(&products, &log, &mut arena);

        let child_back = reconstructed.get(&child).expect("child reconstructed");
        assert_eq!(child_back.transitions().len(), 1);
        assert_eq!(child_back.transitions()[0].label, leaf);

        let pred_back = reconstructed.get(&pred).expect("survivor reconstructed");
        assert_eq!(pred_back.transitions().len(), 1);
        let Label::Data(Data::Ref { root, .. }, _) = arena.get(pred_back.transitions()[0].label) else {
            panic!("expected a Ref leaf restored at the join point");
        };
        assert_eq!(*root, child);
    }

    #[test]
    fn an_empty_log_leaves_every_root_as_its_own_product() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q = ta.fresh_state();
        ta.add_transition(vec![], leaf, q);
        ta.add_final(q);

        let mut products = HashMap::new();
        products.insert(RootIdx::new(0), (ta.clone(), ProdMap::new()));
        let log = NormalizationLog::new();

        let reconstructed = revert_normalization(&products, &log, &mut arena);
        assert_eq!(reconstructed.len(), 1);
        assert_eq!(reconstructed[&RootIdx::new(0)].transitions().len(), 1);
    }
}

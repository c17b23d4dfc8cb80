// crates/thicket-normalize/src/normalize.rs

//! DFS canonicalization: merge every non-cutpoint successor into its
//! unique predecessor (`spec.md` §4.3).
//!
//! A root is a *cutpoint* if more than one place references it — another
//! root's data leaf, or a program variable directly. A non-cutpoint root
//! (referenced from exactly one place, and not itself a variable target)
//! contributes nothing a cutpoint-based abstraction needs to keep separate,
//! so it is spliced into its referencing root and its index retired.

use crate::dfs::{DfsOrder, Event};
use crate::log::NormalizationLog;
use std::collections::{HashMap, HashSet};
use thicket_automata::{reduce, State, TreeAut};
use thicket_core::{Data, RootIdx};
use thicket_fae::ForestAutomaton;
use thicket_label::Label;

/// Runs one normalization pass over `fae` in place, returning the log the
/// backward run needs to invert it.
pub fn normalize(fae: &mut ForestAutomaton) -> NormalizationLog {
    fae.recompute_connection_graph();

    let mut log = NormalizationLog::new();
    log.create_identity_mapping(fae.root_count());

    let mut in_degree: HashMap<RootIdx, usize> = HashMap::new();
    for idx in 0..fae.root_count() {
        let r = RootIdx::from(idx);
        for succ in fae.connection_graph().direct_successors(r) {
            *in_degree.entry(succ).or_insert(0) += 1;
        }
    }
    let var_targets: HashSet<RootIdx> = fae
        .vars()
        .values()
        .filter_map(Data::as_ref_target)
        .map(|(r, _)| r)
        .collect();

    let entry_roots: Vec<RootIdx> = (0..fae.root_count())
        .map(RootIdx::from)
        .filter(|r| var_targets.contains(r) || in_degree.get(r).copied().unwrap_or(0) != 1)
        .collect();

    let order: Vec<RootIdx> = {
        let cg = fae.connection_graph().clone();
        let successors = move |r: RootIdx| cg.direct_successors(r).into_iter().collect::<Vec<_>>();
        DfsOrder::new(entry_roots, successors)
            .filter_map(|e| match e {
                Event::Exit(r) => Some(r),
                Event::Enter(_) => None,
            })
            .collect()
    };

    for r in order {
        let r = log.resolve(r);
        if fae.root(r).is_none() {
            continue;
        }
        let indeg = in_degree.get(&r).copied().unwrap_or(0);
        if indeg != 1 || var_targets.contains(&r) {
            continue;
        }
        let predecessor = (0..fae.root_count())
            .map(RootIdx::from)
            .find(|&p| fae.root(p).is_some() && fae.connection_graph().direct_successors(p).contains(&r));
        let Some(pred) = predecessor else { continue };
        let pred = log.resolve(pred);
        if pred == r {
            continue;
        }
        merge_into(fae, &mut log, pred, r);
        fae.recompute_connection_graph();
    }

    log.finalize();
    log
}

fn merge_into(fae: &mut ForestAutomaton, log: &mut NormalizationLog, survivor: RootIdx, merged: RootIdx) {
    let (Some(pred_ta), Some(child_ta)) = (fae.root(survivor).cloned(), fae.root(merged).cloned()) else {
        return;
    };
    let shift = pred_ta.high_water_mark();
    let child_shifted = child_ta.rename(|s| State(s.0 + shift));

    let mut unioned = TreeAut::new();
    let mut splice_points: Vec<State> = Vec::new();
    for t in pred_ta.transitions() {
        let is_ref_to_merged = matches!(
            fae.labels().get(t.label),
            Label::Data(Data::Ref { root, .. }, _) if *root == merged
        );
        if is_ref_to_merged {
            splice_points.push(t.rhs);
            continue;
        }
        unioned.add_transition(t.lhs.clone(), t.label, t.rhs);
    }
    for f in pred_ta.final_states() {
        unioned.add_final(*f);
    }
    for t in child_shifted.transitions() {
        unioned.add_transition(t.lhs.clone(), t.label, t.rhs);
    }

    let mut classes: Vec<Vec<State>> = Vec::new();
    for &q in &splice_points {
        let mut class = vec![q];
        for &cf in child_shifted.final_states() {
            class.push(cf);
            let original_cf = State(cf.0 - shift);
            log.add_join_state(survivor, q, original_cf);
        }
        classes.push(class);
    }

    let collapsed = unioned.collapsed(&classes);
    let reduced = reduce::useless_and_unreachable_free(&collapsed);
    fae.set_root(survivor, reduced);
    fae.relabel_references(merged, survivor);

    // The merged root's own data leaves referencing it are gone now (it
    // has been spliced structurally); drop the slot without invalidating
    // the reference we just repointed above.
    fae.free_slot_only(merged);

    log.add_merged_root(survivor, merged);
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::DataId;

    #[test]
    fn merges_unique_successor_into_predecessor() {
        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
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

        let log = normalize(&mut fae);
        assert_eq!(log.len(), 1);
        assert!(fae.root(child).is_none());
        assert!(fae.root(pred).is_some());
    }

    #[test]
    fn a_root_referenced_by_two_variables_is_not_merged() {
        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q = ta.fresh_state();
        ta.add_transition(vec![], leaf, q);
        ta.add_final(q);
        let r = fae.alloc_root(ta);
        fae.bind_var(0, Data::Ref { root: r, displ: 0 });
        fae.bind_var(1, Data::Ref { root: r, displ: 0 });

        let log = normalize(&mut fae);
        assert!(log.is_empty());
        assert!(fae.root(r).is_some());
    }
}

// crates/thicket-refine/src/backward.rs

//! The backward run: walk a trace in reverse, shrinking the running
//! backward FA by bottom-up intersection against each stored snapshot,
//! reverting normalization and folding as it goes, until either the entry
//! state is reached (the error is real) or some root's intersection goes
//! empty (the trace is spurious, and a predicate is learned from it)
//! (`spec.md` §4.7).

use crate::fold_revert::revert_folding;
use crate::normalize_revert::revert_normalization;
use crate::trace::Trace;
use std::collections::HashMap;
use thicket_automata::intersection::{intersection_bu, ProdMap};
use thicket_automata::{reduce, TreeAut};
use thicket_core::RootIdx;
use thicket_fae::ForestAutomaton;
use thicket_label::{BoxId, LabelArena};

/// What the backward run concluded about the trace it walked.
pub enum RefinementOutcome {
    /// No root's intersection ever went empty: the trace survives all the
    /// way back to the entry state, so the error it witnesses is real.
    RealError,
    /// The trace is spurious: intersection went empty at `root`.
    /// `learned_predicates` are the backward FA's components at that root,
    /// published through the fixpoint engine's predicate-abstraction mode
    /// before the caller restarts symbolic execution from the entry state.
    Spurious {
        root: RootIdx,
        learned_predicates: Vec<TreeAut>,
    },
}

/// Walks `trace` in reverse. `box_db` is the full box database, consulted
/// to unfold whatever `trace`'s fold logs folded.
#[must_use]
pub fn backward_run(trace: &Trace, box_db: &HashMap<BoxId, TreeAut>) -> RefinementOutcome {
    let Some(last) = trace.steps().last() else {
        return RefinementOutcome::RealError;
    };

    // Every snapshot along one trace is a clone of the same continuously
    // growing forest automaton, so label IDs compare equal across steps
    // without re-interning; this engine just needs one arena to intern any
    // *new* labels it synthesizes while reverting (e.g. `cut_below`'s Ref
    // leaves), seeded from the most complete (latest) snapshot.
    let mut arena: LabelArena = last.fae_at_iteration.labels().clone();
    let mut backward = last.fae_at_iteration.clone();

    for step in trace.steps().iter().rev() {
        let root_count = backward.root_count().max(step.fae_at_iteration.root_count());
        let mut products: HashMap<RootIdx, (TreeAut, ProdMap)> = HashMap::new();

        for idx in 0..root_count {
            let root = RootIdx::from(idx);
            match (backward.root(root), step.fae_at_iteration.root(root)) {
                (None, None) => {}
                (Some(b), Some(f)) => {
                    let (product, prod_map) = intersection_bu(b, f);
                    if reduce::is_empty(&product) {
                        return RefinementOutcome::Spurious {
                            root,
                            learned_predicates: vec![b.clone()],
                        };
                    }
                    products.insert(root, (product, prod_map));
                }
                _ => {
                    // The two sides disagree on whether this root is live:
                    // a stale reference on one side. Conservatively treat
                    // as spurious so the caller restarts rather than
                    // reasoning over a mismatched shape.
                    return RefinementOutcome::Spurious {
                        root,
                        learned_predicates: backward.root(root).cloned().into_iter().collect(),
                    };
                }
            }
        }

        let reconstructed = revert_normalization(&products, &step.normalization_log, &mut arena);

        let mut next = ForestAutomaton::new();
        if root_count > 0 {
            // Pre-size `next` to `root_count` slots, all empty, so an
            // index touched by neither `set_root` nor `free_slot_only`
            // below still reports the right `root_count` to the next
            // (earlier) iteration of this loop.
            next.set_root(RootIdx::from(root_count - 1), TreeAut::new());
            next.free_slot_only(RootIdx::from(root_count - 1));
        }
        for (&var, value) in step.fae_at_iteration.vars() {
            next.bind_var(var, value.clone());
        }
        for idx in 0..root_count {
            let root = RootIdx::from(idx);
            if let Some(ta) = reconstructed.get(&root) {
                let unfolded = revert_folding(ta, root, &mut arena, &step.fold_log, box_db);
                next.set_root(root, unfolded);
            }
        }
        next.recompute_connection_graph();
        backward = next;
    }

    RefinementOutcome::RealError
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::BackwardStep;
    use thicket_core::Data;
    use thicket_label::{DataId, Label};
    use thicket_normalize::NormalizationLog;

    fn null_fae() -> ForestAutomaton {
        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_final(q0);
        fae.alloc_root(ta);
        fae
    }

    #[test]
    fn an_empty_trace_is_never_spurious() {
        let trace = Trace::new();
        let box_db = HashMap::new();
        assert!(matches!(backward_run(&trace, &box_db), RefinementOutcome::RealError));
    }

    #[test]
    fn a_trace_of_identical_snapshots_survives_as_a_real_error() {
        let fae = null_fae();
        let mut trace = Trace::new();
        trace.push(BackwardStep::new(fae.clone(), NormalizationLog::new(), thicket_fold::FoldLog::new()));
        trace.push(BackwardStep::new(fae, NormalizationLog::new(), thicket_fold::FoldLog::new()));
        let box_db = HashMap::new();
        assert!(matches!(backward_run(&trace, &box_db), RefinementOutcome::RealError));
    }

    #[test]
    fn disjoint_leaf_values_make_the_trace_spurious() {
        // Two snapshots sharing one arena lineage (as real trace steps
        // would) but each rooted at a transition using a distinct,
        // genuinely non-matching label.
        let mut base = ForestAutomaton::new();
        let leaf_a = base.labels_mut().intern(Label::Data(Data::Int(1), DataId(0)));
        let leaf_b = base.labels_mut().intern(Label::Data(Data::Int(2), DataId(1)));

        let mut fae_a = base.clone();
        let mut ta_a = TreeAut::new();
        let qa = ta_a.fresh_state();
        ta_a.add_transition(vec![], leaf_a, qa);
        ta_a.add_final(qa);
        fae_a.alloc_root(ta_a);

        let mut fae_b = base;
        let mut ta_b = TreeAut::new();
        let qb = ta_b.fresh_state();
        ta_b.add_transition(vec![], leaf_b, qb);
        ta_b.add_final(qb);
        fae_b.alloc_root(ta_b);

        let mut trace = Trace::new();
        trace.push(BackwardStep::new(fae_a, NormalizationLog::new(), thicket_fold::FoldLog::new()));
        trace.push(BackwardStep::new(fae_b, NormalizationLog::new(), thicket_fold::FoldLog::new()));

        let box_db = HashMap::new();
        let outcome = backward_run(&trace, &box_db);
        assert!(matches!(outcome, RefinementOutcome::Spurious { .. }));
    }
}

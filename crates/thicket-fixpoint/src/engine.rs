// crates/thicket-fixpoint/src/engine.rs

//! The per-loop-head fixpoint loop (`spec.md` §4.6).
//!
//! On entry with an FA `F` at a loop head: reorder/merge (normalize),
//! fold against the box database, abstract, repeat fold→normalize→abstract
//! a bounded number of rounds, then test the result for inclusion in the
//! accumulator already recorded at that loop head. Inclusion closes the
//! path; otherwise the accumulator grows and the caller gets back a
//! successor FA to keep executing from.

use crate::ufae;
use std::collections::{BTreeSet, HashMap};
use thicket_abstract::AbstractionConfig;
use thicket_automata::TreeAut;
use thicket_core::RootIdx;
use thicket_fae::ForestAutomaton;
use thicket_fold::FoldLog;
use thicket_label::{BoxId, LabelArena};
use thicket_normalize::NormalizationLog;

/// Which abstraction strategy a fixpoint pass should apply. Unlike
/// [`thicket_abstract::AbstractionMode`], this is an owned value (no
/// borrowed predicate slice) so it can be stored in a [`FixpointConfig`].
#[derive(Clone, Debug)]
pub enum AbstractionChoice {
    FiniteHeight(AbstractionConfig),
    Predicate(Vec<TreeAut>),
}

/// Tunables for one fixpoint pass.
#[derive(Clone, Debug)]
pub struct FixpointConfig {
    pub abstraction: AbstractionChoice,
    /// Bounds the fold→normalize→abstract refinement loop (spec §4.6 step
    /// 5): a dry round (no fold applied) always stops the loop first, this
    /// is only a backstop against a box database that keeps matching.
    pub max_refine_rounds: usize,
}

impl Default for FixpointConfig {
    fn default() -> Self {
        Self {
            abstraction: AbstractionChoice::FiniteHeight(AbstractionConfig::default()),
            max_refine_rounds: 8,
        }
    }
}

impl FixpointConfig {
    /// Applies `THICKET_MAX_REFINE_ROUNDS` on top of [`Default::default`],
    /// and builds its finite-height abstraction config (when that's the
    /// default choice) via [`AbstractionConfig::from_env`]. Ignores any
    /// variable that is unset or fails to parse.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self {
            abstraction: AbstractionChoice::FiniteHeight(AbstractionConfig::from_env()),
            ..Self::default()
        };
        if let Ok(v) = std::env::var("THICKET_MAX_REFINE_ROUNDS") {
            if let Ok(v) = v.parse::<usize>() {
                config.max_refine_rounds = v;
            }
        }
        config
    }
}

/// Result of processing one FA through a loop head's fixpoint pass.
pub enum FixpointOutcome {
    /// `F` was already covered by the accumulator; this path closes.
    Closed,
    /// `F` was not covered; the accumulator now includes it and `fae` is
    /// the successor state execution continues from, together with the
    /// logs needed to revert folding/normalization during a backward run.
    Continue {
        fae: ForestAutomaton,
        fold_log: FoldLog,
        normalization_log: NormalizationLog,
    },
}

/// Accumulates, per loop head, the union of every FA that has closed
/// through it, plus the shared label arena every accumulated FA's labels
/// are re-interned through.
#[derive(Default)]
pub struct FixpointEngine {
    arena: LabelArena,
    accumulators: HashMap<u32, TreeAut>,
}

fn pinned_roots(fae: &ForestAutomaton) -> BTreeSet<RootIdx> {
    fae.vars()
        .values()
        .filter_map(thicket_core::Data::as_ref_target)
        .map(|(root, _)| root)
        .collect()
}

impl FixpointEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of loop heads this engine has recorded an accumulator for.
    #[must_use]
    pub fn tracked_loop_heads(&self) -> usize {
        self.accumulators.len()
    }

    /// Drops the accumulated invariant at `loop_id` (`spec.md` §7: a
    /// refinement signal "clears accumulated `fwdConf` tables and
    /// restarts"). Other loop heads' accumulators are untouched.
    pub fn clear(&mut self, loop_id: u32) {
        self.accumulators.remove(&loop_id);
    }

    /// Runs one fixpoint pass for `fae` observed at `loop_id`. `frame_of`
    /// maps a root to its owning stack frame's identity (`None` for roots
    /// with no frame), consulted by finite-height abstraction when
    /// `!stack_frame_abstraction`.
    pub fn process(
        &mut self,
        loop_id: u32,
        mut fae: ForestAutomaton,
        box_db: &[(BoxId, TreeAut)],
        config: &FixpointConfig,
        frame_of: &impl Fn(RootIdx) -> Option<u32>,
    ) -> FixpointOutcome {
        let pinned = pinned_roots(&fae);

        let mut normalization_log = thicket_normalize::normalize(&mut fae);
        let mut fold_log = FoldLog::new();

        for _ in 0..config.max_refine_rounds.max(1) {
            let folded_any = fold_round(&mut fae, &pinned, box_db, &mut fold_log);
            if folded_any {
                normalization_log = thicket_normalize::normalize(&mut fae);
            }
            abstract_round(&mut fae, &pinned, &config.abstraction, frame_of);
            if !folded_any {
                break;
            }
        }

        let live_vars: BTreeSet<u32> = fae.vars().keys().copied().collect();
        let encoded = ufae::encode(&fae, &mut self.arena, &live_vars);
        let accumulator = self.accumulators.entry(loop_id).or_insert_with(TreeAut::new);

        if thicket_automata::inclusion::subseteq(&encoded, accumulator) {
            FixpointOutcome::Closed
        } else {
            *accumulator = accumulator.union_disjoint(&encoded);
            FixpointOutcome::Continue {
                fae,
                fold_log,
                normalization_log,
            }
        }
    }

}

fn fold_round(
    fae: &mut ForestAutomaton,
    pinned: &BTreeSet<RootIdx>,
    box_db: &[(BoxId, TreeAut)],
    fold_log: &mut FoldLog,
) -> bool {
    let mut folded_any = false;
    for idx in 0..fae.root_count() {
        let root = RootIdx::from(idx);
        if pinned.contains(&root) {
            continue;
        }
        let Some(ta) = fae.root(root).cloned() else {
            continue;
        };
        for (box_id, box_ta) in box_db {
            if let Some((new_ta, record)) = thicket_fold::fold_root(&ta, fae.labels_mut(), *box_id, box_ta) {
                fae.set_root(root, new_ta);
                fold_log.push(root, record);
                folded_any = true;
                break;
            }
        }
    }
    folded_any
}

fn abstract_round(
    fae: &mut ForestAutomaton,
    pinned: &BTreeSet<RootIdx>,
    choice: &AbstractionChoice,
    frame_of: &impl Fn(RootIdx) -> Option<u32>,
) {
    let mode = match choice {
        AbstractionChoice::FiniteHeight(c) => thicket_abstract::AbstractionMode::FiniteHeight(*c),
        AbstractionChoice::Predicate(ps) => thicket_abstract::AbstractionMode::Predicate(ps),
    };
    thicket_abstract::abstract_fa(fae, pinned, &mode, frame_of);
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::Data;
    use thicket_label::{DataId, Label};

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
    fn first_visit_to_a_loop_head_never_closes() {
        let mut engine = FixpointEngine::new();
        let fae = null_fae();
        let outcome = engine.process(0, fae, &[], &FixpointConfig::default(), &|_| None);
        assert!(matches!(outcome, FixpointOutcome::Continue { .. }));
    }

    #[test]
    fn revisiting_with_the_same_shape_closes() {
        let mut engine = FixpointEngine::new();
        let outcome1 = engine.process(0, null_fae(), &[], &FixpointConfig::default(), &|_| None);
        let FixpointOutcome::Continue { .. } = outcome1 else {
            panic!("expected first visit to continue");
        };
        let outcome2 = engine.process(0, null_fae(), &[], &FixpointConfig::default(), &|_| None);
        assert!(matches!(outcome2, FixpointOutcome::Closed));
    }
}

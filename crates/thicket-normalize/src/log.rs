// crates/thicket-normalize/src/log.rs

//! `NormalizationLog`: an invertible record of what canonicalization did.
//!
//! Grounded on `fa/normalization.hh`'s `NormalizationInfo`
//! (`rootsMerging_`/`joinStates_`/`rootMapping_`), kept as three parallel
//! structures for the same reason the original does: root merges, the
//! automaton-state identifications each merge performed, and the final
//! old-root -> surviving-root mapping are each consulted independently by
//! the backward run when undoing a normalization step
//! (`spec.md` §4.7).

use std::collections::HashMap;
use thicket_automata::State;
use thicket_core::RootIdx;

/// One root-merge step: `merged` was folded into `survivor` because a DFS
/// walk found `merged` has exactly one incoming reference, from `survivor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RootMerge {
    pub survivor: RootIdx,
    pub merged: RootIdx,
}

/// A record of `NormalizationLog::normalize`'s effect on one forest
/// automaton, sufficient to invert it.
#[derive(Clone, Debug, Default)]
pub struct NormalizationLog {
    /// In the order they were performed; replaying them in order
    /// reconstructs the final automaton, replaying them in reverse undoes it.
    roots_merging: Vec<RootMerge>,
    /// Per surviving root, the `(state-in-survivor, state-in-merged-away)`
    /// pairs that were identified to splice the merged component in.
    join_states: HashMap<RootIdx, Vec<(State, State)>>,
    /// Old root index -> the root it ultimately survives as, after
    /// following every merge performed.
    root_mapping: HashMap<RootIdx, RootIdx>,
    finalized: bool,
}

impl NormalizationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the mapping with the identity, one entry per existing root,
    /// before any merges are recorded.
    pub fn create_identity_mapping(&mut self, root_count: usize) {
        self.root_mapping = (0..root_count)
            .map(|i| (RootIdx::from(i), RootIdx::from(i)))
            .collect();
    }

    pub fn add_merged_root(&mut self, survivor: RootIdx, merged: RootIdx) {
        self.roots_merging.push(RootMerge { survivor, merged });
        self.root_mapping.insert(merged, survivor);
        // Anything that already mapped onto `merged` now maps onto
        // `survivor` instead, so later lookups resolve transitively.
        for target in self.root_mapping.values_mut() {
            if *target == merged {
                *target = survivor;
            }
        }
    }

    pub fn add_join_state(&mut self, survivor: RootIdx, in_survivor: State, in_merged: State) {
        self.join_states
            .entry(survivor)
            .or_default()
            .push((in_survivor, in_merged));
    }

    #[must_use]
    pub fn join_states_for(&self, survivor: RootIdx) -> &[(State, State)] {
        self.join_states.get(&survivor).map_or(&[], Vec::as_slice)
    }

    /// Resolves `root` through every merge performed so far.
    #[must_use]
    pub fn resolve(&self, root: RootIdx) -> RootIdx {
        self.root_mapping.get(&root).copied().unwrap_or(root)
    }

    #[must_use]
    pub fn contains_merged_root(&self, root: RootIdx) -> bool {
        self.roots_merging.iter().any(|m| m.merged == root)
    }

    #[must_use]
    pub fn merges_in_order(&self) -> &[RootMerge] {
        &self.roots_merging
    }

    /// Merges performed, latest first: the order the backward run must
    /// undo them in.
    #[must_use]
    pub fn merges_reversed(&self) -> Vec<RootMerge> {
        let mut v = self.roots_merging.clone();
        v.reverse();
        v
    }

    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    #[must_use]
    pub fn empty(&self) -> bool {
        self.roots_merging.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.roots_merging.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.empty()
    }

    pub fn clear(&mut self) {
        self.roots_merging.clear();
        self.join_states.clear();
        self.root_mapping.clear();
        self.finalized = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_follows_transitive_merges() {
        let mut log = NormalizationLog::new();
        log.create_identity_mapping(3);
        log.add_merged_root(RootIdx::new(0), RootIdx::new(1));
        log.add_merged_root(RootIdx::new(1), RootIdx::new(2));
        assert_eq!(log.resolve(RootIdx::new(2)), RootIdx::new(0));
        assert_eq!(log.resolve(RootIdx::new(1)), RootIdx::new(0));
    }

    #[test]
    fn merges_reversed_undoes_in_lifo_order() {
        let mut log = NormalizationLog::new();
        log.add_merged_root(RootIdx::new(0), RootIdx::new(1));
        log.add_merged_root(RootIdx::new(0), RootIdx::new(2));
        let reversed = log.merges_reversed();
        assert_eq!(reversed[0].merged, RootIdx::new(2));
        assert_eq!(reversed[1].merged, RootIdx::new(1));
    }
}

// crates/thicket-fae/src/connection_graph.rs

//! Per-root reachability summaries (`spec.md` §4.2, "ConnectionGraph").
//!
//! A forest automaton's components reference each other through data
//! leaves carrying [`thicket_core::Data::Ref`]. The connection graph
//! records, for each root, which other roots it can reach — directly or
//! transitively — so abstraction can tell two states with different
//! reachable-root sets apart (the cutpoint signature) and the garbage
//! checker can tell a self-contained cycle from a reachable structure.

use crate::tarjan::strongly_connected_components;
use std::collections::{BTreeSet, HashMap};
use thicket_automata::TreeAut;
use thicket_core::{Data, RootIdx};
use thicket_label::{Label, LabelArena};

/// The set of roots reachable from one root, used as the merge key by
/// finite-height abstraction (`thicket_automata::abstraction::height_abstraction`).
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CutpointSignature {
    pub reachable: BTreeSet<RootIdx>,
}

/// A forest automaton's full cross-component reference structure.
#[derive(Clone, Debug, Default)]
pub struct ConnectionGraph {
    direct_successors: HashMap<RootIdx, BTreeSet<RootIdx>>,
    signatures: HashMap<RootIdx, CutpointSignature>,
    /// Strongly connected components of the direct-reference graph; any
    /// component with more than one root, or a singleton with a self-loop,
    /// is a cyclic structure (e.g. a circular list).
    cycles: Vec<Vec<RootIdx>>,
}

impl ConnectionGraph {
    /// Scans every root's data leaves for `Ref` values and builds the
    /// direct-successor graph, its transitive closure (the per-root
    /// cutpoint signatures), and its strongly connected components.
    #[must_use]
    pub fn compute(roots: &[Option<TreeAut>], arena: &LabelArena) -> Self {
        let n = roots.len();
        let mut direct_successors: HashMap<RootIdx, BTreeSet<RootIdx>> = HashMap::new();

        for (idx, root) in roots.iter().enumerate() {
            let Some(ta) = root else { continue };
            let me = RootIdx::from(idx);
            let succs = direct_successors.entry(me).or_default();
            for t in ta.transitions() {
                if let Label::Data(Data::Ref { root: target, .. }, _) = arena.get(t.label) {
                    succs.insert(*target);
                }
            }
        }

        let successors_of = |v: usize| -> Vec<usize> {
            direct_successors
                .get(&RootIdx::from(v))
                .into_iter()
                .flat_map(|s| s.iter().map(|r| r.index()))
                .collect()
        };
        let sccs = strongly_connected_components(n, &successors_of);
        let cycles: Vec<Vec<RootIdx>> = sccs
            .into_iter()
            .filter(|c| {
                c.len() > 1
                    || c.first().is_some_and(|&v| {
                        direct_successors
                            .get(&RootIdx::from(v))
                            .is_some_and(|s| s.contains(&RootIdx::from(v)))
                    })
            })
            .map(|c| c.into_iter().map(RootIdx::from).collect())
            .collect();

        let mut signatures = HashMap::new();
        for idx in 0..n {
            let root = RootIdx::from(idx);
            let mut reachable = BTreeSet::new();
            let mut frontier = vec![root];
            while let Some(r) = frontier.pop() {
                if let Some(succs) = direct_successors.get(&r) {
                    for &s in succs {
                        if reachable.insert(s) {
                            frontier.push(s);
                        }
                    }
                }
            }
            signatures.insert(root, CutpointSignature { reachable });
        }

        Self {
            direct_successors,
            signatures,
            cycles,
        }
    }

    #[must_use]
    pub fn signature(&self, root: RootIdx) -> CutpointSignature {
        self.signatures.get(&root).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn direct_successors(&self, root: RootIdx) -> BTreeSet<RootIdx> {
        self.direct_successors.get(&root).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn cycles(&self) -> &[Vec<RootIdx>] {
        &self.cycles
    }

    #[must_use]
    pub fn is_in_cycle(&self, root: RootIdx) -> bool {
        self.cycles.iter().any(|c| c.contains(&root))
    }
}

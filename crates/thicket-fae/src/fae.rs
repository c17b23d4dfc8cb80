// crates/thicket-fae/src/fae.rs

//! `ForestAutomaton`: `(Roots, Vars, CG)` (`spec.md` §4.2).

use crate::connection_graph::ConnectionGraph;
use std::collections::HashMap;
use thicket_automata::{inclusion, reduce, TreeAut};
use thicket_core::{Data, RootIdx};
use thicket_label::{Label, LabelArena};

/// An ordered tuple of tree-automaton components, tied together by
/// typed cross-references, plus the program variables currently bound
/// into it. `None` roots are holes left by `free_position` — kept so
/// every live root's index stays stable until the next normalization
/// pass compacts them.
#[derive(Clone, Debug, Default)]
pub struct ForestAutomaton {
    roots: Vec<Option<TreeAut>>,
    labels: LabelArena,
    vars: HashMap<u32, Data>,
    cg: ConnectionGraph,
}

impl ForestAutomaton {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn root_count(&self) -> usize {
        self.roots.len()
    }

    #[must_use]
    pub fn root(&self, idx: RootIdx) -> Option<&TreeAut> {
        self.roots.get(idx.index()).and_then(Option::as_ref)
    }

    #[must_use]
    pub fn labels(&self) -> &LabelArena {
        &self.labels
    }

    pub fn labels_mut(&mut self) -> &mut LabelArena {
        &mut self.labels
    }

    /// Appends a brand-new component and returns its index.
    pub fn alloc_root(&mut self, ta: TreeAut) -> RootIdx {
        let idx = RootIdx::from(self.roots.len());
        self.roots.push(Some(ta));
        idx
    }

    /// Alias of [`Self::alloc_root`], named to match the operation as
    /// described in `spec.md` §4.2 ("append_root").
    pub fn append_root(&mut self, ta: TreeAut) -> RootIdx {
        self.alloc_root(ta)
    }

    /// Overwrites an existing component in place (e.g. after folding
    /// replaces it with an equivalent, smaller automaton).
    pub fn set_root(&mut self, idx: RootIdx, ta: TreeAut) {
        if idx.index() >= self.roots.len() {
            self.roots.resize(idx.index() + 1, None);
        }
        self.roots[idx.index()] = Some(ta);
    }

    /// Releases a root (e.g. on `free`): the hole is left behind rather
    /// than compacted, so every other root's index stays valid.
    pub fn free_position(&mut self, idx: RootIdx) {
        self.free_slot_only(idx);
        self.invalidate_reference(idx);
    }

    /// Clears a root's slot without touching any reference to it. Used by
    /// normalization's root-merge step, which has already repointed every
    /// reference to the surviving root via [`Self::relabel_references`]
    /// and would otherwise stomp on that repointing by invalidating it.
    pub fn free_slot_only(&mut self, idx: RootIdx) {
        if let Some(slot) = self.roots.get_mut(idx.index()) {
            *slot = None;
        }
    }

    pub fn bind_var(&mut self, var: u32, value: Data) {
        self.vars.insert(var, value);
    }

    #[must_use]
    pub fn var(&self, var: u32) -> Option<&Data> {
        self.vars.get(&var)
    }

    #[must_use]
    pub fn vars(&self) -> &HashMap<u32, Data> {
        &self.vars
    }

    fn rewrite_data(&mut self, rewrite: impl Fn(&Data) -> Option<Data>) {
        for v in self.vars.values_mut() {
            if let Some(new_v) = rewrite(v) {
                *v = new_v;
            }
        }
        for root in self.roots.iter_mut().flatten() {
            let mut out = TreeAut::new();
            for t in root.transitions() {
                let new_label = match self.labels.get(t.label) {
                    Label::Data(d, id) => rewrite(d).map(|new_d| {
                        self.labels.intern(Label::Data(new_d, *id))
                    }),
                    Label::Node(_) | Label::VData(_) => None,
                };
                out.add_transition(t.lhs.clone(), new_label.unwrap_or(t.label), t.rhs);
            }
            for f in root.final_states() {
                out.add_final(*f);
            }
            *root = out;
        }
    }

    /// Rewrites every `Ref { root: old, .. }` across all variables and
    /// components to point at `new`. The core primitive behind
    /// `thicket-normalize`'s root merging.
    pub fn relabel_references(&mut self, old: RootIdx, new: RootIdx) {
        self.rewrite_data(|d| match d {
            Data::Ref { root, displ } if *root == old => Some(Data::Ref { root: new, displ: *displ }),
            _ => None,
        });
    }

    /// Replaces every reference to `target` with `Undef`, matching the
    /// original's `invalidateReference`: used when a root is freed so
    /// dangling references fail the next dereference explicitly rather
    /// than silently resolving to a reused index.
    pub fn invalidate_reference(&mut self, target: RootIdx) {
        self.rewrite_data(|d| match d {
            Data::Ref { root, .. } if *root == target => Some(Data::Undef),
            _ => None,
        });
    }

    /// Overwrites every data leaf of `root` with `value` (a bounded
    /// `memset`-style store spanning a whole node).
    pub fn set_labels_to_value(&mut self, root: RootIdx, value: Data) {
        let Some(ta) = self.roots.get(root.index()).and_then(Option::as_ref) else {
            return;
        };
        let mut out = TreeAut::new();
        let new_label = self.labels.intern(Label::Data(value, thicket_label::DataId(0)));
        for t in ta.transitions() {
            let label = if matches!(self.labels.get(t.label), Label::Data(..)) {
                new_label
            } else {
                t.label
            };
            out.add_transition(t.lhs.clone(), label, t.rhs);
        }
        for f in ta.final_states() {
            out.add_final(*f);
        }
        self.roots[root.index()] = Some(out);
    }

    pub fn recompute_connection_graph(&mut self) {
        self.cg = ConnectionGraph::compute(&self.roots, &self.labels);
    }

    #[must_use]
    pub fn connection_graph(&self) -> &ConnectionGraph {
        &self.cg
    }

    /// Bottom-up unreachable/useless-state cleanup of every component.
    pub fn unreachable_free(&mut self) {
        for root in self.roots.iter_mut().flatten() {
            *root = reduce::useless_and_unreachable_free(root);
        }
    }

    /// `L(self) subseteq L(other)`, checked componentwise: the two forest
    /// automata must agree on root count and on every variable binding
    /// exactly, and every pair of corresponding components must satisfy
    /// tree-automaton inclusion.
    #[must_use]
    pub fn subseteq(&self, other: &Self) -> bool {
        if self.roots.len() != other.roots.len() {
            return false;
        }
        if self.vars != other.vars {
            return false;
        }
        self.roots
            .iter()
            .zip(other.roots.iter())
            .all(|(a, b)| match (a, b) {
                (None, None) => true,
                (Some(a), Some(b)) => inclusion::subseteq(a, b),
                _ => false,
            })
    }

    /// Filters `candidates` down to those compatible with `self`: same
    /// root count and variable-binding shape, so an inclusion test against
    /// them can even be attempted (`spec.md` §4.2,
    /// "load_compatible_FAs" — used by the fixpoint accumulator to avoid
    /// testing inclusion against structurally unrelated FAs).
    #[must_use]
    pub fn load_compatible_fas<'a>(&self, candidates: &'a [Self]) -> Vec<&'a Self> {
        candidates
            .iter()
            .filter(|c| c.roots.len() == self.roots.len() && c.vars.keys().eq(self.vars.keys()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::DataId;

    #[test]
    fn free_position_invalidates_dangling_references() {
        let mut fae = ForestAutomaton::new();
        let null_label = fae.labels_mut().intern(Label::Data(Data::Null, DataId(0)));
        let mut ta0 = TreeAut::new();
        let q0 = ta0.fresh_state();
        ta0.add_transition(vec![], null_label, q0);
        let r0 = fae.alloc_root(ta0);

        let ref_label = fae
            .labels_mut()
            .intern(Label::Data(Data::Ref { root: r0, displ: 0 }, DataId(1)));
        let mut ta1 = TreeAut::new();
        let q1 = ta1.fresh_state();
        ta1.add_transition(vec![], ref_label, q1);
        fae.alloc_root(ta1);
        fae.bind_var(0, Data::Ref { root: r0, displ: 0 });

        fae.free_position(r0);
        assert_eq!(fae.var(0), Some(&Data::Undef));
    }

    #[test]
    fn subseteq_requires_equal_root_count() {
        let a = ForestAutomaton::new();
        let mut b = ForestAutomaton::new();
        b.alloc_root(TreeAut::new());
        assert!(!a.subseteq(&b));
    }
}

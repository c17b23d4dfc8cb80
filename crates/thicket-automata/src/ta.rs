// crates/thicket-automata/src/ta.rs

//! `TreeAut`: the `(Q, F, Delta)` bottom-up tree automaton itself.

use crate::state::{State, StateAllocator};
use crate::transition::Transition;
use std::collections::{BTreeSet, HashMap, HashSet};
use thicket_label::LabelId;

/// A bottom-up finite tree automaton.
///
/// Transitions are stored once and indexed by both `rhs` (for bottom-up
/// construction: "what can I build on top of state `q`?") and by
/// `(label, rhs)` (for the product constructions, which need to line up
/// transitions with equal label before pairing children).
#[derive(Clone, Debug, Default)]
pub struct TreeAut {
    states: BTreeSet<State>,
    finals: BTreeSet<State>,
    transitions: Vec<Transition>,
    by_rhs: HashMap<State, Vec<usize>>,
    alloc: StateAllocator,
}

impl TreeAut {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fresh_state(&mut self) -> State {
        let s = self.alloc.fresh();
        self.states.insert(s);
        s
    }

    /// Registers a state that was allocated elsewhere (e.g. copied over
    /// from another automaton), bumping the allocator past it so future
    /// `fresh_state` calls never collide.
    pub fn register_state(&mut self, s: State) {
        self.states.insert(s);
        if s.0 >= self.alloc.high_water_mark() {
            self.alloc = StateAllocator::starting_at(s.0 + 1);
        }
    }

    pub fn add_transition(&mut self, lhs: Vec<State>, label: LabelId, rhs: State) {
        for &q in &lhs {
            self.register_state(q);
        }
        self.register_state(rhs);
        let t = Transition::new(lhs, label, rhs);
        if self.transitions.iter().any(|existing| *existing == t) {
            return;
        }
        let idx = self.transitions.len();
        self.by_rhs.entry(t.rhs).or_default().push(idx);
        self.transitions.push(t);
    }

    pub fn add_final(&mut self, s: State) {
        self.register_state(s);
        self.finals.insert(s);
    }

    pub fn add_finals(&mut self, states: impl IntoIterator<Item = State>) {
        for s in states {
            self.add_final(s);
        }
    }

    pub fn remove_final(&mut self, s: State) {
        self.finals.remove(&s);
    }

    #[must_use]
    pub fn is_final(&self, s: State) -> bool {
        self.finals.contains(&s)
    }

    #[must_use]
    pub fn final_states(&self) -> &BTreeSet<State> {
        &self.finals
    }

    #[must_use]
    pub fn states(&self) -> &BTreeSet<State> {
        &self.states
    }

    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// One past the largest state index ever allocated in this automaton;
    /// the shift [`Self::union_disjoint`] applies to the other operand's
    /// states, exposed so callers that need to track where a specific
    /// state ended up (normalization's join-state bookkeeping) can repeat
    /// the same arithmetic.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.alloc.high_water_mark()
    }

    #[must_use]
    pub fn transitions_with_rhs(&self, rhs: State) -> impl Iterator<Item = &Transition> {
        self.by_rhs
            .get(&rhs)
            .into_iter()
            .flatten()
            .map(move |&idx| &self.transitions[idx])
    }

    /// All distinct labels used by transitions into `rhs`.
    #[must_use]
    pub fn labels_at(&self, rhs: State) -> HashSet<LabelId> {
        self.transitions_with_rhs(rhs).map(|t| t.label).collect()
    }

    /// Produces a fresh automaton with every state `q` replaced by
    /// `mapping(q)`. Multiple source states may collapse onto one target
    /// state; duplicate transitions that result are deduplicated.
    #[must_use]
    pub fn rename(&self, mapping: impl Fn(State) -> State) -> Self {
        let mut out = Self::new();
        for t in &self.transitions {
            let lhs = t.lhs.iter().map(|&q| mapping(q)).collect();
            let rhs = mapping(t.rhs);
            out.add_transition(lhs, t.label, rhs);
        }
        for &f in &self.finals {
            out.add_final(mapping(f));
        }
        out
    }

    /// Disjoint union: shifts every state of `other` past the current
    /// automaton's high-water mark so the two state spaces cannot collide,
    /// then merges transitions and final states. Used by the fixpoint
    /// engine to build a UFAE accumulator (`spec.md` §4.6).
    #[must_use]
    pub fn union_disjoint(&self, other: &Self) -> Self {
        let shift = self.alloc.high_water_mark();
        let shifted = other.rename(|s| State(s.0 + shift));
        let mut out = self.clone();
        out.alloc = StateAllocator::starting_at(shift + shifted.alloc.high_water_mark());
        for t in &shifted.transitions {
            out.add_transition(t.lhs.clone(), t.label, t.rhs);
        }
        for &f in &shifted.finals {
            out.add_final(f);
        }
        out
    }

    /// Merges every state in `class` into its first (smallest) member,
    /// rewriting every transition and the final-state set accordingly.
    /// The core primitive behind both finite-height abstraction and
    /// `thicket-normalize`'s merge-into-predecessor step.
    #[must_use]
    pub fn collapsed(&self, classes: &[Vec<State>]) -> Self {
        let mut rep = HashMap::new();
        for class in classes {
            if let Some(&leader) = class.iter().min() {
                for &s in class {
                    rep.insert(s, leader);
                }
            }
        }
        self.rename(|s| *rep.get(&s).unwrap_or(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::{LabelArena, Label};

    fn leaf_label(arena: &mut LabelArena) -> LabelId {
        arena.intern(Label::Data(thicket_core::Data::Null, thicket_label::DataId(0)))
    }

    #[test]
    fn add_transition_deduplicates() {
        let mut arena = LabelArena::new();
        let lbl = leaf_label(&mut arena);
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], lbl, q0);
        ta.add_transition(vec![], lbl, q0);
        assert_eq!(ta.transitions().len(), 1);
    }

    #[test]
    fn rename_merges_collapsed_states() {
        let mut arena = LabelArena::new();
        let lbl = leaf_label(&mut arena);
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        let q1 = ta.fresh_state();
        ta.add_transition(vec![], lbl, q0);
        ta.add_transition(vec![], lbl, q1);
        ta.add_final(q0);
        ta.add_final(q1);
        let collapsed = ta.collapsed(&[vec![q0, q1]]);
        assert_eq!(collapsed.final_states().len(), 1);
        assert_eq!(collapsed.transitions().len(), 1);
    }

    #[test]
    fn union_disjoint_keeps_both_languages() {
        let mut arena = LabelArena::new();
        let lbl = leaf_label(&mut arena);
        let mut a = TreeAut::new();
        let a0 = a.fresh_state();
        a.add_transition(vec![], lbl, a0);
        a.add_final(a0);

        let mut b = TreeAut::new();
        let b0 = b.fresh_state();
        b.add_transition(vec![], lbl, b0);
        b.add_final(b0);

        let u = a.union_disjoint(&b);
        assert_eq!(u.final_states().len(), 2);
        assert_eq!(u.transitions().len(), 2);
    }
}

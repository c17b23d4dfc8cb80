// crates/thicket-automata/src/transition.rs

//! A single bottom-up transition `label(q1, .., qn) -> q`.

use crate::state::State;
use thicket_label::LabelId;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Transition {
    /// Children, in argument order. Empty for a leaf (nullary) transition.
    pub lhs: Vec<State>,
    /// The transition's label.
    pub label: LabelId,
    /// The state the transition produces.
    pub rhs: State,
}

impl Transition {
    #[must_use]
    pub fn new(lhs: Vec<State>, label: LabelId, rhs: State) -> Self {
        Self { lhs, label, rhs }
    }

    #[inline]
    #[must_use]
    pub fn arity(&self) -> usize {
        self.lhs.len()
    }

    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.lhs.is_empty()
    }
}

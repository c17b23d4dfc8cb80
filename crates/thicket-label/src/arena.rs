// crates/thicket-label/src/arena.rs

//! Hash-consing for [`Label`]s.
//!
//! Tree automata compare and hash transitions constantly (inclusion,
//! minimization, the intersection product map); interning labels once and
//! comparing small integer ids afterward keeps those comparisons cheap.

use crate::label::Label;
use std::collections::HashMap;

/// Interned label handle. Two equal labels always intern to the same id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LabelId(u32);

/// The interning table itself.
#[derive(Debug, Default)]
pub struct LabelArena {
    labels: Vec<Label>,
    index: HashMap<Label, LabelId>,
}

impl LabelArena {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns `label`, returning its (possibly pre-existing) id.
    pub fn intern(&mut self, label: Label) -> LabelId {
        if let Some(&id) = self.index.get(&label) {
            return id;
        }
        let id = LabelId(u32::try_from(self.labels.len()).expect("label arena overflow"));
        self.index.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    #[must_use]
    pub fn get(&self, id: LabelId) -> &Label {
        &self.labels[id.0 as usize]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::AbstractBox;
    use thicket_core::SelData;

    #[test]
    fn interning_deduplicates_equal_labels() {
        let mut arena = LabelArena::new();
        let sel = SelData::new(0, 8, 0);
        let a = arena.intern(Label::Node(vec![(0, AbstractBox::Selector(sel))]));
        let b = arena.intern(Label::Node(vec![(0, AbstractBox::Selector(sel))]));
        assert_eq!(a, b);
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn distinct_labels_get_distinct_ids() {
        let mut arena = LabelArena::new();
        let a = arena.intern(Label::Data(thicket_core::Data::Int(1), crate::label::DataId(0)));
        let b = arena.intern(Label::Data(thicket_core::Data::Int(2), crate::label::DataId(0)));
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
    }
}

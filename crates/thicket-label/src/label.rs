// crates/thicket-label/src/label.rs

//! The label carried by a single tree-automaton transition.

use crate::boxes::{AbstractBox, BoxId};
use serde::{Deserialize, Serialize};
use thicket_core::{Data, Offset};

/// Identity of a data leaf, used to distinguish leaves carrying equal
/// [`Data`] values when the distinction matters to inclusion/minimization
/// (e.g. two `Undef` leaves standing for different program variables).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DataId(pub u32);

/// A resolved item at one offset of a memory node: which box sits there,
/// which child of the transition it reads from, and at what offset within
/// that child's label. Mirrors `NodeLabel::NodeItem`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeItem {
    pub aux_box: BoxId,
    pub child_index: usize,
    pub offset: Offset,
}

/// A transition label (`spec.md` §3, "Label").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Label {
    /// A memory node: a set of `(offset, box)` pairs over the transition's
    /// children, in ascending offset order.
    Node(Vec<(Offset, AbstractBox)>),
    /// A single data leaf.
    Data(Data, DataId),
    /// A vector of data leaves, used by multi-field data nodes whose
    /// fields are not addressed individually through selectors.
    VData(Vec<Data>),
}

impl Label {
    #[inline]
    #[must_use]
    pub fn is_node(&self) -> bool {
        matches!(self, Label::Node(_))
    }

    #[inline]
    #[must_use]
    pub fn is_data(&self) -> bool {
        matches!(self, Label::Data(..) | Label::VData(_))
    }

    /// The box at `offset`, if this is a node label and something sits
    /// there.
    #[must_use]
    pub fn box_at(&self, offset: Offset) -> Option<&AbstractBox> {
        match self {
            Label::Node(items) => items
                .iter()
                .find(|(o, _)| *o == offset)
                .map(|(_, b)| b),
            Label::Data(..) | Label::VData(_) => None,
        }
    }

    /// All selectors carried by a node label, in offset order.
    #[must_use]
    pub fn selectors(&self) -> Vec<(Offset, thicket_core::SelData)> {
        match self {
            Label::Node(items) => items
                .iter()
                .filter_map(|(o, b)| b.as_selector().map(|s| (*o, s)))
                .collect(),
            Label::Data(..) | Label::VData(_) => Vec::new(),
        }
    }

    #[must_use]
    pub fn as_data(&self) -> Option<&Data> {
        match self {
            Label::Data(d, _) => Some(d),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxes::AbstractBox;
    use thicket_core::SelData;

    #[test]
    fn node_label_box_lookup() {
        let sel = SelData::new(8, 8, 0);
        let lbl = Label::Node(vec![(8, AbstractBox::Selector(sel))]);
        assert!(lbl.is_node());
        assert_eq!(lbl.box_at(8), Some(&AbstractBox::Selector(sel)));
        assert_eq!(lbl.box_at(16), None);
        assert_eq!(lbl.selectors(), vec![(8, sel)]);
    }

    #[test]
    fn data_label_is_not_a_node() {
        let lbl = Label::Data(Data::Int(1), DataId(0));
        assert!(lbl.is_data());
        assert!(!lbl.is_node());
        assert_eq!(lbl.as_data(), Some(&Data::Int(1)));
    }
}

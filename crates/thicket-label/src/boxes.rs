// crates/thicket-label/src/boxes.rs

//! `AbstractBox`: what can sit at a byte offset of a memory node.
//!
//! Mirrors `fa/abstractbox.hh`'s class hierarchy (`SelBox`/`TypeBox`/`Box`)
//! as one sealed enum, since Rust has no need for the virtual dispatch the
//! original used it for.

use serde::{Deserialize, Serialize};
use thicket_core::SelData;

/// Identifier of a named, folded box in the box database
/// ([`crate::database::BoxManager`]).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoxId(pub u32);

/// A type tag attached to a memory node, used only to keep distinct struct
/// types from unifying during minimization/inclusion when their shapes
/// otherwise coincide.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct TypeBox {
    pub name: String,
}

/// One item attached to a byte offset of a memory node's label.
///
/// `spec.md` §3's three box kinds, plus the plain-data case that falls out
/// of a node carrying no box at a given offset.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AbstractBox {
    /// A plain selector: an ordinary child-pointer slot.
    Selector(SelData),
    /// A type discriminator with no automaton-level behaviour of its own.
    Type(TypeBox),
    /// A reference to a named, folded box (a recurring sub-structure
    /// pattern, e.g. a singly-linked list segment).
    Box(BoxId),
    /// No box: the offset carries unstructured data only.
    Data,
}

impl AbstractBox {
    #[inline]
    #[must_use]
    pub fn as_selector(&self) -> Option<SelData> {
        match *self {
            AbstractBox::Selector(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_box_id(&self) -> Option<BoxId> {
        match *self {
            AbstractBox::Box(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_selector(&self) -> bool {
        matches!(self, AbstractBox::Selector(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selector_extraction() {
        let sel = SelData::new(0, 8, 0);
        let b = AbstractBox::Selector(sel);
        assert_eq!(b.as_selector(), Some(sel));
        assert_eq!(AbstractBox::Data.as_selector(), None);
    }
}

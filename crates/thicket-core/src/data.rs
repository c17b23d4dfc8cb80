// crates/thicket-core/src/data.rs

//! Leaf-level value types shared across the workspace.
//!
//! These mirror the `Data` variants of `spec.md` §3 ("Label") and the
//! selector metadata (`SelData`) used to describe memory-node layout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a component (tree automaton) within a forest automaton's root
/// vector. `0`-based.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RootIdx(pub u32);

impl RootIdx {
    /// Construct a new root index.
    #[inline]
    #[must_use]
    pub const fn new(i: u32) -> Self {
        Self(i)
    }

    /// The index as `usize`, for vector indexing.
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for RootIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

impl From<usize> for RootIdx {
    #[inline]
    fn from(i: usize) -> Self {
        Self(u32::try_from(i).unwrap_or(u32::MAX))
    }
}

/// Byte offset within a memory node (selector offset, displacement, etc).
pub type Offset = u32;

/// Selector descriptor: where a child pointer lies inside a memory node.
///
/// `(offset, size, displacement)` as named in `spec.md` §3.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct SelData {
    /// Byte offset of the selector within its owning node.
    pub offset: Offset,
    /// Size in bytes of the value stored at the selector.
    pub size: Offset,
    /// Displacement applied to a reference read through this selector
    /// (non-zero for interior/`displ` pointers).
    pub displacement: i32,
}

impl SelData {
    /// Construct a new selector descriptor.
    #[inline]
    #[must_use]
    pub const fn new(offset: Offset, size: Offset, displacement: i32) -> Self {
        Self {
            offset,
            size,
            displacement,
        }
    }
}

/// A leaf-level data value, as carried by a data-leaf transition in a tree
/// automaton (`spec.md` §3, "Data label").
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Data {
    /// A concrete (bounded) integer.
    Int(i64),
    /// A boolean.
    Bool(bool),
    /// The null pointer value.
    Null,
    /// An uninitialized / don't-care value.
    Undef,
    /// An opaque native pointer the analyzer does not interpret further.
    NativePtr(u64),
    /// A reference to another component of the enclosing forest automaton,
    /// read with displacement `displ` from the component's root.
    Ref {
        /// The referenced component.
        root: RootIdx,
        /// Displacement from the referenced component's entry.
        displ: i32,
    },
    /// A composite record of (offset, value) pairs, used for small
    /// structs embedded directly in a node's data leaf.
    Struct(Vec<(Offset, Box<Data>)>),
    /// A symbolic range used by the finite-height abstraction to collapse
    /// wide sets of concrete integers (e.g., the red/black sentinel color
    /// field of `sll-rb-sentinel`).
    CustomRange { lo: i64, hi: i64 },
}

impl Data {
    /// Whether this value is a reference to another forest-automaton root.
    #[inline]
    #[must_use]
    pub fn as_ref_target(&self) -> Option<(RootIdx, i32)> {
        match *self {
            Data::Ref { root, displ } => Some((root, displ)),
            _ => None,
        }
    }

    /// `true` for `Null`/`Undef`, the two "non-pointer, non-error" sentinels.
    #[inline]
    #[must_use]
    pub fn is_sentinel(&self) -> bool {
        matches!(self, Data::Null | Data::Undef)
    }
}

impl fmt::Display for Data {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Data::Int(n) => write!(f, "{n}"),
            Data::Bool(b) => write!(f, "{b}"),
            Data::Null => write!(f, "NULL"),
            Data::Undef => write!(f, "undef"),
            Data::NativePtr(p) => write!(f, "native:0x{p:x}"),
            Data::Ref { root, displ } => write!(f, "&{root}+{displ}"),
            Data::Struct(fields) => {
                write!(f, "{{")?;
                for (i, (off, v)) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{off}:{v}")?;
                }
                write!(f, "}}")
            }
            Data::CustomRange { lo, hi } => write!(f, "[{lo}..={hi}]"),
        }
    }
}

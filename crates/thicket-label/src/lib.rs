// crates/thicket-label/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Node labels and the "box" abstraction they carry.
//!
//! A transition's label is either a data leaf, a vector of data leaves, or a
//! *memory node*: a list of abstract boxes (selectors, folded sub-structure
//! references, or type tags) attached to byte offsets. This mirrors
//! `fa/label.hh`'s `NodeLabel`/`AbstractBox` split, kept as two Rust types
//! instead of one tagged union plus a `BoxLookup` side table.

pub mod arena;
pub mod boxes;
pub mod database;
pub mod label;

pub use arena::{LabelArena, LabelId};
pub use boxes::{AbstractBox, BoxId, TypeBox};
pub use database::BoxManager;
pub use label::{DataId, Label, NodeItem};

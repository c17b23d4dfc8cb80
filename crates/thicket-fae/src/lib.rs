// crates/thicket-fae/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Forest automata: an ordered tuple of tree automata components plus the
//! cross-component reference structure that ties them into one heap shape
//! (`spec.md` §4.2).

pub mod connection_graph;
pub mod fae;
pub mod garbage;
pub mod tarjan;

pub use connection_graph::{ConnectionGraph, CutpointSignature};
pub use fae::ForestAutomaton;
pub use garbage::garbage_check;

// crates/thicket-automata/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Bottom-up finite tree automata over [`thicket_label::Label`] alphabets.
//!
//! A tree automaton here is `(Q, F, Delta)`: a set of states, a subset of
//! final states, and a set of transitions `label(q1, .., qn) -> q`
//! (`spec.md` §4.1). States are opaque `u32` handles; the crate never
//! interprets them, which keeps every algorithm below — minimization,
//! inclusion, intersection, reduction, abstraction — a pure function of
//! `Delta` and `F`.

pub mod abstraction;
pub mod inclusion;
pub mod intersection;
pub mod minimize;
pub mod reduce;
pub mod state;
pub mod ta;
pub mod transition;
pub mod union;

pub use state::State;
pub use ta::TreeAut;
pub use transition::Transition;

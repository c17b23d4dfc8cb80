// crates/thicket-abstract/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Finite-height and predicate abstraction (`spec.md` §4.5;
//! `fa/abstraction.hh`).
//!
//! Both modes quotient a single root's tree automaton under an equivalence
//! that always refines cutpoint-signature equality and the data/non-data
//! distinction, and never merges across roots (each call operates on one
//! root's `TreeAut` at a time). `thicket-automata` supplies the mechanism
//! (`height_abstraction`, `collapsed`, `intersection_bu`); this crate
//! supplies the domain-specific equivalence keys.

pub mod config;
pub mod fa;
pub mod finite_height;
pub mod predicate;
pub mod refs;

pub use config::{AbstractionConfig, AbstractionMode};
pub use fa::abstract_fa;
pub use finite_height::finite_height_abstract;
pub use predicate::predicate_abstract;

// crates/thicket-fixpoint/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! The per-program-point fixpoint loop: reorder/normalize, fold, abstract,
//! and test for inclusion in an accumulator of every FA seen so far
//! (`spec.md` §4.6; `fa/fixpoint.hh`, `fa/ufae.hh`).

pub mod engine;
pub mod ufae;

pub use engine::{AbstractionChoice, FixpointConfig, FixpointEngine, FixpointOutcome};

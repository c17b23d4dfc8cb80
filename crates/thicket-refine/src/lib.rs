// crates/thicket-refine/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Backward symbolic run and spurious-trace refinement (`spec.md` §4.7;
//! `fa/backward_run.hh`).
//!
//! The executor hands a real trace to [`backward_run`]: walking it in
//! reverse, each step intersects the running backward FA against the
//! forward snapshot stored at that point, then reverts that step's
//! normalization ([`normalize_revert`]) and folding ([`fold_revert`]). If
//! every root's intersection stays non-empty all the way to the entry
//! state, the error is real; the first empty root marks the trace
//! spurious and yields a new predicate for the fixpoint engine's
//! predicate-abstraction mode.

pub mod backward;
pub mod fold_revert;
pub mod normalize_revert;
pub mod trace;

pub use backward::{backward_run, RefinementOutcome};
pub use trace::{BackwardStep, Trace};

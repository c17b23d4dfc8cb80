// crates/thicket-fold/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! Folding recurring sub-structures into named "boxes" and unfolding them
//! back out (`spec.md` §4.4; `fa/unfolding.hh`).

pub mod api;
pub mod discover;
pub mod io;
pub mod subauto;

pub use api::{fold_root, unfold_root, FoldLog, FoldRecord};
pub use discover::{learn1, learn2};

// crates/thicket-normalize/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

//! DFS canonicalization of forest automata (`spec.md` §4.3).

pub mod dfs;
pub mod log;
pub mod normalize;

pub use dfs::{DfsOrder, Event};
pub use log::{NormalizationLog, RootMerge};
pub use normalize::normalize;

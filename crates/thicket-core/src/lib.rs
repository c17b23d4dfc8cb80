// crates/thicket-core/src/lib.rs

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod context;
pub mod data;
pub mod diagnostics;
pub mod ir;

pub use context::SymCtx;
pub use data::{Data, Offset, RootIdx, SelData};
pub use diagnostics::AnalysisError;
pub use ir::{Instr, SourceLoc};

// crates/thicket-core/src/diagnostics.rs

//! Diagnostic taxonomy for the analyzer's external boundary.
//!
//! `spec.md` §7 splits failures into three kinds, which this module keeps
//! as distinct types rather than folding them into one enum:
//!
//! - [`ProgramError`] — a safety violation in the *analyzed* program. These
//!   are the outcomes a run is meant to report and are driven into
//!   witnesses.
//! - [`Refinement`] — an internal signal that causes the fixpoint engine to
//!   restart with more precision. Not a bug, not reported to the user.
//! - [`AnalysisError`] — a precondition violation in the analyzer itself.
//!   Surfaced through `Result`/`anyhow` plumbing and never silently ignored.

use thiserror::Error;

/// A safety violation found in the analyzed program (`spec.md` §6, "Error
/// kinds on the diagnostic boundary").
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    /// Dereference (load/store/`ptr_plus`) of a value that is not a valid
    /// reference into any live root.
    #[error("dereferenced value is not a valid reference")]
    InvalidDereference,
    /// A `free` targeted a block whose recorded size does not match the
    /// allocation it is freeing.
    #[error("allocated block size mismatch")]
    BlockSizeMismatch,
    /// A `free` targeted a pointer that points inside, rather than at the
    /// start of, an allocated block.
    #[error("releasing a pointer which points inside an allocated block")]
    InteriorFree,
    /// The garbage checker found a root unreachable from any program
    /// variable or cutpoint.
    #[error("garbage detected")]
    GarbageDetected,
    /// An `assert` instruction evaluated to false.
    #[error("assert failure")]
    AssertFailure,
}

/// An internal signal raised while refining an abstract trace
/// (`spec.md` §4.7). Not an error: the fixpoint engine catches this and
/// restarts with additional precision (a new predicate, or a disabled
/// abstraction step).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Refinement {
    /// The backward run found the trace is spurious; a new predicate was
    /// learned from the product computed along the way.
    SpuriousTrace {
        /// Index into the trace of the instruction at which the run
        /// first failed to intersect.
        failed_at: usize,
    },
    /// The backward run emptied out without ever finding a discriminating
    /// predicate; abstraction must be disabled for the offending loop
    /// head on retry.
    AbstractionTooCoarse,
}

/// A precondition violation inside the analyzer itself: an invariant the
/// algorithms above assume did not hold. These are analyzer bugs, not
/// findings about the analyzed program, and are never turned into a
/// witness.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// A program-level safety violation, propagated up to the CLI boundary.
    #[error(transparent)]
    Program(#[from] ProgramError),

    /// A tree automaton operation was asked to touch a state that holds no
    /// transitions (`spec.md` §4.1 invariant: every state reachable from a
    /// final state has at least one transition).
    #[error("state {0} has no transitions")]
    DanglingState(u32),

    /// Abstraction produced a tree automaton whose selector map disagrees
    /// with the forest automaton's connection graph.
    #[error("abstraction leads to inconsistent selector map")]
    InconsistentSelectorMap,

    /// A box (folded sub-structure) was referenced by name but is not
    /// present in the loaded box database.
    #[error("unknown box: {0}")]
    UnknownBox(String),

    /// The box-database file could not be parsed.
    #[error("malformed box database: {0}")]
    MalformedBoxDatabase(String),

    /// A symbolic-context lookup (variable or struct field) failed.
    #[error("unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Any other plumbing failure (I/O, serialization, …).
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// crates/thicket-exec/src/state.rs

//! One symbolic state in the executor's worklist: a program counter, the
//! forest automaton it carries, its call stack, and everything the
//! backward run needs if this path turns out to witness an error
//! (`spec.md` §3, "Symbolic state").

use crate::recycler::Recycler;
use thicket_core::ir::SourceLoc;
use thicket_core::{Data, RootIdx};
use thicket_fae::ForestAutomaton;
use thicket_refine::{BackwardStep, Trace};

/// Reserved variable slot the current stack frame's root is bound under;
/// distinct from any microcode register, which the front end numbers
/// starting at `0`.
pub const FRAME_PTR: u32 = u32::MAX;

/// One activation record on the call stack.
#[derive(Clone, Debug)]
pub struct CallFrame {
    pub return_pc: usize,
    pub dst: Option<u32>,
    pub saved_frame: Option<Data>,
    pub frame_root: RootIdx,
}

/// One path the executor is exploring.
#[derive(Clone, Debug)]
pub struct ExecState {
    pub pc: usize,
    pub fae: ForestAutomaton,
    pub call_stack: Vec<CallFrame>,
    pub recycler: Recycler,
    pub trace: Trace,
    /// The loop id of the most recent `fixpoint` marker this path passed
    /// through, consulted when a spurious trace's learned predicate needs
    /// a fixpoint location to feed back into.
    pub last_loop_head: Option<u32>,
    /// The source location of every instruction executed so far, in
    /// order — the raw material a witness renders into one `node`/`edge`
    /// pair per step (`spec.md` §6, "Trace output").
    pub path: Vec<SourceLoc>,
}

impl ExecState {
    #[must_use]
    pub fn new(entry_pc: usize, fae: ForestAutomaton) -> Self {
        Self {
            pc: entry_pc,
            fae,
            call_stack: Vec::new(),
            recycler: Recycler::new(),
            trace: Trace::new(),
            last_loop_head: None,
            path: Vec::new(),
        }
    }

    pub fn record_step(&mut self, step: BackwardStep) {
        self.trace.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_state_has_no_call_stack_or_trace() {
        let state = ExecState::new(0, ForestAutomaton::new());
        assert!(state.call_stack.is_empty());
        assert!(state.trace.is_empty());
        assert_eq!(state.last_loop_head, None);
        assert!(state.path.is_empty());
    }
}

// crates/thicket-refine/src/trace.rs

//! The linear instruction trace a backward run walks (`spec.md` §4.7).

use thicket_fae::ForestAutomaton;
use thicket_fold::FoldLog;
use thicket_normalize::NormalizationLog;

/// Everything the backward run needs to undo one forward step: the FA the
/// forward engine held *before* taking this step (what the backward FA is
/// intersected against on the way back), and the logs recording what
/// normalization and folding did to it along the way to the next stored
/// point.
#[derive(Clone, Debug)]
pub struct BackwardStep {
    pub fae_at_iteration: ForestAutomaton,
    pub normalization_log: NormalizationLog,
    pub fold_log: FoldLog,
}

impl BackwardStep {
    #[must_use]
    pub fn new(
        fae_at_iteration: ForestAutomaton,
        normalization_log: NormalizationLog,
        fold_log: FoldLog,
    ) -> Self {
        Self {
            fae_at_iteration,
            normalization_log,
            fold_log,
        }
    }
}

/// The instruction-by-instruction history from the entry state to an
/// error, in the order the forward executor actually took it. The
/// backward run walks `steps()` from the end.
#[derive(Clone, Debug, Default)]
pub struct Trace {
    steps: Vec<BackwardStep>,
}

impl Trace {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, step: BackwardStep) {
        self.steps.push(step);
    }

    #[must_use]
    pub fn steps(&self) -> &[BackwardStep] {
        &self.steps
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_fresh_trace_has_no_steps() {
        let trace = Trace::new();
        assert!(trace.is_empty());
        assert!(trace.steps().is_empty());
    }

    #[test]
    fn pushed_steps_preserve_order() {
        let mut trace = Trace::new();
        let step = BackwardStep::new(
            ForestAutomaton::new(),
            NormalizationLog::new(),
            FoldLog::new(),
        );
        trace.push(step.clone());
        trace.push(step);
        assert_eq!(trace.steps().len(), 2);
    }
}

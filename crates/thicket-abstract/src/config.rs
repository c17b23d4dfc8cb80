// crates/thicket-abstract/src/config.rs

//! Abstraction mode selection, threaded through from the fixpoint engine
//! (`spec.md` §4.6, step 4: "`abstract(F)` using finite-height or
//! predicate mode as configured").

use thicket_automata::TreeAut;

/// Parameters for finite-height abstraction.
#[derive(Clone, Copy, Debug)]
pub struct AbstractionConfig {
    /// States at or beyond this derivation height become eligible to
    /// merge with a same-signature sibling.
    pub height_bound: usize,
    /// When `false`, states are additionally kept apart by stack-frame
    /// identity (a caller-supplied `frame_of` function); when `true` that
    /// distinction is ignored.
    pub stack_frame_abstraction: bool,
}

impl Default for AbstractionConfig {
    fn default() -> Self {
        Self {
            height_bound: 1,
            stack_frame_abstraction: true,
        }
    }
}

impl AbstractionConfig {
    /// Applies `THICKET_HEIGHT_BOUND`/`THICKET_STACK_FRAME_ABSTRACTION`
    /// overrides on top of [`Default::default`], ignoring any variable
    /// that is unset or fails to parse.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("THICKET_HEIGHT_BOUND") {
            if let Ok(v) = v.parse::<usize>() {
                config.height_bound = v;
            }
        }
        if let Ok(v) = std::env::var("THICKET_STACK_FRAME_ABSTRACTION") {
            if let Ok(v) = v.parse::<bool>() {
                config.stack_frame_abstraction = v;
            }
        }
        config
    }
}

/// Which of the two abstraction strategies a fixpoint pass should apply.
pub enum AbstractionMode<'p> {
    FiniteHeight(AbstractionConfig),
    /// An empty predicate slice still refines by cutpoint signature and
    /// data/non-data distinction (`spec.md` §4.5: "Empty predicate set ⇒
    /// universal relation ... followed by the cutpoint refinement").
    Predicate(&'p [TreeAut]),
}

// crates/thicket-exec/src/executor.rs

//! The symbolic executor: a microcode interpreter over forest automata
//! driving a DFS worklist (`spec.md` §4.8, §5).
//!
//! Instruction handlers read and write `Vars` directly — a microcode
//! register and a forest-automaton variable are the same thing here, per
//! `spec.md` §3's "`Vars` is the value vector of live variables" — except
//! for the reserved [`FRAME_PTR`] slot a `call`/`ret` pair threads the
//! current stack frame's root through.

use crate::program::Program;
use crate::state::{CallFrame, ExecState, FRAME_PTR};
use std::collections::HashMap;
use thicket_automata::{reduce, TreeAut};
use thicket_core::context::VarLocation;
use thicket_core::diagnostics::ProgramError;
use thicket_core::ir::{BinOp, CmpOp, Instr, SourceLoc};
use thicket_core::{Data, Offset, RootIdx, SelData};
use thicket_fae::{garbage_check, ForestAutomaton};
use thicket_fixpoint::{AbstractionChoice, FixpointConfig, FixpointEngine, FixpointOutcome};
use thicket_label::{AbstractBox, BoxId, DataId, Label};
use thicket_refine::{backward_run, BackwardStep, RefinementOutcome};

/// Tunables the caller fixes for the whole run.
#[derive(Clone, Debug, Default)]
pub struct ExecConfig {
    /// Whether the garbage checker runs after every instruction (`spec.md`
    /// §4.8: "runs opportunistically when the static configuration
    /// demands").
    pub check_garbage_every_step: bool,
}

impl ExecConfig {
    /// Applies `THICKET_CHECK_GARBAGE_EVERY_STEP` on top of
    /// [`Default::default`], ignoring it if unset or unparsable.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(v) = std::env::var("THICKET_CHECK_GARBAGE_EVERY_STEP") {
            if let Ok(v) = v.parse::<bool>() {
                config.check_garbage_every_step = v;
            }
        }
        config
    }
}

/// What became of one completed path.
#[derive(Debug)]
pub enum PathOutcome {
    /// The path's last fixpoint visit closed, or it ran off the end of
    /// the program: nothing more to explore.
    Closed,
    /// A program error survived the backward run: a real memory-safety
    /// violation.
    RealError {
        error: ProgramError,
        loc: Option<SourceLoc>,
        pc: usize,
        /// The rendered GraphML witness for this path (`spec.md` §7: "it
        /// emits the witness").
        witness: String,
    },
}

/// Drives a [`Program`] over forest automata: the worklist, the
/// per-instruction handlers, and the wiring into the fixpoint engine and
/// the backward run.
pub struct SymbolicExecutor<'p> {
    program: &'p Program,
    box_db: HashMap<BoxId, TreeAut>,
    engine: FixpointEngine,
    loop_configs: HashMap<u32, FixpointConfig>,
    config: ExecConfig,
    worklist: Vec<ExecState>,
}

impl<'p> SymbolicExecutor<'p> {
    #[must_use]
    pub fn new(program: &'p Program, box_db: HashMap<BoxId, TreeAut>, config: ExecConfig) -> Self {
        Self {
            program,
            box_db,
            engine: FixpointEngine::new(),
            loop_configs: HashMap::new(),
            config,
            worklist: Vec::new(),
        }
    }

    #[must_use]
    pub fn tracked_loop_heads(&self) -> usize {
        self.engine.tracked_loop_heads()
    }

    /// Seeds the worklist with one initial state and runs to exhaustion,
    /// returning the outcome of every path that did not silently close.
    pub fn run(&mut self, entry_pc: usize, initial: ForestAutomaton) -> Vec<PathOutcome> {
        self.worklist.push(ExecState::new(entry_pc, initial));
        let mut outcomes = Vec::new();
        // `pop` off the back: the most recently pushed successor is
        // explored first, the DFS worklist order `spec.md` §5 requires.
        while let Some(state) = self.worklist.pop() {
            outcomes.extend(self.step(state));
        }
        outcomes
    }

    fn step(&mut self, mut state: ExecState) -> Vec<PathOutcome> {
        let Some(instr) = self.program.instr(state.pc).cloned() else {
            return vec![PathOutcome::Closed];
        };
        let loc = self.program.loc(state.pc);
        if let Some(loc) = loc {
            state.path.push(loc);
        }

        if self.config.check_garbage_every_step {
            if let Err(e) = garbage_check(&state.fae) {
                return self.handle_program_error(state, e, loc);
            }
        }

        match instr {
            Instr::Alloc { dst, size } => {
                self.exec_alloc(&mut state, dst, size);
                state.pc += 1;
                self.worklist.push(state);
            }
            Instr::Free { src } => match self.exec_free(&mut state, src) {
                Ok(()) => {
                    state.pc += 1;
                    self.worklist.push(state);
                }
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::Load { dst, src, offset } => match self.exec_load(&mut state, dst, src, offset) {
                Ok(()) => {
                    state.pc += 1;
                    self.worklist.push(state);
                }
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::Store { dst, offset, value } => match self.exec_store(&mut state, dst, offset, value) {
                Ok(()) => {
                    state.pc += 1;
                    self.worklist.push(state);
                }
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::PtrPlus { dst, src, offset } => match self.exec_ptr_plus(&mut state, dst, src, offset) {
                Ok(()) => {
                    state.pc += 1;
                    self.worklist.push(state);
                }
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::LoadImmediate { dst, value } => {
                state.fae.bind_var(dst, value);
                state.pc += 1;
                self.worklist.push(state);
            }
            Instr::BinOp { dst, op, lhs, rhs } => {
                exec_binop(&mut state, dst, op, lhs, rhs);
                state.pc += 1;
                self.worklist.push(state);
            }
            Instr::Cmp { dst, op, lhs, rhs } => {
                exec_cmp(&mut state, dst, op, lhs, rhs);
                state.pc += 1;
                self.worklist.push(state);
            }
            Instr::Br {
                cond,
                then_target,
                else_target,
            } => self.exec_br(state, cond, then_target, else_target),
            Instr::Jmp { target } => {
                state.pc = target as usize;
                self.worklist.push(state);
            }
            Instr::Call { dst, func, args } => match self.exec_call(&mut state, dst, func, &args) {
                Ok(()) => self.worklist.push(state),
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::Ret { value } => {
                exec_ret(&mut state, value);
                self.worklist.push(state);
            }
            Instr::Assert { cond } => match exec_assert(&state, cond) {
                Ok(()) => {
                    state.pc += 1;
                    self.worklist.push(state);
                }
                Err(e) => return self.handle_program_error(state, e, loc),
            },
            Instr::Fixpoint { loop_id } => return self.exec_fixpoint(state, loop_id),
            Instr::Plot { .. } => {
                state.pc += 1;
                self.worklist.push(state);
            }
        }
        Vec::new()
    }

    fn exec_alloc(&mut self, state: &mut ExecState, dst: u32, size: Offset) {
        let sel = SelData::new(0, size, 0);
        let leaf_label = state.fae.labels_mut().intern(Label::Data(Data::Undef, DataId(0)));
        let mut ta = TreeAut::new();
        let leaf = ta.fresh_state();
        ta.add_transition(vec![], leaf_label, leaf);
        let node_label = state
            .fae
            .labels_mut()
            .intern(Label::Node(vec![(0, AbstractBox::Selector(sel))]));
        let root_state = ta.fresh_state();
        ta.add_transition(vec![leaf], node_label, root_state);
        ta.add_final(root_state);

        let root = if let Some(reused) = state.recycler.reclaim() {
            state.fae.set_root(reused, ta);
            reused
        } else {
            state.fae.alloc_root(ta)
        };
        state.recycler.record_size(root, size);
        state.fae.bind_var(dst, Data::Ref { root, displ: 0 });
    }

    fn exec_free(&mut self, state: &mut ExecState, src: u32) -> Result<(), ProgramError> {
        let Some(Data::Ref { root, displ }) = state.fae.var(src).cloned() else {
            return Err(ProgramError::InvalidDereference);
        };
        if displ != 0 {
            return Err(ProgramError::InteriorFree);
        }
        if state.fae.root(root).is_none() {
            return Err(ProgramError::InvalidDereference);
        }
        state.fae.free_position(root);
        state.recycler.release(root);
        Ok(())
    }

    fn exec_load(&mut self, state: &mut ExecState, dst: u32, src: u32, offset: Offset) -> Result<(), ProgramError> {
        let (root, target_offset) = resolve_target(state, src, offset)?;
        let ta = state.fae.root(root).ok_or(ProgramError::InvalidDereference)?;
        let value = read_selector(ta, state.fae.labels(), target_offset).ok_or(ProgramError::InvalidDereference)?;
        state.fae.bind_var(dst, value);
        Ok(())
    }

    fn exec_store(&mut self, state: &mut ExecState, dst: u32, offset: Offset, value: u32) -> Result<(), ProgramError> {
        let (root, target_offset) = resolve_target(state, dst, offset)?;
        let new_value = state.fae.var(value).cloned().unwrap_or(Data::Undef);
        let ta = state.fae.root(root).ok_or(ProgramError::InvalidDereference)?.clone();
        let final_state = *ta.final_states().iter().next().ok_or(ProgramError::InvalidDereference)?;

        let mut accepting = None;
        for t in ta.transitions_with_rhs(final_state) {
            if let Label::Node(items) = state.fae.labels().get(t.label) {
                if let Some(idx) = items.iter().position(|(o, _)| *o == target_offset) {
                    accepting = Some((t.clone(), idx));
                    break;
                }
            }
        }
        let Some((accepting_t, child_index)) = accepting else {
            return Err(ProgramError::InvalidDereference);
        };

        let new_leaf_label = state.fae.labels_mut().intern(Label::Data(new_value, DataId(0)));
        let mut out = TreeAut::new();
        let new_leaf_state = out.fresh_state();
        out.add_transition(vec![], new_leaf_label, new_leaf_state);
        let mut new_lhs = accepting_t.lhs.clone();
        new_lhs[child_index] = new_leaf_state;
        out.add_transition(new_lhs, accepting_t.label, accepting_t.rhs);

        for t in ta.transitions() {
            if *t != accepting_t {
                out.add_transition(t.lhs.clone(), t.label, t.rhs);
            }
        }
        for f in ta.final_states() {
            out.add_final(*f);
        }
        let reduced = reduce::useless_and_unreachable_free(&out);
        state.fae.set_root(root, reduced);
        Ok(())
    }

    fn exec_ptr_plus(&mut self, state: &mut ExecState, dst: u32, src: u32, offset: i32) -> Result<(), ProgramError> {
        let Some(Data::Ref { root, displ }) = state.fae.var(src).cloned() else {
            return Err(ProgramError::InvalidDereference);
        };
        let new_displ = displ + offset;
        if let Some(size) = state.recycler.size_of(root) {
            if new_displ < 0 || new_displ as u32 >= size {
                return Err(ProgramError::BlockSizeMismatch);
            }
        }
        state.fae.bind_var(dst, Data::Ref { root, displ: new_displ });
        Ok(())
    }

    fn exec_br(&mut self, mut state: ExecState, cond: u32, then_target: u32, else_target: u32) {
        match state.fae.var(cond).cloned() {
            Some(Data::Bool(true)) => {
                state.pc = then_target as usize;
                self.worklist.push(state);
            }
            Some(Data::Bool(false)) => {
                state.pc = else_target as usize;
                self.worklist.push(state);
            }
            _ => {
                // The condition did not resolve concretely (abstracted
                // away, or never assigned): both branches are feasible,
                // explored in a fixed order (`spec.md` §5).
                let mut then_state = state.clone();
                then_state.fae.bind_var(cond, Data::Bool(true));
                then_state.pc = then_target as usize;
                let mut else_state = state;
                else_state.fae.bind_var(cond, Data::Bool(false));
                else_state.pc = else_target as usize;
                self.worklist.push(then_state);
                self.worklist.push(else_state);
            }
        }
    }

    fn exec_call(&mut self, state: &mut ExecState, dst: Option<u32>, func: u32, args: &[u32]) -> Result<(), ProgramError> {
        let Some(function) = self.program.function(func) else {
            return Err(ProgramError::InvalidDereference);
        };
        let frame_ta = build_frame_ta(&function.ctx, state.fae.labels_mut());
        let frame_root = state.fae.alloc_root(frame_ta);
        let saved_frame = state.fae.var(FRAME_PTR).cloned();

        for i in 0..function.ctx.arg_count().min(args.len()) {
            if let Some(VarLocation::Register(reg)) = function.ctx.var_location(i as u32) {
                let value = state.fae.var(args[i]).cloned().unwrap_or(Data::Undef);
                state.fae.bind_var(reg, value);
            }
        }

        state.call_stack.push(CallFrame {
            return_pc: state.pc + 1,
            dst,
            saved_frame,
            frame_root,
        });
        state.fae.bind_var(
            FRAME_PTR,
            Data::Ref {
                root: frame_root,
                displ: 0,
            },
        );
        state.pc = function.entry;
        Ok(())
    }

    fn exec_fixpoint(&mut self, mut state: ExecState, loop_id: u32) -> Vec<PathOutcome> {
        let before = state.fae.clone();
        let config = self
            .loop_configs
            .entry(loop_id)
            .or_insert_with(FixpointConfig::from_env)
            .clone();
        let box_entries: Vec<(BoxId, TreeAut)> = self.box_db.iter().map(|(k, v)| (*k, v.clone())).collect();

        // Every live activation record's root belongs to exactly that
        // frame; `frame_root.index()` is already unique per call, so it
        // doubles as the frame id finite-height abstraction merges on.
        let frame_of: HashMap<RootIdx, u32> = state
            .call_stack
            .iter()
            .map(|frame| (frame.frame_root, frame.frame_root.index() as u32))
            .collect();
        let frame_of = |root: RootIdx| frame_of.get(&root).copied();

        match self.engine.process(loop_id, state.fae.clone(), &box_entries, &config, &frame_of) {
            FixpointOutcome::Closed => vec![PathOutcome::Closed],
            FixpointOutcome::Continue {
                fae,
                fold_log,
                normalization_log,
            } => {
                state.record_step(BackwardStep::new(before, normalization_log, fold_log));
                state.fae = fae;
                state.last_loop_head = Some(loop_id);
                state.pc += 1;
                self.worklist.push(state);
                Vec::new()
            }
        }
    }

    /// Handles a program error raised by `state`: runs the backward run
    /// over whatever trace `state` accumulated, and either reports the
    /// error as real or converts it into a refinement signal and restarts
    /// (`spec.md` §7).
    fn handle_program_error(&mut self, state: ExecState, error: ProgramError, loc: Option<SourceLoc>) -> Vec<PathOutcome> {
        if state.trace.is_empty() {
            let witness = thicket_witness::render_locs(&state.path).unwrap_or_default();
            return vec![PathOutcome::RealError { error, loc, pc: state.pc, witness }];
        }
        let witness = thicket_witness::render_locs(&state.path).unwrap_or_default();
        match backward_run(&state.trace, &self.box_db) {
            RefinementOutcome::RealError => vec![PathOutcome::RealError { error, loc, pc: state.pc, witness }],
            RefinementOutcome::Spurious { learned_predicates, .. } => {
                if let Some(loop_id) = state.last_loop_head {
                    self.engine.clear(loop_id);
                    let entry = self.loop_configs.entry(loop_id).or_insert_with(FixpointConfig::from_env);
                    match &mut entry.abstraction {
                        AbstractionChoice::Predicate(ps) => ps.extend(learned_predicates),
                        other => *other = AbstractionChoice::Predicate(learned_predicates),
                    }
                }
                // Restart from the first recorded snapshot with the
                // enriched predicate set now in place for its loop head.
                if let Some(first) = state.trace.steps().first() {
                    self.worklist.push(ExecState::new(0, first.fae_at_iteration.clone()));
                }
                Vec::new()
            }
        }
    }
}

fn resolve_target(state: &ExecState, reg: u32, offset: Offset) -> Result<(RootIdx, Offset), ProgramError> {
    let Some(Data::Ref { root, displ }) = state.fae.var(reg).cloned() else {
        return Err(ProgramError::InvalidDereference);
    };
    let total = i64::from(displ) + i64::from(offset);
    if total < 0 {
        return Err(ProgramError::InvalidDereference);
    }
    Ok((root, total as u32))
}

fn exec_ret(state: &mut ExecState, value: Option<u32>) {
    let Some(frame) = state.call_stack.pop() else {
        state.pc = usize::MAX;
        return;
    };
    let returned = value.and_then(|r| state.fae.var(r).cloned()).unwrap_or(Data::Undef);
    if let Some(dst) = frame.dst {
        state.fae.bind_var(dst, returned);
    }
    state.fae.free_position(frame.frame_root);
    state.recycler.release(frame.frame_root);
    if let Some(saved) = frame.saved_frame {
        state.fae.bind_var(FRAME_PTR, saved);
    }
    state.pc = frame.return_pc;
}

fn exec_assert(state: &ExecState, cond: u32) -> Result<(), ProgramError> {
    match state.fae.var(cond) {
        Some(Data::Bool(false)) => Err(ProgramError::AssertFailure),
        _ => Ok(()),
    }
}

fn exec_binop(state: &mut ExecState, dst: u32, op: BinOp, lhs: u32, rhs: u32) {
    let value = match (state.fae.var(lhs).cloned(), state.fae.var(rhs).cloned()) {
        (Some(Data::Int(a)), Some(Data::Int(b))) => Data::Int(match op {
            BinOp::Add => a.wrapping_add(b),
            BinOp::Sub => a.wrapping_sub(b),
            BinOp::Mul => a.wrapping_mul(b),
            BinOp::And => a & b,
            BinOp::Or => a | b,
            BinOp::Xor => a ^ b,
        }),
        _ => Data::Undef,
    };
    state.fae.bind_var(dst, value);
}

fn exec_cmp(state: &mut ExecState, dst: u32, op: CmpOp, lhs: u32, rhs: u32) {
    let value = match (state.fae.var(lhs).cloned(), state.fae.var(rhs).cloned()) {
        (Some(Data::Int(a)), Some(Data::Int(b))) => Data::Bool(match op {
            CmpOp::Eq => a == b,
            CmpOp::Ne => a != b,
            CmpOp::Lt => a < b,
            CmpOp::Le => a <= b,
            CmpOp::Gt => a > b,
            CmpOp::Ge => a >= b,
        }),
        (Some(a), Some(b)) if matches!(op, CmpOp::Eq | CmpOp::Ne) => {
            let eq = a == b;
            Data::Bool(if op == CmpOp::Eq { eq } else { !eq })
        }
        _ => Data::Undef,
    };
    state.fae.bind_var(dst, value);
}

/// Builds the fresh component a `call` pushes: one selector per stack
/// slot in `ctx`'s frame layout, each initialized to `Undef`.
fn build_frame_ta(ctx: &thicket_core::SymCtx, arena: &mut thicket_label::LabelArena) -> TreeAut {
    let mut ta = TreeAut::new();
    let mut children = Vec::new();
    let mut items = Vec::new();
    for sel in ctx.stack_frame_layout() {
        let leaf_label = arena.intern(Label::Data(Data::Undef, DataId(0)));
        let leaf = ta.fresh_state();
        ta.add_transition(vec![], leaf_label, leaf);
        children.push(leaf);
        items.push((sel.offset, AbstractBox::Selector(*sel)));
    }
    let node_label = arena.intern(Label::Node(items));
    let root_state = ta.fresh_state();
    ta.add_transition(children, node_label, root_state);
    ta.add_final(root_state);
    ta
}

/// Reads the value at `offset` of `ta`'s accepting node, if any selector
/// sits there.
fn read_selector(ta: &TreeAut, arena: &thicket_label::LabelArena, offset: Offset) -> Option<Data> {
    let final_state = *ta.final_states().iter().next()?;
    for t in ta.transitions_with_rhs(final_state) {
        let Label::Node(items) = arena.get(t.label) else {
            continue;
        };
        let Some(child_index) = items.iter().position(|(o, _)| *o == offset) else {
            continue;
        };
        items[child_index].1.as_selector()?;
        let child = *t.lhs.get(child_index)?;
        for ct in ta.transitions_with_rhs(child) {
            if let Some(d) = arena.get(ct.label).as_data() {
                return Some(d.clone());
            }
        }
    }
    None
}

// crates/thicket-exec/src/program.rs

//! The microcode program a [`crate::executor::SymbolicExecutor`] runs: a
//! flat instruction stream, one [`SourceLoc`] per instruction for witness
//! emission, and a call table resolving a `FuncId` to its entry point and
//! stack-frame layout (`spec.md` §4.8, §6).

use serde::{Deserialize, Serialize};
use thicket_core::{Instr, SourceLoc, SymCtx};

/// A function entry in the program's call table.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Function {
    pub ctx: SymCtx,
    pub entry: usize,
}

impl Function {
    #[must_use]
    pub fn new(ctx: SymCtx, entry: usize) -> Self {
        Self { ctx, entry }
    }
}

/// A whole microcode program, addressed by `pc`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Program {
    instrs: Vec<Instr>,
    locs: Vec<SourceLoc>,
    functions: Vec<Function>,
}

impl Program {
    #[must_use]
    pub fn new(instrs: Vec<Instr>, locs: Vec<SourceLoc>, functions: Vec<Function>) -> Self {
        Self {
            instrs,
            locs,
            functions,
        }
    }

    #[must_use]
    pub fn instr(&self, pc: usize) -> Option<&Instr> {
        self.instrs.get(pc)
    }

    #[must_use]
    pub fn loc(&self, pc: usize) -> Option<SourceLoc> {
        self.locs.get(pc).copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.instrs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instrs.is_empty()
    }

    #[must_use]
    pub fn function(&self, id: u32) -> Option<&Function> {
        self.functions.get(id as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::ir::BinOp;

    #[test]
    fn out_of_range_pc_has_no_instruction() {
        let program = Program::new(vec![Instr::Jmp { target: 0 }], vec![SourceLoc::default()], vec![]);
        assert!(program.instr(1).is_none());
        assert!(program.instr(0).is_some());
    }

    #[test]
    fn unrelated_binop_instr_roundtrips() {
        let instr = Instr::BinOp {
            dst: 2,
            op: BinOp::Add,
            lhs: 0,
            rhs: 1,
        };
        let program = Program::new(vec![instr.clone()], vec![SourceLoc::default()], vec![]);
        assert_eq!(program.instr(0), Some(&instr));
    }
}

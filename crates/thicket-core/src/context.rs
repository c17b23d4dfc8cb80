// crates/thicket-core/src/context.rs

//! Per-function symbolic context: the register/stack layout the executor
//! needs to interpret a function's `alloc`/`load`/`store` instructions
//! against concrete selector offsets.
//!
//! Grounded on `fa/symctx.hh`'s `SymCtx` (stack frame layout + variable map);
//! kept as a supplemented feature because the executor cannot resolve a
//! variable name to a register/selector without it, even though `spec.md`
//! treats registers as already-resolved integers.

use crate::data::SelData;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Where a source-level variable lives at runtime.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum VarLocation {
    /// Held directly in an executor register.
    Register(u32),
    /// Spilled to the current stack frame at the given selector.
    Stack(SelData),
    /// A global, addressed through the program's global-variables block.
    Global(SelData),
}

/// Symbolic context of a single function: the mapping from source-level
/// variable identifiers to where they live, plus the function's stack
/// frame layout as a flat selector list (mirrors `SymCtx::StackFrameLayout`
/// in the original).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SymCtx {
    /// Function name, used only for diagnostics and witness output.
    name: String,
    /// Flat layout of the function's stack frame: one selector per local
    /// that did not fit in a register.
    stack_frame_layout: Vec<SelData>,
    /// Identifier -> location, for every variable visible in this context
    /// (locals and, for the distinguished global context, globals).
    var_map: HashMap<u32, VarLocation>,
    /// Number of leading parameters that are register-resident arguments.
    arg_count: usize,
}

impl SymCtx {
    /// An empty context for a function with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stack_frame_layout: Vec::new(),
            var_map: HashMap::new(),
            arg_count: 0,
        }
    }

    /// The distinguished global-variables context (no owning function).
    #[must_use]
    pub fn global() -> Self {
        Self::new("__global_vars_block")
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds a variable to a register slot.
    pub fn bind_register(&mut self, var_id: u32, reg: u32) {
        self.var_map.insert(var_id, VarLocation::Register(reg));
    }

    /// Binds a variable to a stack slot, appending it to the frame layout.
    pub fn bind_stack(&mut self, var_id: u32, sel: SelData) {
        self.stack_frame_layout.push(sel);
        self.var_map.insert(var_id, VarLocation::Stack(sel));
    }

    /// Binds a variable in the global block.
    pub fn bind_global(&mut self, var_id: u32, sel: SelData) {
        self.var_map.insert(var_id, VarLocation::Global(sel));
    }

    /// Marks the first `n` bound variables as register-resident arguments.
    pub fn set_arg_count(&mut self, n: usize) {
        self.arg_count = n;
    }

    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.arg_count
    }

    /// Looks up where a variable lives, if this context knows about it.
    #[must_use]
    pub fn var_location(&self, var_id: u32) -> Option<VarLocation> {
        self.var_map.get(&var_id).copied()
    }

    #[must_use]
    pub fn stack_frame_layout(&self) -> &[SelData] {
        &self.stack_frame_layout
    }

    /// Total stack frame size in bytes, the sum of every slot's size.
    #[must_use]
    pub fn stack_frame_size(&self) -> u32 {
        self.stack_frame_layout.iter().map(|s| s.size).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_binding_accumulates_frame_layout() {
        let mut ctx = SymCtx::new("f");
        ctx.bind_stack(1, SelData::new(0, 8, 0));
        ctx.bind_stack(2, SelData::new(8, 4, 0));
        assert_eq!(ctx.stack_frame_size(), 12);
        assert_eq!(
            ctx.var_location(2),
            Some(VarLocation::Stack(SelData::new(8, 4, 0)))
        );
    }

    #[test]
    fn register_binding_does_not_touch_frame_layout() {
        let mut ctx = SymCtx::new("f");
        ctx.bind_register(0, 3);
        assert!(ctx.stack_frame_layout().is_empty());
        assert_eq!(ctx.var_location(0), Some(VarLocation::Register(3)));
        assert_eq!(ctx.var_location(99), None);
    }
}

// crates/thicket-exec/src/recycler.rs

//! Bookkeeping the executor keeps alongside the forest automaton but
//! which is not itself part of the FA's representation: a free-list of
//! released root slots, and each live allocation's recorded byte size
//! (`spec.md` §3, "states are recycled via a free-list"; §6, "allocated
//! block size mismatch").

use std::collections::HashMap;
use thicket_core::{Offset, RootIdx};

/// Tracks which root indices `free` has released, so a later `alloc` can
/// reuse the slot instead of growing the root vector forever, and each
/// live allocation's recorded size, since a tree automaton alone carries
/// no notion of "how big was this block allocated as" once reduced to
/// selectors and leaves.
#[derive(Clone, Debug, Default)]
pub struct Recycler {
    free_list: Vec<RootIdx>,
    sizes: HashMap<RootIdx, Offset>,
}

impl Recycler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pops a previously-freed root slot, if one is available for reuse.
    pub fn reclaim(&mut self) -> Option<RootIdx> {
        self.free_list.pop()
    }

    /// Records `root` as freed, eligible for reuse by a later `alloc`.
    pub fn release(&mut self, root: RootIdx) {
        self.sizes.remove(&root);
        self.free_list.push(root);
    }

    pub fn record_size(&mut self, root: RootIdx, size: Offset) {
        self.sizes.insert(root, size);
    }

    #[must_use]
    pub fn size_of(&self, root: RootIdx) -> Option<Offset> {
        self.sizes.get(&root).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn released_roots_are_reclaimed_in_lifo_order() {
        let mut r = Recycler::new();
        r.release(RootIdx::new(0));
        r.release(RootIdx::new(1));
        assert_eq!(r.reclaim(), Some(RootIdx::new(1)));
        assert_eq!(r.reclaim(), Some(RootIdx::new(0)));
        assert_eq!(r.reclaim(), None);
    }

    #[test]
    fn freeing_drops_the_recorded_size() {
        let mut r = Recycler::new();
        r.record_size(RootIdx::new(0), 8);
        r.release(RootIdx::new(0));
        assert_eq!(r.size_of(RootIdx::new(0)), None);
    }
}

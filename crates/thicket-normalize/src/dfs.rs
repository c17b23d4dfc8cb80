// crates/thicket-normalize/src/dfs.rs

//! Explicit-stack DFS over the root-reference graph.
//!
//! Mirrors the pointerless `Iterator<Item = Event>` DFS used elsewhere in
//! this workspace for scheduling: a `Vec`-backed stack instead of
//! recursion, so a normalization walk over a deeply chained structure
//! cannot blow the native call stack.

use std::collections::HashSet;
use thicket_core::RootIdx;

/// One step of a depth-first walk over roots.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// First visit to `root`, before any of its successors.
    Enter(RootIdx),
    /// All of `root`'s successors have been visited.
    Exit(RootIdx),
}

struct Frame {
    root: RootIdx,
    children: std::vec::IntoIter<RootIdx>,
    entered: bool,
}

/// A DFS walk starting from `roots`, following `successors`. Each root is
/// entered and exited exactly once, even if several others reference it
/// (a second reference is still walked for ordering purposes by entering
/// the node each time it is pushed, but `visited` suppresses expanding its
/// children more than once — normalization only needs one canonical
/// visitation order, not a full multigraph traversal).
pub struct DfsOrder<'a> {
    stack: Vec<Frame>,
    visited: HashSet<RootIdx>,
    successors: Box<dyn Fn(RootIdx) -> Vec<RootIdx> + 'a>,
}

impl<'a> DfsOrder<'a> {
    #[must_use]
    pub fn new(roots: Vec<RootIdx>, successors: impl Fn(RootIdx) -> Vec<RootIdx> + 'a) -> Self {
        let mut stack = Vec::new();
        let successors = Box::new(successors);
        for &r in roots.iter().rev() {
            stack.push(Frame {
                root: r,
                children: successors(r).into_iter(),
                entered: false,
            });
        }
        Self {
            stack,
            visited: HashSet::new(),
            successors,
        }
    }
}

impl Iterator for DfsOrder<'_> {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        loop {
            let top = self.stack.last_mut()?;
            if !top.entered {
                top.entered = true;
                let root = top.root;
                self.visited.insert(root);
                return Some(Event::Enter(root));
            }
            match top.children.next() {
                Some(child) => {
                    if self.visited.contains(&child) {
                        continue;
                    }
                    let children = (self.successors)(child).into_iter();
                    self.stack.push(Frame {
                        root: child,
                        children,
                        entered: false,
                    });
                }
                None => {
                    let frame = self.stack.pop().expect("frame just inspected");
                    return Some(Event::Exit(frame.root));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visits_each_root_once_even_with_a_shared_successor() {
        let successors = |r: RootIdx| -> Vec<RootIdx> {
            match r.index() {
                0 => vec![RootIdx::new(1), RootIdx::new(2)],
                1 => vec![RootIdx::new(2)],
                _ => vec![],
            }
        };
        let events: Vec<_> = DfsOrder::new(vec![RootIdx::new(0)], successors).collect();
        let enters: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                Event::Enter(r) => Some(*r),
                Event::Exit(_) => None,
            })
            .collect();
        assert_eq!(enters.len(), 3);
        assert!(enters.contains(&RootIdx::new(2)));
    }

    #[test]
    fn every_enter_has_a_matching_exit() {
        let successors = |_: RootIdx| -> Vec<RootIdx> { vec![] };
        let events: Vec<_> = DfsOrder::new(vec![RootIdx::new(0)], successors).collect();
        assert_eq!(events, vec![Event::Enter(RootIdx::new(0)), Event::Exit(RootIdx::new(0))]);
    }
}

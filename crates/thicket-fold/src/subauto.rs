// crates/thicket-fold/src/subauto.rs

//! Extracting and splicing sub-automata rooted at a single state.

use std::collections::HashSet;
use thicket_automata::{State, TreeAut};

/// The sub-automaton of `ta` reachable downward from `root`: every
/// transition whose `rhs` is `root` or a descendant of it, with `root` as
/// the sole final state. This is "the shape below `root`", the unit both
/// folding (does it match a box's language?) and unfolding (splice this
/// back in) operate on.
#[must_use]
pub fn subautomaton_at(ta: &TreeAut, root: State) -> TreeAut {
    let mut visited: HashSet<State> = HashSet::new();
    let mut frontier = vec![root];
    let mut out = TreeAut::new();
    while let Some(q) = frontier.pop() {
        if !visited.insert(q) {
            continue;
        }
        for t in ta.transitions_with_rhs(q) {
            out.add_transition(t.lhs.clone(), t.label, t.rhs);
            for &child in &t.lhs {
                frontier.push(child);
            }
        }
    }
    out.register_state(root);
    out.add_final(root);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_label::{DataId, Label, LabelArena};

    #[test]
    fn extracts_only_the_reachable_slice() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(thicket_core::Data::Null, DataId(0)));
        let node = arena.intern(Label::Node(vec![]));

        let mut ta = TreeAut::new();
        let l0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, l0);
        let n0 = ta.fresh_state();
        ta.add_transition(vec![l0], node, n0);
        let stray = ta.fresh_state();
        ta.add_transition(vec![], leaf, stray);

        let sub = subautomaton_at(&ta, n0);
        assert_eq!(sub.transitions().len(), 2);
        assert!(sub.is_final(n0));
    }
}

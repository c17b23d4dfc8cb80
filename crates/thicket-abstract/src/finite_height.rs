// crates/thicket-abstract/src/finite_height.rs

//! Finite-height abstraction: collapse states deeper than a height bound
//! that agree on cutpoint signature, data/non-data kind, and (unless
//! disabled) stack frame (`spec.md` §4.5, "Finite-height").

use crate::refs::{data_leaf_states, per_state_refs};
use std::collections::BTreeSet;
use thicket_automata::{abstraction, State, TreeAut};
use thicket_core::RootIdx;
use thicket_label::{LabelArena, LabelId};

#[derive(Clone, PartialEq, Eq, Hash)]
enum Key {
    /// A data leaf: never merges with anything but an identical state.
    Data(State),
    /// `tags` is the set of labels of every transition producing this
    /// state: two states only ever merge when they agree on node tag, not
    /// just cutpoint signature and frame (`spec.md`:102, "considers node
    /// tag equality").
    Shape(BTreeSet<RootIdx>, Option<u32>, BTreeSet<LabelId>),
}

/// Applies finite-height abstraction to `ta`. `frame_of` maps a state to
/// the stack-frame identity of the root it belongs to; pass `|_| None`
/// when frame provenance is not tracked at this granularity (this crate
/// does not itself model per-state frame assignment — that information,
/// when available, comes from the executor that built `ta`).
#[must_use]
pub fn finite_height_abstract(
    ta: &TreeAut,
    arena: &LabelArena,
    config: crate::config::AbstractionConfig,
    frame_of: impl Fn(State) -> Option<u32>,
) -> TreeAut {
    let refs = per_state_refs(ta, arena);
    let data_states = data_leaf_states(ta, arena);

    let key = |s: State| -> Key {
        if data_states.contains(&s) {
            return Key::Data(s);
        }
        let frame = if config.stack_frame_abstraction {
            None
        } else {
            frame_of(s)
        };
        Key::Shape(refs.get(&s).cloned().unwrap_or_default(), frame, ta.labels_at(s))
    };

    let abstracted = abstraction::height_abstraction(ta, config.height_bound, key);
    thicket_automata::reduce::useless_and_unreachable_free(&abstracted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::Data;
    use thicket_label::{DataId, Label};

    #[test]
    fn collapses_two_deep_states_with_equal_signature() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(Data::Null, DataId(0)));
        let node = arena.intern(Label::Node(vec![]));

        let mut ta = TreeAut::new();
        let l0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, l0);
        let n1 = ta.fresh_state();
        ta.add_transition(vec![l0], node, n1);
        let n2 = ta.fresh_state();
        ta.add_transition(vec![l0], node, n2);
        ta.add_final(n1);
        ta.add_final(n2);

        let config = crate::config::AbstractionConfig { height_bound: 1, stack_frame_abstraction: true };
        let abstracted = finite_height_abstract(&ta, &arena, config, |_| None);
        assert_eq!(abstracted.final_states().len(), 1);
    }

    #[test]
    fn never_merges_two_distinct_data_leaves() {
        let mut arena = LabelArena::new();
        let leaf_a = arena.intern(Label::Data(Data::Int(1), DataId(0)));
        let leaf_b = arena.intern(Label::Data(Data::Int(2), DataId(1)));
        let mut ta = TreeAut::new();
        let a = ta.fresh_state();
        ta.add_transition(vec![], leaf_a, a);
        let b = ta.fresh_state();
        ta.add_transition(vec![], leaf_b, b);
        ta.add_final(a);
        ta.add_final(b);

        let config = crate::config::AbstractionConfig { height_bound: 0, stack_frame_abstraction: true };
        let abstracted = finite_height_abstract(&ta, &arena, config, |_| None);
        assert_eq!(abstracted.final_states().len(), 2);
    }

    #[test]
    fn distinct_node_tags_at_equal_height_and_refs_never_merge() {
        let mut arena = LabelArena::new();
        let leaf = arena.intern(Label::Data(Data::Null, DataId(0)));
        let node_a = arena.intern(Label::Node(vec![]));
        let node_b = arena.intern(Label::Node(vec![(
            8,
            thicket_label::AbstractBox::Selector(thicket_core::SelData::new(8, 8, 0)),
        )]));

        let mut ta = TreeAut::new();
        let l0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, l0);
        let n1 = ta.fresh_state();
        ta.add_transition(vec![l0], node_a, n1);
        let n2 = ta.fresh_state();
        ta.add_transition(vec![l0], node_b, n2);
        ta.add_final(n1);
        ta.add_final(n2);

        let config = crate::config::AbstractionConfig { height_bound: 1, stack_frame_abstraction: true };
        let abstracted = finite_height_abstract(&ta, &arena, config, |_| None);
        assert_eq!(abstracted.final_states().len(), 2);
    }
}

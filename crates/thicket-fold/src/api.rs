// crates/thicket-fold/src/api.rs

//! Folding a recurring sub-structure into a named box, and unfolding it
//! back out, within one root's tree automaton.
//!
//! A memory node's label lists `(offset, AbstractBox)` pairs; the
//! `Selector`/`Box` entries among them line up, in list order, with the
//! transition's `lhs` children. Folding a child state `c` referenced at
//! offset `o` means: check whether the shape below `c` matches a box's
//! language, and if so, drop `c` from `lhs` and relabel offset `o` from
//! `Selector` to `Box(id)` — the box stands for the whole subtree without
//! naming a child state at all.

use crate::subauto::subautomaton_at;
use thicket_automata::{inclusion, reduce, State, TreeAut};
use thicket_core::{Offset, SelData};
use thicket_label::{AbstractBox, BoxId, Label, LabelArena};

/// One successful fold or unfold, recorded so the refinement phase can
/// undo it while reverting an abstract trace (`spec.md` §4.7). Carries the
/// full `SelData` (not just the byte offset) since unfolding needs the
/// size/displacement the box's selector originally had to reconstruct it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldRecord {
    Folded {
        parent: State,
        selector: SelData,
        box_id: BoxId,
        child: State,
    },
    Unfolded {
        parent: State,
        selector: SelData,
        box_id: BoxId,
        new_child: State,
    },
}

/// The sequence of fold/unfold steps applied across a whole forest
/// automaton's roots, oldest first. Each entry is tagged with the root it
/// was applied to, since a [`FoldRecord`]'s `State`s are only meaningful
/// within the `TreeAut` of that one root.
#[derive(Clone, Debug, Default)]
pub struct FoldLog {
    records: Vec<(thicket_core::RootIdx, FoldRecord)>,
}

impl FoldLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, root: thicket_core::RootIdx, record: FoldRecord) {
        self.records.push((root, record));
    }

    #[must_use]
    pub fn records(&self) -> &[(thicket_core::RootIdx, FoldRecord)] {
        &self.records
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn pointer_positions(items: &[(Offset, AbstractBox)]) -> Vec<usize> {
    items
        .iter()
        .enumerate()
        .filter(|(_, (_, b))| b.is_selector() || b.as_box_id().is_some())
        .map(|(i, _)| i)
        .collect()
}

/// Attempts to fold one occurrence of `box_ta`'s language somewhere in
/// `root`. Returns the updated automaton and the record of what changed,
/// or `None` if no matching sub-structure was found.
#[must_use]
pub fn fold_root(
    ta: &TreeAut,
    arena: &mut LabelArena,
    box_id: BoxId,
    box_ta: &TreeAut,
) -> Option<(TreeAut, FoldRecord)> {
    let candidate_state = ta.states().iter().copied().find(|&s| {
        let sub = subautomaton_at(ta, s);
        inclusion::subseteq(&sub, box_ta) && inclusion::subseteq(box_ta, &sub)
    })?;

    for t in ta.transitions().to_vec() {
        let Label::Node(items) = arena.get(t.label).clone() else {
            continue;
        };
        let positions = pointer_positions(&items);
        for (child_idx, &item_pos) in positions.iter().enumerate() {
            if t.lhs.get(child_idx) != Some(&candidate_state) {
                continue;
            }
            let Some(selector) = items[item_pos].1.as_selector() else {
                continue;
            };
            let mut new_items = items.clone();
            new_items[item_pos].1 = AbstractBox::Box(box_id);
            let new_label = arena.intern(Label::Node(new_items));
            let mut new_lhs = t.lhs.clone();
            new_lhs.remove(child_idx);

            let mut out = TreeAut::new();
            for other in ta.transitions() {
                if *other == t {
                    out.add_transition(new_lhs.clone(), new_label, other.rhs);
                } else {
                    out.add_transition(other.lhs.clone(), other.label, other.rhs);
                }
            }
            for f in ta.final_states() {
                out.add_final(*f);
            }
            let reduced = reduce::useless_and_unreachable_free(&out);
            let record = FoldRecord::Folded {
                parent: t.rhs,
                selector,
                box_id,
                child: candidate_state,
            };
            return Some((reduced, record));
        }
    }
    None
}

/// Splices `box_ta` back in at a previously folded position: relabels
/// `offset` from `Box(id)` back to `Selector`, and re-adds `box_ta`'s
/// states (disjoint-unioned in) as the child, identified with `box_ta`'s
/// final states.
///
/// A box may declare more than one final state — its language is the
/// union of what each one accepts — so the new child is a single fresh
/// state (`new_child`, one past the shifted box's state range) that every
/// one of the box's accepting runs feeds into, rather than an arbitrary
/// choice of one final state. This mirrors the multi-final handling
/// `thicket-refine::normalize_revert::cut_below` already does for the
/// equivalent problem in reverse.
#[must_use]
pub fn unfold_root(
    ta: &TreeAut,
    arena: &mut LabelArena,
    box_id: BoxId,
    box_ta: &TreeAut,
    selector: thicket_core::SelData,
) -> (TreeAut, Option<FoldRecord>) {
    let shift = ta.high_water_mark();
    let box_shifted = box_ta.rename(|s| State(s.0 + shift));
    let new_child = State(shift + box_ta.high_water_mark());

    let mut out = TreeAut::new();
    let mut record = None;
    for t in ta.transitions() {
        let Label::Node(items) = arena.get(t.label).clone() else {
            out.add_transition(t.lhs.clone(), t.label, t.rhs);
            continue;
        };
        let target_pos = items.iter().position(|(_, b)| b.as_box_id() == Some(box_id));
        match target_pos {
            None => out.add_transition(t.lhs.clone(), t.label, t.rhs),
            Some(pos) => {
                let positions = pointer_positions(&items);
                let insert_at = positions.iter().position(|&p| p == pos).unwrap_or(t.lhs.len());
                let mut new_items = items.clone();
                new_items[pos].1 = AbstractBox::Selector(selector);
                let new_label = arena.intern(Label::Node(new_items));

                let mut new_lhs = t.lhs.clone();
                new_lhs.insert(insert_at.min(new_lhs.len()), new_child);
                out.add_transition(new_lhs, new_label, t.rhs);
                record = Some(FoldRecord::Unfolded {
                    parent: t.rhs,
                    selector,
                    box_id,
                    new_child,
                });
            }
        }
    }
    for f in ta.final_states() {
        out.add_final(*f);
    }
    for t in box_shifted.transitions() {
        out.add_transition(t.lhs.clone(), t.label, t.rhs);
    }
    for f in box_shifted.final_states() {
        for t in box_shifted.transitions_with_rhs(*f) {
            out.add_transition(t.lhs.clone(), t.label, new_child);
        }
    }
    (out, record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_core::SelData;
    use thicket_label::DataId;

    fn null_leaf(arena: &mut LabelArena) -> thicket_label::LabelId {
        arena.intern(Label::Data(thicket_core::Data::Null, DataId(0)))
    }

    #[test]
    fn fold_then_unfold_round_trips_the_label() {
        let mut arena = LabelArena::new();
        let leaf = null_leaf(&mut arena);
        let sel = SelData::new(0, 8, 0);
        let node = arena.intern(Label::Node(vec![(0, AbstractBox::Selector(sel))]));

        let mut child = TreeAut::new();
        let cq = child.fresh_state();
        child.add_transition(vec![], leaf, cq);
        child.add_final(cq);

        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        let n0 = ta.fresh_state();
        ta.add_transition(vec![q0], node, n0);
        ta.add_final(n0);

        let box_id = BoxId(0);
        let (folded, record) = fold_root(&ta, &mut arena, box_id, &child).expect("fold should match");
        assert!(matches!(record, FoldRecord::Folded { .. }));

        let (unfolded, unfold_record) = unfold_root(&folded, &mut arena, box_id, &child, sel);
        assert!(unfold_record.is_some());
        assert!(!unfolded.final_states().is_empty());
    }

    #[test]
    fn unfold_keeps_every_final_state_of_a_multi_final_box() {
        let mut arena = LabelArena::new();
        let leaf_x = arena.intern(Label::Data(thicket_core::Data::Int(1), DataId(0)));
        let leaf_y = arena.intern(Label::Data(thicket_core::Data::Int(2), DataId(0)));
        let sel = SelData::new(0, 8, 0);
        let node = arena.intern(Label::Node(vec![(0, AbstractBox::Selector(sel))]));

        // A box whose language is {leaf_x, leaf_y}, via two distinct final
        // states rather than one state with two incoming transitions.
        let mut child = TreeAut::new();
        let cx = child.fresh_state();
        child.add_transition(vec![], leaf_x, cx);
        child.add_final(cx);
        let cy = child.fresh_state();
        child.add_transition(vec![], leaf_y, cy);
        child.add_final(cy);

        // `q0`'s language must equal the box's ({leaf_x, leaf_y}) for
        // `fold_root`'s mutual-inclusion check to match it at all.
        let mut ta = TreeAut::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf_x, q0);
        ta.add_transition(vec![], leaf_y, q0);
        let n0 = ta.fresh_state();
        ta.add_transition(vec![q0], node, n0);
        ta.add_final(n0);

        let box_id = BoxId(0);
        let (folded, _) = fold_root(&ta, &mut arena, box_id, &child).expect("fold should match");

        let (unfolded, unfold_record) = unfold_root(&folded, &mut arena, box_id, &child, sel);
        let Some(FoldRecord::Unfolded { new_child, .. }) = unfold_record else {
            panic!("expected an Unfolded record");
        };

        // Both of the box's accepting runs must feed the spliced-in child,
        // not just whichever final state happened to be picked first.
        let labels_at_child: std::collections::HashSet<_> = unfolded
            .transitions_with_rhs(new_child)
            .map(|t| t.label)
            .collect();
        assert!(labels_at_child.contains(&leaf_x));
        assert!(labels_at_child.contains(&leaf_y));
    }
}

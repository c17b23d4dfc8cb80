// crates/thicket-fixpoint/src/ufae.rs

//! The UFAE wrapper: encodes a whole [`ForestAutomaton`] as a single flat
//! `TreeAut` so the accumulator at a program point can hold the union of
//! every FA observed there (`spec.md` §4.6).
//!
//! One synthetic transition is added whose children are, per root in
//! order, a representative final state of that root's component (or a
//! fresh `Undef` leaf for a freed/`None` root), labelled by the live
//! variable vector. Every FA processed at the same program point is
//! re-interned through one shared [`LabelArena`] so their encodings live
//! in a comparable label space and `union_disjoint`/`subseteq` see the
//! same labels as equal.

use std::collections::BTreeSet;
use thicket_automata::{State, TreeAut};
use thicket_core::{Data, RootIdx};
use thicket_fae::ForestAutomaton;
use thicket_label::{DataId, Label, LabelArena};

/// Flattens `fae` into one `TreeAut`, re-interning its labels through
/// `global` and recording `live_vars` (sorted, deduplicated) as the
/// synthetic transition's label.
#[must_use]
pub fn encode(fae: &ForestAutomaton, global: &mut LabelArena, live_vars: &BTreeSet<u32>) -> TreeAut {
    let mut out = TreeAut::new();
    let mut final_reps: Vec<State> = Vec::new();

    for idx in 0..fae.root_count() {
        let root = RootIdx::from(idx);
        match fae.root(root) {
            None => {
                let undef = global.intern(Label::Data(Data::Undef, DataId(0)));
                let q = out.fresh_state();
                out.add_transition(vec![], undef, q);
                final_reps.push(q);
            }
            Some(ta) => {
                let shift = out.high_water_mark();
                for t in ta.transitions() {
                    let new_label = global.intern(fae.labels().get(t.label).clone());
                    let lhs: Vec<State> = t.lhs.iter().map(|s| State(s.0 + shift)).collect();
                    out.add_transition(lhs, new_label, State(t.rhs.0 + shift));
                }
                match ta.final_states().iter().next() {
                    Some(&f) => final_reps.push(State(f.0 + shift)),
                    None => {
                        let undef = global.intern(Label::Data(Data::Undef, DataId(0)));
                        let q = out.fresh_state();
                        out.add_transition(vec![], undef, q);
                        final_reps.push(q);
                    }
                }
            }
        }
    }

    let live_label = global.intern(Label::VData(
        live_vars.iter().map(|&v| Data::Int(i64::from(v))).collect(),
    ));
    let synth = out.fresh_state();
    out.add_transition(final_reps, live_label, synth);
    out.add_final(synth);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use thicket_automata::TreeAut as Ta;

    #[test]
    fn encodes_one_transition_per_root_plus_the_synthetic_one() {
        let mut fae = ForestAutomaton::new();
        let leaf = fae.labels_mut().intern(Label::Data(Data::Null, DataId(1)));
        let mut ta = Ta::new();
        let q0 = ta.fresh_state();
        ta.add_transition(vec![], leaf, q0);
        ta.add_final(q0);
        fae.alloc_root(ta);

        let mut global = LabelArena::new();
        let live = BTreeSet::new();
        let encoded = encode(&fae, &mut global, &live);
        assert_eq!(encoded.final_states().len(), 1);
        assert_eq!(encoded.transitions().len(), 2);
    }

    #[test]
    fn a_none_root_still_contributes_a_child_slot() {
        let mut fae = ForestAutomaton::new();
        fae.set_root(thicket_core::RootIdx::new(0), Ta::new());
        fae.free_slot_only(thicket_core::RootIdx::new(0));
        let mut global = LabelArena::new();
        let live = BTreeSet::new();
        let encoded = encode(&fae, &mut global, &live);
        assert_eq!(encoded.final_states().len(), 1);
    }
}

// crates/thicket-automata/src/abstraction.rs

//! Finite-height abstraction (`spec.md` §4.5; `fa/abstraction.hh`).
//!
//! Collapses every state deeper than a fixed height bound into one
//! representative per equivalence class, where the equivalence is supplied
//! by the caller (`thicket-abstract`, keyed on cutpoint signatures from the
//! connection graph — this crate has no notion of cutpoints of its own).
//! States shallower than the bound are left untouched, since collapsing
//! them buys no generalization and would only lose precision for free.

use crate::state::State;
use crate::ta::TreeAut;
use std::collections::HashMap;
use std::hash::Hash;

/// The minimum derivation height of every state: `0` for a state produced
/// only by leaf transitions, otherwise `1 + max(height(children))` over the
/// shallowest producing transition.
#[must_use]
pub fn heights(ta: &TreeAut) -> HashMap<State, usize> {
    let mut height: HashMap<State, usize> = HashMap::new();
    loop {
        let mut changed = false;
        for t in ta.transitions() {
            let Some(child_height) = t
                .lhs
                .iter()
                .map(|q| height.get(q).copied())
                .collect::<Option<Vec<_>>>()
            else {
                continue;
            };
            let candidate = child_height.into_iter().max().map_or(0, |m| m + 1);
            match height.get(&t.rhs) {
                Some(&h) if h <= candidate => {}
                _ => {
                    height.insert(t.rhs, candidate);
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }
    height
}

/// Collapses every state at height `>= bound` with an equal `signature`
/// into one representative. `signature` typically keys on cutpoint
/// reachability so states that abstract differently never merge.
#[must_use]
pub fn height_abstraction<K: Eq + Hash>(
    ta: &TreeAut,
    bound: usize,
    signature: impl Fn(State) -> K,
) -> TreeAut {
    let heights = heights(ta);
    let mut groups: HashMap<K, Vec<State>> = HashMap::new();
    let mut classes: Vec<Vec<State>> = Vec::new();

    for &s in ta.states() {
        let h = heights.get(&s).copied().unwrap_or(0);
        if h >= bound {
            groups.entry(signature(s)).or_default().push(s);
        } else {
            classes.push(vec![s]);
        }
    }
    classes.extend(groups.into_values());
    ta.collapsed(&classes)
}

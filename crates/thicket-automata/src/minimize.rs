// crates/thicket-automata/src/minimize.rs

//! Minimization by merging states related by downward simulation
//! (`spec.md` §4.1, "minimized"; `fa/treeaut.hh`'s simulation-based
//! reduction).
//!
//! `p` downward-simulates `q` when every transition producing `p` has a
//! same-label, same-arity counterpart producing `q` whose children are
//! pairwise simulated in turn. Two states that simulate each other in both
//! directions and agree on finality — the `cons` compatibility predicate —
//! can be merged without changing the language: whatever run could end at
//! one could equally end at the other.

use crate::state::State;
use crate::ta::TreeAut;
use std::collections::{HashMap, HashSet};

type Pair = (State, State);

fn downward_simulation(ta: &TreeAut) -> HashSet<Pair> {
    let states: Vec<State> = ta.states().iter().copied().collect();

    let mut by_label_rhs: HashMap<_, Vec<&crate::transition::Transition>> = HashMap::new();
    for t in ta.transitions() {
        by_label_rhs.entry((t.label, t.arity())).or_default().push(t);
    }

    let mut sim: HashSet<Pair> = states
        .iter()
        .flat_map(|&p| states.iter().map(move |&q| (p, q)))
        .collect();

    let transitions_into = |q: State| ta.transitions_with_rhs(q);

    loop {
        let mut next = sim.clone();
        for &(p, q) in &sim {
            let mut still_holds = true;
            for tp in transitions_into(p) {
                let has_match = ta
                    .transitions_with_rhs(q)
                    .filter(|tq| tq.label == tp.label && tq.arity() == tp.arity())
                    .any(|tq| {
                        tp.lhs
                            .iter()
                            .zip(tq.lhs.iter())
                            .all(|(&cp, &cq)| sim.contains(&(cp, cq)))
                    });
                if !has_match {
                    still_holds = false;
                    break;
                }
            }
            if !still_holds {
                next.remove(&(p, q));
            }
        }
        if next.len() == sim.len() {
            break;
        }
        sim = next;
    }
    sim
}

/// Union-find over states, used to materialize equivalence classes from
/// the mutual-simulation relation.
struct UnionFind {
    parent: HashMap<State, State>,
}

impl UnionFind {
    fn new(states: impl Iterator<Item = State>) -> Self {
        Self {
            parent: states.map(|s| (s, s)).collect(),
        }
    }

    fn find(&mut self, s: State) -> State {
        let p = self.parent[&s];
        if p == s {
            return s;
        }
        let root = self.find(p);
        self.parent.insert(s, root);
        root
    }

    fn union(&mut self, a: State, b: State) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            self.parent.insert(ra, rb);
        }
    }
}

/// Merges every pair of states that mutually downward-simulate each other
/// and agree on finality.
#[must_use]
pub fn minimized(ta: &TreeAut) -> TreeAut {
    let sim = downward_simulation(ta);
    let mut uf = UnionFind::new(ta.states().iter().copied());

    for &(p, q) in &sim {
        if p == q {
            continue;
        }
        if ta.is_final(p) != ta.is_final(q) {
            continue;
        }
        if sim.contains(&(q, p)) {
            uf.union(p, q);
        }
    }

    let mut classes: HashMap<State, Vec<State>> = HashMap::new();
    for &s in ta.states() {
        let root = uf.find(s);
        classes.entry(root).or_default().push(s);
    }
    let classes: Vec<Vec<State>> = classes.into_values().collect();
    crate::reduce::useless_and_unreachable_free(&ta.collapsed(&classes))
}

// crates/thicket-automata/src/union.rs

//! Disjoint union of two tree automata (`spec.md` §4.1, "union_disjoint").

use crate::ta::TreeAut;

/// `L(union_disjoint(a, b)) = L(a) U L(b)`. The two automata's state
/// spaces never interact; this is pure bookkeeping so their states don't
/// collide, not a product construction like [`crate::intersection::intersection_bu`].
#[must_use]
pub fn union_disjoint(a: &TreeAut, b: &TreeAut) -> TreeAut {
    a.union_disjoint(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reduce::is_empty;
    use thicket_label::{Label, LabelArena};

    #[test]
    fn union_accepts_either_language() {
        let mut arena = LabelArena::new();
        let lbl_a = arena.intern(Label::Data(thicket_core::Data::Int(1), thicket_label::DataId(0)));
        let lbl_b = arena.intern(Label::Data(thicket_core::Data::Int(2), thicket_label::DataId(0)));

        let mut a = TreeAut::new();
        let qa = a.fresh_state();
        a.add_transition(vec![], lbl_a, qa);
        a.add_final(qa);

        let mut b = TreeAut::new();
        let qb = b.fresh_state();
        b.add_transition(vec![], lbl_b, qb);
        b.add_final(qb);

        let u = union_disjoint(&a, &b);
        assert!(!is_empty(&u));
        assert_eq!(u.final_states().len(), 2);
    }
}

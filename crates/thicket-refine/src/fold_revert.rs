// crates/thicket-refine/src/fold_revert.rs

//! Reverting recorded fold/unfold steps for one root: "reverting folding
//! unfolds every recorded `(root, box)` pair" (`spec.md` §4.7).

use std::collections::HashMap;
use thicket_automata::TreeAut;
use thicket_core::RootIdx;
use thicket_fold::{FoldLog, FoldRecord};
use thicket_label::{BoxId, LabelArena};

/// Undoes every fold/unfold `fold_log` recorded against `root`, most
/// recent first, starting from `ta` as it stood after folding ran.
#[must_use]
pub fn revert_folding(
    ta: &TreeAut,
    root: RootIdx,
    arena: &mut LabelArena,
    fold_log: &FoldLog,
    box_db: &HashMap<BoxId, TreeAut>,
) -> TreeAut {
    let mut current = ta.clone();
    for (r, record) in fold_log.records().iter().rev() {
        if *r != root {
            continue;
        }
        match record {
            FoldRecord::Folded { box_id, selector, .. } => {
                if let Some(box_ta) = box_db.get(box_id) {
                    let (reverted, _) = thicket_fold::unfold_root(&current, arena, *box_id, box_ta, *selector);
                    current = reverted;
                }
            }
            // The forward engine only ever folds; an `Unfolded` entry
            // would come from a future caller that unfolds mid-execution
            // (e.g. to read through a box), undone by re-folding.
            FoldRecord::Unfolded { box_id, .. } => {
                if let Some(box_ta) = box_db.get(box_id) {
                    if let Some((reverted, _)) = thicket_fold::fold_root(&current, arena, *box_id, box_ta) {
                        current = reverted;
                    }
                }
            }
        }
    }
    current
}

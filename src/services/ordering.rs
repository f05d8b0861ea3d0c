use std::cmp::Ordering;

use crate::models::concept::Concept;

/// Hardest first, then longest first. Equal keys keep their input order.
pub fn compare_priority(a: &Concept, b: &Concept) -> Ordering {
    b.difficulty
        .weight()
        .cmp(&a.difficulty.weight())
        .then_with(|| b.estimated_minutes.cmp(&a.estimated_minutes))
}

pub fn order_concepts(concepts: &[Concept]) -> Vec<Concept> {
    let mut ordered = concepts.to_vec();
    // `sort_by` is stable, which provides the input-order tie break.
    ordered.sort_by(compare_priority);
    ordered
}

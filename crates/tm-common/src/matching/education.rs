use crate::{Candidate, Position};

/// Score credential fit against the education rank implied by the
/// position's seniority band. Meeting or exceeding the rank is a full
/// score; falling short scores proportionally.
pub fn score_education(candidate: &Candidate, position: &Position) -> f64 {
    let required_rank = position.experience_level.required_education_rank();
    let held_rank = candidate
        .education_level
        .map(|level| level.rank())
        .unwrap_or(0);

    if held_rank >= required_rank {
        100.0
    } else {
        (f64::from(held_rank) / f64::from(required_rank) * 100.0).max(0.0)
    }
}

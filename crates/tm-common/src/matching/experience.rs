use crate::{Candidate, Position};

/// Over-qualification beyond twice the requirement is nudged down, never
/// below this floor.
const OVERQUALIFICATION_FLOOR: f64 = 85.0;

fn average_years(candidate: &Candidate) -> f64 {
    if candidate.skills.is_empty() {
        return 0.0;
    }
    let total: f64 = candidate
        .skills
        .iter()
        .map(|skill| skill.years_of_experience)
        .sum();
    total / candidate.skills.len() as f64
}

/// Score seniority fit from the candidate's mean years of experience across
/// held skills against the years implied by the position's seniority band.
pub fn score_experience(candidate: &Candidate, position: &Position) -> f64 {
    let required_years = position.experience_level.required_years();
    if required_years <= 0.0 {
        return 100.0;
    }

    let ratio = average_years(candidate) / required_years;
    if ratio >= 1.0 {
        if ratio <= 2.0 {
            100.0
        } else {
            (100.0 - (ratio - 2.0) * 5.0).max(OVERQUALIFICATION_FLOOR)
        }
    } else {
        (ratio * 100.0).max(0.0)
    }
}

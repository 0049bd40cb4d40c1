use serde::{Deserialize, Serialize};

use crate::{Candidate, Position};

use super::{
    education::score_education,
    experience::score_experience,
    explanation::{build_reasons, build_suggestions},
    location::score_location,
    skills::{score_skills, SkillScore},
    weights::{AlgorithmConfig, ConfigError},
};

/// The fully computed outcome of one candidate/position evaluation.
///
/// Everything here is produced in memory before any persistence happens, so
/// a result is either written whole or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchComputation {
    pub candidate_id: Option<i64>,
    pub position_id: Option<i64>,
    /// Weighted sum of the four dimension scores, 0–100, two decimals.
    pub overall_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub location_score: f64,
    pub skill: SkillScore,
    pub recommendation_reasons: Vec<String>,
    pub improvement_suggestions: Vec<String>,
}

/// Summary persisted alongside a match result (the JSONB `details` column).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchDetails {
    pub total_required_skills: usize,
    pub matched_required_skills: usize,
    pub bonus_skills_count: usize,
    pub missing_skills: Vec<super::skills::MissingSkillEntry>,
    pub bonus_skills: Vec<super::skills::BonusSkillEntry>,
}

impl MatchComputation {
    pub fn details(&self) -> MatchDetails {
        MatchDetails {
            total_required_skills: self.skill.required_count,
            matched_required_skills: self.skill.matched_count,
            bonus_skills_count: self.skill.bonus_count,
            missing_skills: self.skill.missing.clone(),
            bonus_skills: self.skill.bonus.clone(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run the four dimension matchers and combine them with the configured
/// weights. Pure: identical inputs produce identical outputs.
///
/// The config is re-validated here even though repositories validate at
/// save time; an invalid weighting must never reach a stored score.
pub fn compute_match(
    candidate: &Candidate,
    position: &Position,
    config: &AlgorithmConfig,
) -> Result<MatchComputation, ConfigError> {
    config.validate()?;

    let skill = score_skills(candidate, position);
    let experience_score = score_experience(candidate, position);
    let education_score = score_education(candidate, position);
    let location_score = score_location(candidate, position);

    let overall_score = skill.score * config.skill_weight
        + experience_score * config.experience_weight
        + education_score * config.education_weight
        + location_score * config.location_weight;

    let recommendation_reasons =
        build_reasons(&skill, experience_score, education_score, location_score);
    let improvement_suggestions = build_suggestions(&skill);

    Ok(MatchComputation {
        candidate_id: candidate.id,
        position_id: position.id,
        overall_score: round2(overall_score),
        skill_score: round2(skill.score),
        experience_score: round2(experience_score),
        education_score: round2(education_score),
        location_score: round2(location_score),
        skill,
        recommendation_reasons,
        improvement_suggestions,
    })
}

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::{Candidate, CandidateSkill, Importance, Position, Proficiency};

/// Proficiency contributes 60% of a matched skill's pair score, recency of
/// practice (years vs. the required minimum) the remaining 40%.
const PROFICIENCY_SHARE: f64 = 0.6;
const EXPERIENCE_SHARE: f64 = 0.4;

/// One row per skill considered during an evaluation, required or bonus.
/// The full set is regenerated on every recalculation; rows are never merged
/// with a previous run's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillMatchDetail {
    pub skill_name: String,
    pub candidate_has_skill: bool,
    pub candidate_proficiency: Option<Proficiency>,
    pub candidate_experience_years: f64,
    pub position_requires_skill: bool,
    pub importance: Option<Importance>,
    pub min_experience_years: f64,
    pub weight: f64,
    /// Unweighted 0–100 pair score (0 for missing skills).
    pub match_score: f64,
    pub is_missing_skill: bool,
    pub is_bonus_skill: bool,
}

/// A required skill the candidate does not hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingSkillEntry {
    pub skill_name: String,
    pub importance: Importance,
    pub min_experience_years: f64,
}

/// A preferred (non-required) skill the candidate holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BonusSkillEntry {
    pub skill_name: String,
    pub proficiency: Proficiency,
    pub bonus_points: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillScore {
    /// 0–100 coverage of the position's required skills.
    pub score: f64,
    pub details: Vec<SkillMatchDetail>,
    pub missing: Vec<MissingSkillEntry>,
    pub bonus: Vec<BonusSkillEntry>,
    pub required_count: usize,
    pub matched_count: usize,
    pub bonus_count: usize,
}

fn pair_score(held: &CandidateSkill, min_experience_years: f64) -> f64 {
    let proficiency_score = held.proficiency.weight() * 100.0;
    let experience_score =
        (held.years_of_experience / min_experience_years.max(1.0)).min(1.0) * 100.0;
    proficiency_score * PROFICIENCY_SHARE + experience_score * EXPERIENCE_SHARE
}

/// Score required/preferred skill coverage.
///
/// The denominator is built from required skills only; bonus credit is
/// additive on top of the numerator. A position that declares no required
/// skills therefore scores 0 regardless of bonus overlap.
pub fn score_skills(candidate: &Candidate, position: &Position) -> SkillScore {
    let held: HashMap<&str, &CandidateSkill> = candidate
        .skills
        .iter()
        .map(|skill| (skill.name.as_str(), skill))
        .collect();
    let required_names: HashSet<&str> = position
        .required_skills
        .iter()
        .map(|req| req.name.as_str())
        .collect();

    let mut total = 0.0;
    let mut max_possible = 0.0;
    let mut details = Vec::new();
    let mut missing = Vec::new();
    let mut bonus = Vec::new();

    for req in &position.required_skills {
        let importance_weight = req.importance.weight();
        max_possible += importance_weight * req.weight * 100.0;

        match held.get(req.name.as_str()) {
            Some(skill) => {
                let score = pair_score(skill, req.min_experience_years);
                total += score * importance_weight * req.weight;

                details.push(SkillMatchDetail {
                    skill_name: req.name.clone(),
                    candidate_has_skill: true,
                    candidate_proficiency: Some(skill.proficiency),
                    candidate_experience_years: skill.years_of_experience,
                    position_requires_skill: true,
                    importance: Some(req.importance),
                    min_experience_years: req.min_experience_years,
                    weight: req.weight,
                    match_score: score,
                    is_missing_skill: false,
                    is_bonus_skill: false,
                });
            }
            None => {
                missing.push(MissingSkillEntry {
                    skill_name: req.name.clone(),
                    importance: req.importance,
                    min_experience_years: req.min_experience_years,
                });

                details.push(SkillMatchDetail {
                    skill_name: req.name.clone(),
                    candidate_has_skill: false,
                    candidate_proficiency: None,
                    candidate_experience_years: 0.0,
                    position_requires_skill: true,
                    importance: Some(req.importance),
                    min_experience_years: req.min_experience_years,
                    weight: req.weight,
                    match_score: 0.0,
                    is_missing_skill: true,
                    is_bonus_skill: false,
                });
            }
        }
    }

    for pref in &position.preferred_skills {
        if required_names.contains(pref.name.as_str()) {
            continue;
        }
        let Some(skill) = held.get(pref.name.as_str()) else {
            continue;
        };

        let proficiency_score = skill.proficiency.weight() * 100.0;
        total += proficiency_score * pref.bonus_points;

        bonus.push(BonusSkillEntry {
            skill_name: pref.name.clone(),
            proficiency: skill.proficiency,
            bonus_points: pref.bonus_points,
        });

        details.push(SkillMatchDetail {
            skill_name: pref.name.clone(),
            candidate_has_skill: true,
            candidate_proficiency: Some(skill.proficiency),
            candidate_experience_years: skill.years_of_experience,
            position_requires_skill: false,
            importance: None,
            min_experience_years: 0.0,
            weight: 1.0,
            match_score: proficiency_score,
            is_missing_skill: false,
            is_bonus_skill: true,
        });
    }

    let score = if max_possible > 0.0 {
        (total / max_possible * 100.0).min(100.0)
    } else {
        0.0
    };

    let required_count = position.required_skills.len();
    SkillScore {
        score,
        required_count,
        matched_count: required_count - missing.len(),
        bonus_count: bonus.len(),
        details,
        missing,
        bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PreferredSkill, RequiredSkill};

    fn candidate_with(skills: Vec<CandidateSkill>) -> Candidate {
        Candidate {
            display_name: "test candidate".into(),
            skills,
            ..Candidate::default()
        }
    }

    fn skill(name: &str, proficiency: Proficiency, years: f64) -> CandidateSkill {
        CandidateSkill {
            name: name.into(),
            proficiency,
            years_of_experience: years,
        }
    }

    fn required(name: &str, importance: Importance, min_years: f64, weight: f64) -> RequiredSkill {
        RequiredSkill {
            name: name.into(),
            importance,
            min_experience_years: min_years,
            weight,
        }
    }

    #[test]
    fn scores_single_required_skill() {
        // advanced (0.8) -> 80 proficiency; 3y vs min 2y caps at 100 experience;
        // 0.6*80 + 0.4*100 = 88 against a denominator fully covered by the pair.
        let candidate = candidate_with(vec![skill("Python", Proficiency::Advanced, 3.0)]);
        let position = Position {
            required_skills: vec![required("Python", Importance::Important, 2.0, 1.0)],
            ..Position::default()
        };

        let result = score_skills(&candidate, &position);
        assert!((result.score - 88.0).abs() < 1e-9);
        assert_eq!(result.required_count, 1);
        assert_eq!(result.matched_count, 1);
        assert!(result.missing.is_empty());
        assert_eq!(result.details.len(), 1);
        assert!((result.details[0].match_score - 88.0).abs() < 1e-9);
    }

    #[test]
    fn missing_required_skill_is_recorded() {
        let candidate = candidate_with(vec![]);
        let position = Position {
            required_skills: vec![required("Rust", Importance::Critical, 2.0, 1.0)],
            ..Position::default()
        };

        let result = score_skills(&candidate, &position);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.matched_count, 0);
        assert_eq!(result.missing.len(), 1);
        assert_eq!(result.missing[0].skill_name, "Rust");
        assert_eq!(result.missing[0].importance, Importance::Critical);
        assert!(result.details[0].is_missing_skill);
    }

    #[test]
    fn bonus_skill_adds_on_top_of_required_denominator() {
        let candidate = candidate_with(vec![
            skill("Python", Proficiency::Advanced, 3.0),
            skill("Docker", Proficiency::Expert, 2.0),
        ]);
        let position = Position {
            required_skills: vec![required("Python", Importance::Important, 2.0, 1.0)],
            preferred_skills: vec![PreferredSkill {
                name: "Docker".into(),
                bonus_points: 0.5,
            }],
            ..Position::default()
        };

        // required contributes 176/200; bonus adds 100*0.5 = 50 -> 226/200 capped.
        let result = score_skills(&candidate, &position);
        assert!((result.score - 100.0).abs() < 1e-9);
        assert_eq!(result.bonus_count, 1);
        assert_eq!(result.bonus[0].skill_name, "Docker");
        assert!(result.details.iter().any(|d| d.is_bonus_skill));
    }

    #[test]
    fn preferred_skill_already_required_is_not_double_counted() {
        let candidate = candidate_with(vec![skill("Python", Proficiency::Expert, 5.0)]);
        let position = Position {
            required_skills: vec![required("Python", Importance::Important, 2.0, 1.0)],
            preferred_skills: vec![PreferredSkill {
                name: "Python".into(),
                bonus_points: 2.0,
            }],
            ..Position::default()
        };

        let result = score_skills(&candidate, &position);
        assert_eq!(result.bonus_count, 0);
        assert_eq!(result.details.len(), 1);
        assert!(!result.details[0].is_bonus_skill);
    }

    #[test]
    fn zero_required_skills_score_zero_even_with_bonus_overlap() {
        let candidate = candidate_with(vec![skill("Go", Proficiency::Expert, 4.0)]);
        let position = Position {
            preferred_skills: vec![PreferredSkill {
                name: "Go".into(),
                bonus_points: 2.0,
            }],
            ..Position::default()
        };

        let result = score_skills(&candidate, &position);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.bonus_count, 1);
    }

    #[test]
    fn satisfying_an_added_requirement_never_lowers_the_score() {
        let candidate = candidate_with(vec![
            skill("Python", Proficiency::Intermediate, 1.0),
            skill("SQL", Proficiency::Expert, 6.0),
        ]);
        let base = Position {
            required_skills: vec![required("Python", Importance::Important, 2.0, 1.0)],
            ..Position::default()
        };
        let mut extended = base.clone();
        extended
            .required_skills
            .push(required("SQL", Importance::Important, 2.0, 1.0));

        let before = score_skills(&candidate, &base).score;
        let after = score_skills(&candidate, &extended).score;
        assert!(after >= before);
    }

    #[test]
    fn min_experience_floor_avoids_division_blowup() {
        // min years of 0 is clamped to 1 in the experience axis.
        let candidate = candidate_with(vec![skill("Rust", Proficiency::Beginner, 0.5)]);
        let position = Position {
            required_skills: vec![required("Rust", Importance::NiceToHave, 0.0, 1.0)],
            ..Position::default()
        };

        let result = score_skills(&candidate, &position);
        // 0.6*30 + 0.4*(0.5/1 * 100) = 38
        assert!((result.details[0].match_score - 38.0).abs() < 1e-9);
        assert!(result.score <= 100.0);
    }
}

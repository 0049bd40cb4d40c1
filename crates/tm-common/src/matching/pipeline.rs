use std::cmp::Ordering;

use super::{
    scoring::{compute_match, MatchComputation},
    weights::{AlgorithmConfig, ConfigError},
};
use crate::{Candidate, Position};

#[derive(Debug, Clone)]
pub struct RankingOptions {
    /// Pairs scoring below this are dropped from the ranking.
    pub min_score: f64,
    /// Maximum number of pairs returned after sorting.
    pub limit: usize,
}

impl Default for RankingOptions {
    fn default() -> Self {
        Self {
            min_score: 60.0,
            limit: 20,
        }
    }
}

/// Sort score-descending with an id tiebreak so equal scores rank stably.
pub fn sort_and_trim(
    mut results: Vec<MatchComputation>,
    options: &RankingOptions,
) -> Vec<MatchComputation> {
    results.retain(|result| result.overall_score >= options.min_score);
    results.sort_by(|a, b| {
        match b
            .overall_score
            .partial_cmp(&a.overall_score)
            .unwrap_or(Ordering::Equal)
        {
            Ordering::Equal => (a.candidate_id, a.position_id).cmp(&(b.candidate_id, b.position_id)),
            other => other,
        }
    });
    results.truncate(options.limit);
    results
}

/// Score one candidate against every given position and rank the survivors.
pub fn rank_positions_for_candidate(
    candidate: &Candidate,
    positions: &[Position],
    config: &AlgorithmConfig,
    options: &RankingOptions,
) -> Result<Vec<MatchComputation>, ConfigError> {
    config.validate()?;

    let results = positions
        .iter()
        .map(|position| compute_match(candidate, position, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sort_and_trim(results, options))
}

/// Score every given candidate against one position and rank the survivors.
pub fn rank_candidates_for_position(
    position: &Position,
    candidates: &[Candidate],
    config: &AlgorithmConfig,
    options: &RankingOptions,
) -> Result<Vec<MatchComputation>, ConfigError> {
    config.validate()?;

    let results = candidates
        .iter()
        .map(|candidate| compute_match(candidate, position, config))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(sort_and_trim(results, options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        CandidateSkill, EducationLevel, ExperienceLevel, Importance, Proficiency, RemoteOption,
        RequiredSkill,
    };

    fn candidate(id: i64, proficiency: Proficiency) -> Candidate {
        Candidate {
            id: Some(id),
            display_name: format!("candidate-{id}"),
            education_level: Some(EducationLevel::Bachelor),
            preferred_locations: vec![],
            skills: vec![CandidateSkill {
                name: "Rust".into(),
                proficiency,
                years_of_experience: 3.0,
            }],
            is_seeking: true,
        }
    }

    fn position(id: i64) -> Position {
        Position {
            id: Some(id),
            title: format!("position-{id}"),
            experience_level: ExperienceLevel::Mid,
            location_city: "Berlin".into(),
            remote_option: RemoteOption::Remote,
            required_skills: vec![RequiredSkill {
                name: "Rust".into(),
                importance: Importance::Critical,
                min_experience_years: 2.0,
                weight: 1.0,
            }],
            preferred_skills: vec![],
            is_open: true,
        }
    }

    #[test]
    fn ranks_candidates_by_score_descending() {
        let strong = candidate(1, Proficiency::Expert);
        let weak = candidate(2, Proficiency::Beginner);
        let options = RankingOptions {
            min_score: 0.0,
            limit: 10,
        };

        let ranked = rank_candidates_for_position(
            &position(9),
            &[weak, strong],
            &AlgorithmConfig::balanced_default(),
            &options,
        )
        .unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].candidate_id, Some(1));
        assert!(ranked[0].overall_score >= ranked[1].overall_score);
    }

    #[test]
    fn filters_below_min_score_and_truncates() {
        let candidates = vec![
            candidate(1, Proficiency::Expert),
            candidate(2, Proficiency::Advanced),
            candidate(3, Proficiency::Beginner),
        ];
        let options = RankingOptions {
            min_score: 60.0,
            limit: 1,
        };

        let ranked = rank_candidates_for_position(
            &position(9),
            &candidates,
            &AlgorithmConfig::balanced_default(),
            &options,
        )
        .unwrap();

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].candidate_id, Some(1));
    }

    #[test]
    fn equal_scores_rank_by_id_for_stable_output() {
        let twin_a = candidate(5, Proficiency::Advanced);
        let twin_b = candidate(3, Proficiency::Advanced);
        let options = RankingOptions {
            min_score: 0.0,
            limit: 10,
        };

        let ranked = rank_candidates_for_position(
            &position(9),
            &[twin_a, twin_b],
            &AlgorithmConfig::balanced_default(),
            &options,
        )
        .unwrap();

        assert_eq!(ranked[0].candidate_id, Some(3));
        assert_eq!(ranked[1].candidate_id, Some(5));
    }

    #[test]
    fn ranks_positions_for_a_candidate() {
        let mut sparse = position(1);
        sparse.required_skills[0].name = "Go".into();
        let rich = position(2);
        let options = RankingOptions {
            min_score: 0.0,
            limit: 10,
        };

        let ranked = rank_positions_for_candidate(
            &candidate(1, Proficiency::Expert),
            &[sparse, rich],
            &AlgorithmConfig::balanced_default(),
            &options,
        )
        .unwrap();

        assert_eq!(ranked[0].position_id, Some(2));
    }

    #[test]
    fn propagates_config_errors() {
        let mut config = AlgorithmConfig::balanced_default();
        config.skill_weight = 0.9;

        let result = rank_positions_for_candidate(
            &candidate(1, Proficiency::Expert),
            &[position(1)],
            &config,
            &RankingOptions::default(),
        );
        assert!(result.is_err());
    }
}

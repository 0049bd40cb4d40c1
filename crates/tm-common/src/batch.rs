use std::fmt::Display;
use std::future::Future;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::matching::pipeline::{sort_and_trim, RankingOptions};
use crate::matching::MatchComputation;
use crate::{Candidate, Position};

const DEFAULT_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub min_score: f64,
    /// Cap on the ranked results returned; `None` keeps every survivor.
    pub limit: Option<usize>,
    pub concurrency: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            min_score: 60.0,
            limit: None,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Outcome of one batch run. `results` is filtered by `min_score`, sorted
/// score-descending, and truncated to the configured limit; the counters
/// cover the whole run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub pairs_total: usize,
    pub pairs_scored: usize,
    pub pairs_failed: usize,
    pub results: Vec<MatchComputation>,
}

/// Fan independent pair computations out over a bounded number of in-flight
/// futures. One failing pair is logged and dropped; the rest of the batch
/// keeps going.
pub struct BatchRunner {
    concurrency: usize,
}

impl BatchRunner {
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    pub async fn run<F, Fut, E>(
        &self,
        pairs: Vec<(Candidate, Position)>,
        options: &BatchOptions,
        handler: F,
    ) -> BatchReport
    where
        F: Fn(Candidate, Position) -> Fut,
        Fut: Future<Output = Result<MatchComputation, E>>,
        E: Display,
    {
        let pairs_total = pairs.len();
        info!(pairs_total, concurrency = self.concurrency, "batch match started");

        let outcomes: Vec<Result<MatchComputation, (Option<i64>, Option<i64>, E)>> =
            stream::iter(pairs.into_iter().map(|(candidate, position)| {
                let candidate_id = candidate.id;
                let position_id = position.id;
                let fut = handler(candidate, position);
                async move {
                    fut.await
                        .map_err(|err| (candidate_id, position_id, err))
                }
            }))
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut scored = Vec::with_capacity(outcomes.len());
        let mut pairs_failed = 0usize;
        for outcome in outcomes {
            match outcome {
                Ok(computation) => scored.push(computation),
                Err((candidate_id, position_id, err)) => {
                    pairs_failed += 1;
                    warn!(
                        ?candidate_id,
                        ?position_id,
                        error = %err,
                        "pair computation failed; continuing batch"
                    );
                }
            }
        }

        let pairs_scored = scored.len();
        let ranking = RankingOptions {
            min_score: options.min_score,
            limit: options.limit.unwrap_or(usize::MAX),
        };
        let results = sort_and_trim(scored, &ranking);

        info!(
            pairs_total,
            pairs_scored,
            pairs_failed,
            kept = results.len(),
            "batch match finished"
        );

        BatchReport {
            pairs_total,
            pairs_scored,
            pairs_failed,
            results,
        }
    }
}

/// Build the full cross product of the given candidates and positions.
pub fn cross_pairs(candidates: &[Candidate], positions: &[Position]) -> Vec<(Candidate, Position)> {
    let mut pairs = Vec::with_capacity(candidates.len() * positions.len());
    for candidate in candidates {
        for position in positions {
            pairs.push((candidate.clone(), position.clone()));
        }
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::{compute_match, AlgorithmConfig};
    use crate::{CandidateSkill, Importance, Proficiency, RequiredSkill};

    fn candidate(id: i64, proficiency: Proficiency) -> Candidate {
        Candidate {
            id: Some(id),
            display_name: format!("candidate-{id}"),
            skills: vec![CandidateSkill {
                name: "Rust".into(),
                proficiency,
                years_of_experience: 3.0,
            }],
            ..Candidate::default()
        }
    }

    fn position(id: i64) -> Position {
        Position {
            id: Some(id),
            title: format!("position-{id}"),
            remote_option: crate::RemoteOption::Remote,
            required_skills: vec![RequiredSkill {
                name: "Rust".into(),
                importance: Importance::Critical,
                min_experience_years: 1.0,
                weight: 1.0,
            }],
            ..Position::default()
        }
    }

    #[tokio::test]
    async fn scores_the_full_cross_product() {
        let candidates = vec![
            candidate(1, Proficiency::Expert),
            candidate(2, Proficiency::Advanced),
        ];
        let positions = vec![position(10), position(11)];
        let pairs = cross_pairs(&candidates, &positions);
        assert_eq!(pairs.len(), 4);

        let options = BatchOptions {
            min_score: 0.0,
            ..BatchOptions::default()
        };
        let config = AlgorithmConfig::balanced_default();
        let report = BatchRunner::new(4)
            .run(pairs, &options, |c, p| {
                let config = config.clone();
                async move { compute_match(&c, &p, &config) }
            })
            .await;

        assert_eq!(report.pairs_total, 4);
        assert_eq!(report.pairs_scored, 4);
        assert_eq!(report.pairs_failed, 0);
        assert_eq!(report.results.len(), 4);
        assert!(report
            .results
            .windows(2)
            .all(|w| w[0].overall_score >= w[1].overall_score));
    }

    #[tokio::test]
    async fn one_failing_pair_does_not_abort_the_batch() {
        let pairs = cross_pairs(
            &[candidate(1, Proficiency::Expert), candidate(2, Proficiency::Expert)],
            &[position(10)],
        );
        let options = BatchOptions {
            min_score: 0.0,
            ..BatchOptions::default()
        };
        let config = AlgorithmConfig::balanced_default();

        let report = BatchRunner::new(2)
            .run(pairs, &options, |c, p| {
                let config = config.clone();
                async move {
                    if c.id == Some(2) {
                        Err("simulated persistence failure".to_string())
                    } else {
                        compute_match(&c, &p, &config).map_err(|e| e.to_string())
                    }
                }
            })
            .await;

        assert_eq!(report.pairs_total, 2);
        assert_eq!(report.pairs_scored, 1);
        assert_eq!(report.pairs_failed, 1);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].candidate_id, Some(1));
    }

    #[tokio::test]
    async fn min_score_and_limit_shape_the_results() {
        let candidates = vec![
            candidate(1, Proficiency::Expert),
            candidate(2, Proficiency::Advanced),
            candidate(3, Proficiency::Beginner),
        ];
        let pairs = cross_pairs(&candidates, &[position(10)]);
        let options = BatchOptions {
            min_score: 60.0,
            limit: Some(1),
            concurrency: 2,
        };
        let config = AlgorithmConfig::balanced_default();

        let report = BatchRunner::new(options.concurrency)
            .run(pairs, &options, |c, p| {
                let config = config.clone();
                async move { compute_match(&c, &p, &config) }
            })
            .await;

        assert_eq!(report.pairs_scored, 3);
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.results[0].candidate_id, Some(1));
    }
}

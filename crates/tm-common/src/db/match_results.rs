use std::time::Instant;

use chrono::{DateTime, Utc};
use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::types::Json;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::analysis::MatchAnalysis;
use crate::db::util::{maybe_log_slow_query, parse_string_array};
use crate::db::PgPool;
use crate::matching::MatchComputation;

#[derive(Debug, thiserror::Error)]
pub enum MatchResultStorageError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to encode match payload: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// A persisted match record as read back for ranking queries.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredMatchResult {
    pub id: i64,
    pub candidate_id: i64,
    pub position_id: i64,
    pub overall_score: f64,
    pub skill_score: f64,
    pub experience_score: f64,
    pub education_score: f64,
    pub location_score: f64,
    pub recommendation_reasons: Vec<String>,
    pub improvement_suggestions: Vec<String>,
    pub analysis: Option<Value>,
    pub calculated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchStatistics {
    pub total_matches: i64,
    /// overall_score >= 80.
    pub high_quality_matches: i64,
    /// 60 <= overall_score < 80.
    pub medium_quality_matches: i64,
    pub average_score: f64,
    pub top_score: f64,
}

fn map_stored_row(row: &Row) -> StoredMatchResult {
    StoredMatchResult {
        id: row.get("id"),
        candidate_id: row.get("candidate_id"),
        position_id: row.get("position_id"),
        overall_score: row.get("overall_score"),
        skill_score: row.get("skill_score"),
        experience_score: row.get("experience_score"),
        education_score: row.get("education_score"),
        location_score: row.get("location_score"),
        recommendation_reasons: parse_string_array(row.get("recommendation_reasons")),
        improvement_suggestions: parse_string_array(row.get("improvement_suggestions")),
        analysis: row.get("analysis"),
        calculated_at: row.get("calculated_at"),
    }
}

/// Persist one computed match, replacing any previous record for the same
/// (candidate, position) pair.
///
/// Runs in a single transaction: the result row is upserted, stale
/// `skill_match_details` rows are deleted, and the freshly computed rows are
/// inserted. Concurrent recomputation of the same pair is last-writer-wins
/// with full replace semantics; detail sets are never merged. The stored
/// `analysis` column is cleared here and only refilled by
/// [`attach_analysis`] after the numeric result is committed.
#[instrument(skip(pool, computation))]
pub async fn upsert_match_result(
    pool: &PgPool,
    candidate_id: i64,
    position_id: i64,
    computation: &MatchComputation,
) -> Result<i64, MatchResultStorageError> {
    let started_at = Instant::now();
    let details = serde_json::to_value(computation.details())?;
    let reasons = serde_json::to_value(&computation.recommendation_reasons)?;
    let suggestions = serde_json::to_value(&computation.improvement_suggestions)?;

    let mut client = pool.get().await?;
    let tx = client.transaction().await?;

    let row = tx
        .query_one(
            "INSERT INTO tm.match_results (
                candidate_id, position_id,
                overall_score, skill_score, experience_score, education_score, location_score,
                details, recommendation_reasons, improvement_suggestions,
                analysis, calculated_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NULL, NOW(), NOW())
            ON CONFLICT (candidate_id, position_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                skill_score = EXCLUDED.skill_score,
                experience_score = EXCLUDED.experience_score,
                education_score = EXCLUDED.education_score,
                location_score = EXCLUDED.location_score,
                details = EXCLUDED.details,
                recommendation_reasons = EXCLUDED.recommendation_reasons,
                improvement_suggestions = EXCLUDED.improvement_suggestions,
                analysis = NULL,
                calculated_at = NOW(),
                updated_at = NOW()
            RETURNING id",
            &[
                &candidate_id,
                &position_id,
                &computation.overall_score,
                &computation.skill_score,
                &computation.experience_score,
                &computation.education_score,
                &computation.location_score,
                &Json(&details),
                &Json(&reasons),
                &Json(&suggestions),
            ],
        )
        .await?;
    let match_result_id: i64 = row.get(0);

    tx.execute(
        "DELETE FROM tm.skill_match_details WHERE match_result_id = $1",
        &[&match_result_id],
    )
    .await?;

    let insert_detail = tx
        .prepare(
            "INSERT INTO tm.skill_match_details (
                match_result_id, skill_name,
                candidate_has_skill, candidate_proficiency, candidate_experience_years,
                position_requires_skill, importance, min_experience_years, weight,
                match_score, is_missing_skill, is_bonus_skill
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .await?;

    for detail in &computation.skill.details {
        tx.execute(
            &insert_detail,
            &[
                &match_result_id,
                &detail.skill_name,
                &detail.candidate_has_skill,
                &detail.candidate_proficiency.map(|p| p.as_str()),
                &detail.candidate_experience_years,
                &detail.position_requires_skill,
                &detail.importance.map(|i| i.as_str()),
                &detail.min_experience_years,
                &detail.weight,
                &detail.match_score,
                &detail.is_missing_skill,
                &detail.is_bonus_skill,
            ],
        )
        .await?;
    }

    tx.commit().await?;
    maybe_log_slow_query("upsert_match_result", started_at);
    Ok(match_result_id)
}

/// Store the augmentation payload for an already-committed match result.
/// Separate from the numeric upsert so analysis can lag or fail without
/// touching the score.
#[instrument(skip(pool, analysis))]
pub async fn attach_analysis(
    pool: &PgPool,
    match_result_id: i64,
    analysis: &MatchAnalysis,
) -> Result<u64, MatchResultStorageError> {
    let payload = serde_json::to_value(analysis)?;
    let client = pool.get().await?;

    let rows = client
        .execute(
            "UPDATE tm.match_results SET analysis = $2, updated_at = NOW() WHERE id = $1",
            &[&match_result_id, &Json(&payload)],
        )
        .await?;

    Ok(rows)
}

#[instrument(skip(pool))]
pub async fn fetch_top_matches_for_candidate(
    pool: &PgPool,
    candidate_id: i64,
    min_score: f64,
    limit: i64,
) -> Result<Vec<StoredMatchResult>, MatchResultStorageError> {
    let started_at = Instant::now();
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, candidate_id, position_id,
                    overall_score, skill_score, experience_score, education_score, location_score,
                    recommendation_reasons, improvement_suggestions, analysis, calculated_at
             FROM tm.match_results
             WHERE candidate_id = $1 AND overall_score >= $2
             ORDER BY overall_score DESC, position_id
             LIMIT $3",
            &[&candidate_id, &min_score, &limit],
        )
        .await?;

    maybe_log_slow_query("fetch_top_matches_for_candidate", started_at);
    Ok(rows.iter().map(map_stored_row).collect())
}

#[instrument(skip(pool))]
pub async fn fetch_top_matches_for_position(
    pool: &PgPool,
    position_id: i64,
    min_score: f64,
    limit: i64,
) -> Result<Vec<StoredMatchResult>, MatchResultStorageError> {
    let started_at = Instant::now();
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, candidate_id, position_id,
                    overall_score, skill_score, experience_score, education_score, location_score,
                    recommendation_reasons, improvement_suggestions, analysis, calculated_at
             FROM tm.match_results
             WHERE position_id = $1 AND overall_score >= $2
             ORDER BY overall_score DESC, candidate_id
             LIMIT $3",
            &[&position_id, &min_score, &limit],
        )
        .await?;

    maybe_log_slow_query("fetch_top_matches_for_position", started_at);
    Ok(rows.iter().map(map_stored_row).collect())
}

fn map_statistics_row(row: &Row) -> MatchStatistics {
    MatchStatistics {
        total_matches: row.get("total_matches"),
        high_quality_matches: row.get("high_quality_matches"),
        medium_quality_matches: row.get("medium_quality_matches"),
        average_score: row.get("average_score"),
        top_score: row.get("top_score"),
    }
}

const STATISTICS_SELECT: &str = "SELECT
        COUNT(*) AS total_matches,
        COUNT(*) FILTER (WHERE overall_score >= 80.0) AS high_quality_matches,
        COUNT(*) FILTER (WHERE overall_score >= 60.0 AND overall_score < 80.0)
            AS medium_quality_matches,
        COALESCE(AVG(overall_score), 0.0) AS average_score,
        COALESCE(MAX(overall_score), 0.0) AS top_score
     FROM tm.match_results";

#[instrument(skip(pool))]
pub async fn fetch_match_statistics_for_candidate(
    pool: &PgPool,
    candidate_id: i64,
) -> Result<MatchStatistics, MatchResultStorageError> {
    let client = pool.get().await?;
    let query = format!("{STATISTICS_SELECT} WHERE candidate_id = $1");
    let row = client.query_one(&query, &[&candidate_id]).await?;
    Ok(map_statistics_row(&row))
}

#[instrument(skip(pool))]
pub async fn fetch_match_statistics_for_position(
    pool: &PgPool,
    position_id: i64,
) -> Result<MatchStatistics, MatchResultStorageError> {
    let client = pool.get().await?;
    let query = format!("{STATISTICS_SELECT} WHERE position_id = $1");
    let row = client.query_one(&query, &[&position_id]).await?;
    Ok(map_statistics_row(&row))
}

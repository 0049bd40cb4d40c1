use std::collections::HashMap;

use deadpool_postgres::PoolError;
use serde_json::Value;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::db::util::parse_string_array;
use crate::db::PgPool;
use crate::{Candidate, CandidateSkill};

#[derive(Debug, thiserror::Error)]
pub enum CandidateFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("candidate not found: {0}")]
    NotFound(i64),
    #[error("failed to map candidate row: {0}")]
    Mapping(String),
}

fn map_candidate_row(row: &Row) -> Result<Candidate, CandidateFetchError> {
    let education_level = row
        .get::<_, Option<String>>("education_level")
        .map(|raw| raw.parse())
        .transpose()
        .map_err(|err: crate::ParseEnumError| CandidateFetchError::Mapping(err.to_string()))?;

    Ok(Candidate {
        id: Some(row.get("id")),
        display_name: row.get("display_name"),
        education_level,
        preferred_locations: parse_string_array(row.get::<_, Option<Value>>("preferred_locations")),
        skills: vec![],
        is_seeking: row.get("is_seeking"),
    })
}

fn map_skill_row(row: &Row) -> Result<CandidateSkill, CandidateFetchError> {
    let proficiency = row
        .get::<_, String>("proficiency")
        .parse()
        .map_err(|err: crate::ParseEnumError| CandidateFetchError::Mapping(err.to_string()))?;

    Ok(CandidateSkill {
        name: row.get("skill_name"),
        proficiency,
        years_of_experience: row.get("years_of_experience"),
    })
}

async fn attach_skills(
    client: &deadpool_postgres::Object,
    candidates: &mut [Candidate],
) -> Result<(), CandidateFetchError> {
    let ids: Vec<i64> = candidates.iter().filter_map(|c| c.id).collect();
    if ids.is_empty() {
        return Ok(());
    }

    let rows = client
        .query(
            "SELECT candidate_id, skill_name, proficiency, years_of_experience
             FROM tm.candidate_skills
             WHERE candidate_id = ANY($1)
             ORDER BY candidate_id, skill_name",
            &[&ids],
        )
        .await?;

    let mut by_candidate: HashMap<i64, Vec<CandidateSkill>> = HashMap::new();
    for row in &rows {
        let candidate_id: i64 = row.get("candidate_id");
        by_candidate
            .entry(candidate_id)
            .or_default()
            .push(map_skill_row(row)?);
    }

    for candidate in candidates.iter_mut() {
        if let Some(id) = candidate.id {
            candidate.skills = by_candidate.remove(&id).unwrap_or_default();
        }
    }

    Ok(())
}

/// Load one candidate profile with its skills. `NotFound` when absent.
#[instrument(skip(pool))]
pub async fn fetch_candidate(
    pool: &PgPool,
    candidate_id: i64,
) -> Result<Candidate, CandidateFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, display_name, education_level, preferred_locations, is_seeking
             FROM tm.candidates
             WHERE id = $1",
            &[&candidate_id],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Err(CandidateFetchError::NotFound(candidate_id));
    };

    let mut candidates = vec![map_candidate_row(row)?];
    attach_skills(&client, &mut candidates).await?;
    Ok(candidates.remove(0))
}

/// Load a specific set of candidates. Missing ids are reported, not skipped:
/// batch callers should fail loudly on a bad id list.
#[instrument(skip(pool, ids))]
pub async fn fetch_candidates_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<Candidate>, CandidateFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, display_name, education_level, preferred_locations, is_seeking
             FROM tm.candidates
             WHERE id = ANY($1)
             ORDER BY id",
            &[&ids.to_vec()],
        )
        .await?;

    let mut candidates = rows
        .iter()
        .map(map_candidate_row)
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(missing) = ids
        .iter()
        .find(|id| !candidates.iter().any(|c| c.id == Some(**id)))
    {
        return Err(CandidateFetchError::NotFound(*missing));
    }

    attach_skills(&client, &mut candidates).await?;
    Ok(candidates)
}

/// Load every candidate currently open to matching.
#[instrument(skip(pool))]
pub async fn list_seeking_candidates(pool: &PgPool) -> Result<Vec<Candidate>, CandidateFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, display_name, education_level, preferred_locations, is_seeking
             FROM tm.candidates
             WHERE is_seeking = true
             ORDER BY id",
            &[],
        )
        .await?;

    let mut candidates = rows
        .iter()
        .map(map_candidate_row)
        .collect::<Result<Vec<_>, _>>()?;

    attach_skills(&client, &mut candidates).await?;
    Ok(candidates)
}

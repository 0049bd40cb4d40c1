use std::collections::HashMap;

use deadpool_postgres::PoolError;
use tokio_postgres::{Error as PgError, Row};
use tracing::instrument;

use crate::db::PgPool;
use crate::{ParseEnumError, Position, PreferredSkill, RequiredSkill};

#[derive(Debug, thiserror::Error)]
pub enum PositionFetchError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("postgres error: {0}")]
    Postgres(#[from] PgError),
    #[error("position not found: {0}")]
    NotFound(i64),
    #[error("failed to map position row: {0}")]
    Mapping(String),
}

impl From<ParseEnumError> for PositionFetchError {
    fn from(err: ParseEnumError) -> Self {
        PositionFetchError::Mapping(err.to_string())
    }
}

fn map_position_row(row: &Row) -> Result<Position, PositionFetchError> {
    Ok(Position {
        id: Some(row.get("id")),
        title: row.get("title"),
        experience_level: row.get::<_, String>("experience_level").parse()?,
        location_city: row.get("location_city"),
        remote_option: row.get::<_, String>("remote_option").parse()?,
        required_skills: vec![],
        preferred_skills: vec![],
        is_open: row.get("is_open"),
    })
}

fn map_required_row(row: &Row) -> Result<RequiredSkill, PositionFetchError> {
    Ok(RequiredSkill {
        name: row.get("skill_name"),
        importance: row.get::<_, String>("importance").parse()?,
        min_experience_years: row.get("min_experience_years"),
        weight: row.get("weight"),
    })
}

async fn attach_skill_lists(
    client: &deadpool_postgres::Object,
    positions: &mut [Position],
) -> Result<(), PositionFetchError> {
    let ids: Vec<i64> = positions.iter().filter_map(|p| p.id).collect();
    if ids.is_empty() {
        return Ok(());
    }

    let required_rows = client
        .query(
            "SELECT position_id, skill_name, importance, min_experience_years, weight
             FROM tm.position_required_skills
             WHERE position_id = ANY($1)
             ORDER BY position_id, skill_name",
            &[&ids],
        )
        .await?;

    let mut required: HashMap<i64, Vec<RequiredSkill>> = HashMap::new();
    for row in &required_rows {
        let position_id: i64 = row.get("position_id");
        required
            .entry(position_id)
            .or_default()
            .push(map_required_row(row)?);
    }

    let preferred_rows = client
        .query(
            "SELECT position_id, skill_name, bonus_points
             FROM tm.position_preferred_skills
             WHERE position_id = ANY($1)
             ORDER BY position_id, skill_name",
            &[&ids],
        )
        .await?;

    let mut preferred: HashMap<i64, Vec<PreferredSkill>> = HashMap::new();
    for row in &preferred_rows {
        let position_id: i64 = row.get("position_id");
        preferred.entry(position_id).or_default().push(PreferredSkill {
            name: row.get("skill_name"),
            bonus_points: row.get("bonus_points"),
        });
    }

    for position in positions.iter_mut() {
        if let Some(id) = position.id {
            position.required_skills = required.remove(&id).unwrap_or_default();
            position.preferred_skills = preferred.remove(&id).unwrap_or_default();
        }
    }

    Ok(())
}

/// Load one position with its required and preferred skill lists.
/// `NotFound` when absent.
#[instrument(skip(pool))]
pub async fn fetch_position(pool: &PgPool, position_id: i64) -> Result<Position, PositionFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, title, experience_level, location_city, remote_option, is_open
             FROM tm.positions
             WHERE id = $1",
            &[&position_id],
        )
        .await?;

    let Some(row) = rows.first() else {
        return Err(PositionFetchError::NotFound(position_id));
    };

    let mut positions = vec![map_position_row(row)?];
    attach_skill_lists(&client, &mut positions).await?;
    Ok(positions.remove(0))
}

/// Load a specific set of positions, failing on the first missing id.
#[instrument(skip(pool, ids))]
pub async fn fetch_positions_by_ids(
    pool: &PgPool,
    ids: &[i64],
) -> Result<Vec<Position>, PositionFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, title, experience_level, location_city, remote_option, is_open
             FROM tm.positions
             WHERE id = ANY($1)
             ORDER BY id",
            &[&ids.to_vec()],
        )
        .await?;

    let mut positions = rows
        .iter()
        .map(map_position_row)
        .collect::<Result<Vec<_>, _>>()?;

    if let Some(missing) = ids
        .iter()
        .find(|id| !positions.iter().any(|p| p.id == Some(**id)))
    {
        return Err(PositionFetchError::NotFound(*missing));
    }

    attach_skill_lists(&client, &mut positions).await?;
    Ok(positions)
}

/// Load every position still accepting candidates.
#[instrument(skip(pool))]
pub async fn list_open_positions(pool: &PgPool) -> Result<Vec<Position>, PositionFetchError> {
    let client = pool.get().await?;

    let rows = client
        .query(
            "SELECT id, title, experience_level, location_city, remote_option, is_open
             FROM tm.positions
             WHERE is_open = true
             ORDER BY id",
            &[],
        )
        .await?;

    let mut positions = rows
        .iter()
        .map(map_position_row)
        .collect::<Result<Vec<_>, _>>()?;

    attach_skill_lists(&client, &mut positions).await?;
    Ok(positions)
}

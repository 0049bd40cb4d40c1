use deadpool_postgres::PoolError;
use thiserror::Error;
use tokio_postgres::Error as PgError;
use tracing::{info, instrument};

use crate::db::{DbPoolError, PgPool};

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("failed to get postgres connection: {0}")]
    Pool(#[from] PoolError),
    #[error("failed to run migration: {0}")]
    Postgres(#[from] PgError),
    #[error("failed to build pool: {0}")]
    PoolBuild(#[from] DbPoolError),
}

struct Migration {
    id: i32,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    id: 1,
    description: "matching engine base tables",
    sql: r#"
CREATE TABLE IF NOT EXISTS tm.candidates (
    id BIGSERIAL PRIMARY KEY,
    display_name TEXT NOT NULL,
    education_level VARCHAR(20),
    preferred_locations JSONB NOT NULL DEFAULT '[]',
    is_seeking BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tm.candidate_skills (
    id BIGSERIAL PRIMARY KEY,
    candidate_id BIGINT NOT NULL REFERENCES tm.candidates(id) ON DELETE CASCADE,
    skill_name VARCHAR(100) NOT NULL,
    proficiency VARCHAR(20) NOT NULL,
    years_of_experience DOUBLE PRECISION NOT NULL DEFAULT 0,
    UNIQUE (candidate_id, skill_name),
    CONSTRAINT chk_candidate_skill_years CHECK (years_of_experience >= 0)
);

CREATE TABLE IF NOT EXISTS tm.positions (
    id BIGSERIAL PRIMARY KEY,
    title TEXT NOT NULL,
    experience_level VARCHAR(20) NOT NULL DEFAULT 'entry',
    location_city TEXT NOT NULL DEFAULT '',
    remote_option VARCHAR(20) NOT NULL DEFAULT 'on_site',
    is_open BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tm.position_required_skills (
    id BIGSERIAL PRIMARY KEY,
    position_id BIGINT NOT NULL REFERENCES tm.positions(id) ON DELETE CASCADE,
    skill_name VARCHAR(100) NOT NULL,
    importance VARCHAR(20) NOT NULL DEFAULT 'important',
    min_experience_years DOUBLE PRECISION NOT NULL DEFAULT 0,
    weight DOUBLE PRECISION NOT NULL DEFAULT 1.0,
    UNIQUE (position_id, skill_name),
    CONSTRAINT chk_required_skill_weight CHECK (weight >= 0.1 AND weight <= 5.0)
);

CREATE TABLE IF NOT EXISTS tm.position_preferred_skills (
    id BIGSERIAL PRIMARY KEY,
    position_id BIGINT NOT NULL REFERENCES tm.positions(id) ON DELETE CASCADE,
    skill_name VARCHAR(100) NOT NULL,
    bonus_points DOUBLE PRECISION NOT NULL DEFAULT 0.5,
    UNIQUE (position_id, skill_name),
    CONSTRAINT chk_preferred_skill_bonus CHECK (bonus_points >= 0.1 AND bonus_points <= 2.0)
);

CREATE TABLE IF NOT EXISTS tm.algorithm_configs (
    id BIGSERIAL PRIMARY KEY,
    name VARCHAR(100) NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    skill_weight DOUBLE PRECISION NOT NULL,
    experience_weight DOUBLE PRECISION NOT NULL,
    education_weight DOUBLE PRECISION NOT NULL,
    location_weight DOUBLE PRECISION NOT NULL,
    is_active BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE TABLE IF NOT EXISTS tm.match_results (
    id BIGSERIAL PRIMARY KEY,
    candidate_id BIGINT NOT NULL REFERENCES tm.candidates(id) ON DELETE CASCADE,
    position_id BIGINT NOT NULL REFERENCES tm.positions(id) ON DELETE CASCADE,
    overall_score DOUBLE PRECISION NOT NULL,
    skill_score DOUBLE PRECISION NOT NULL,
    experience_score DOUBLE PRECISION NOT NULL,
    education_score DOUBLE PRECISION NOT NULL,
    location_score DOUBLE PRECISION NOT NULL,
    details JSONB NOT NULL DEFAULT '{}',
    recommendation_reasons JSONB NOT NULL DEFAULT '[]',
    improvement_suggestions JSONB NOT NULL DEFAULT '[]',
    analysis JSONB,
    calculated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    UNIQUE (candidate_id, position_id),
    CONSTRAINT chk_overall_score_range CHECK (overall_score >= 0.0 AND overall_score <= 100.0),
    CONSTRAINT chk_skill_score_range CHECK (skill_score >= 0.0 AND skill_score <= 100.0)
);

CREATE INDEX IF NOT EXISTS idx_match_results_candidate_score
    ON tm.match_results(candidate_id, overall_score DESC);
CREATE INDEX IF NOT EXISTS idx_match_results_position_score
    ON tm.match_results(position_id, overall_score DESC);

CREATE TABLE IF NOT EXISTS tm.skill_match_details (
    id BIGSERIAL PRIMARY KEY,
    match_result_id BIGINT NOT NULL REFERENCES tm.match_results(id) ON DELETE CASCADE,
    skill_name VARCHAR(100) NOT NULL,
    candidate_has_skill BOOLEAN NOT NULL DEFAULT false,
    candidate_proficiency VARCHAR(20),
    candidate_experience_years DOUBLE PRECISION NOT NULL DEFAULT 0,
    position_requires_skill BOOLEAN NOT NULL DEFAULT false,
    importance VARCHAR(20),
    min_experience_years DOUBLE PRECISION NOT NULL DEFAULT 0,
    weight DOUBLE PRECISION NOT NULL DEFAULT 1.0,
    match_score DOUBLE PRECISION NOT NULL DEFAULT 0,
    is_missing_skill BOOLEAN NOT NULL DEFAULT false,
    is_bonus_skill BOOLEAN NOT NULL DEFAULT false
);

CREATE INDEX IF NOT EXISTS idx_skill_match_details_match
    ON tm.skill_match_details(match_result_id);
"#,
}];

#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    let mut client = pool.get().await?;
    client
        .batch_execute(
            "CREATE SCHEMA IF NOT EXISTS tm;
             CREATE TABLE IF NOT EXISTS tm.schema_migrations (
                id INTEGER PRIMARY KEY,
                description TEXT NOT NULL,
                applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
             );",
        )
        .await?;

    for migration in MIGRATIONS {
        let already_applied: bool = client
            .query_one(
                "SELECT EXISTS (SELECT 1 FROM tm.schema_migrations WHERE id = $1)",
                &[&migration.id],
            )
            .await?
            .get(0);

        if already_applied {
            continue;
        }

        let tx = client.transaction().await?;
        tx.batch_execute(migration.sql).await?;
        tx.execute(
            "INSERT INTO tm.schema_migrations (id, description) VALUES ($1, $2)",
            &[&migration.id, &migration.description],
        )
        .await?;
        tx.commit().await?;

        info!(
            id = migration.id,
            description = migration.description,
            "applied migration"
        );
    }

    Ok(())
}

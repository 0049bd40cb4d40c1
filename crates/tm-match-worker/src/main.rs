use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenvy::dotenv;
use tokio::time::sleep;
use tracing::{info, warn};

use tm_common::analysis::{create_analyzer, AnalysisConfig};
use tm_common::batch::BatchOptions;
use tm_common::db::{
    create_pool_from_url_checked, fetch_active_config, fetch_candidates_by_ids,
    fetch_positions_by_ids, list_open_positions, list_seeking_candidates, run_migrations, PgPool,
};
use tm_common::logging::{init_tracing_subscriber, install_tracing_panic_hook};
use tm_common::service::MatchService;
use tm_common::{Candidate, Position};

#[derive(Debug, Parser)]
#[command(
    name = "tm-match-worker",
    about = "Compute candidate/position match scores in bulk"
)]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL")]
    db_url: String,

    /// Restrict the batch to these candidate ids (default: every seeking candidate)
    #[arg(long = "candidate-id")]
    candidate_ids: Vec<i64>,

    /// Restrict the batch to these position ids (default: every open position)
    #[arg(long = "position-id")]
    position_ids: Vec<i64>,

    /// Drop pairs scoring below this from the reported ranking
    #[arg(long, default_value_t = 60.0)]
    min_score: f64,

    /// Keep at most this many ranked pairs in the report
    #[arg(long, default_value_t = 20)]
    limit: usize,

    /// Concurrent pair computations
    #[arg(long, default_value_t = 8)]
    concurrency: usize,

    /// Name of the active algorithm config to load
    #[arg(long, env = "TM_ALGORITHM_CONFIG", default_value = "default")]
    config_name: String,

    /// Apply embedded schema migrations before matching
    #[arg(long, default_value_t = false)]
    run_migrations: bool,

    /// Re-run the batch on this interval instead of exiting after one pass
    #[arg(long)]
    poll_interval_secs: Option<u64>,
}

async fn load_candidates(pool: &PgPool, cli: &Cli) -> Result<Vec<Candidate>, Box<dyn std::error::Error>> {
    if cli.candidate_ids.is_empty() {
        Ok(list_seeking_candidates(pool).await?)
    } else {
        Ok(fetch_candidates_by_ids(pool, &cli.candidate_ids).await?)
    }
}

async fn load_positions(pool: &PgPool, cli: &Cli) -> Result<Vec<Position>, Box<dyn std::error::Error>> {
    if cli.position_ids.is_empty() {
        Ok(list_open_positions(pool).await?)
    } else {
        Ok(fetch_positions_by_ids(pool, &cli.position_ids).await?)
    }
}

async fn run_pass(pool: &PgPool, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    // An invalid or missing config is fatal: no match may run against it.
    let config = fetch_active_config(pool, &cli.config_name).await?;
    let candidates = load_candidates(pool, cli).await?;
    let positions = load_positions(pool, cli).await?;

    if candidates.is_empty() || positions.is_empty() {
        info!(
            candidates = candidates.len(),
            positions = positions.len(),
            "nothing to match this pass"
        );
        return Ok(());
    }

    let mut service = MatchService::new(pool.clone(), config)?;
    let analysis_config = AnalysisConfig::from_env();
    if let Some(analyzer) = create_analyzer(&analysis_config) {
        service = service.with_analyzer(Arc::from(analyzer), analysis_config.timeout());
    }

    let options = BatchOptions {
        min_score: cli.min_score,
        limit: Some(cli.limit),
        concurrency: cli.concurrency,
    };

    let report = service.batch_match(candidates, positions, &options).await?;

    for result in &report.results {
        tm_metrics::record_pair_scored(result.overall_score);
    }
    for _ in 0..report.pairs_failed {
        tm_metrics::record_pair_failed();
    }
    tm_metrics::record_batch_summary(report.pairs_total, report.pairs_failed, report.results.len());

    info!(
        pairs_total = report.pairs_total,
        pairs_scored = report.pairs_scored,
        pairs_failed = report.pairs_failed,
        kept = report.results.len(),
        top_score = report.results.first().map(|r| r.overall_score),
        "batch pass complete"
    );

    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    init_tracing_subscriber("tm-match-worker");
    install_tracing_panic_hook("tm-match-worker");
    tm_metrics::init_metrics("TM_METRICS_PORT", 9187);

    let cli = Cli::parse();
    let pool = create_pool_from_url_checked(&cli.db_url).await?;
    info!(config_name = %cli.config_name, "created postgres connection pool for match worker");

    if cli.run_migrations {
        run_migrations(&pool).await?;
    }

    loop {
        if let Err(err) = run_pass(&pool, &cli).await {
            // In polling mode a failed pass is retried on the next tick;
            // one-shot runs surface the failure to the caller.
            match cli.poll_interval_secs {
                Some(_) => warn!(error = %err, "batch pass failed"),
                None => return Err(err),
            }
        }

        let Some(interval) = cli.poll_interval_secs else {
            break;
        };
        sleep(Duration::from_secs(interval)).await;
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!(error = %err, "tm-match-worker failed");
        std::process::exit(1);
    }
}

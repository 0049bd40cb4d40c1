pub mod candidates;
pub mod configs;
pub mod match_results;
pub mod migrations;
pub mod pool;
pub mod positions;
pub mod util;

// Keep re-exports unique so downstream crates see a single symbol per helper.
pub use candidates::{
    fetch_candidate, fetch_candidates_by_ids, list_seeking_candidates, CandidateFetchError,
};
pub use configs::{fetch_active_config, save_config, ConfigStorageError};
pub use match_results::{
    attach_analysis, fetch_match_statistics_for_candidate, fetch_match_statistics_for_position,
    fetch_top_matches_for_candidate, fetch_top_matches_for_position, upsert_match_result,
    MatchResultStorageError, MatchStatistics, StoredMatchResult,
};
pub use migrations::{run_migrations, MigrationError};
pub use pool::{create_pool_from_url, create_pool_from_url_checked, DbPoolError, PgPool};
pub use positions::{
    fetch_position, fetch_positions_by_ids, list_open_positions, PositionFetchError,
};

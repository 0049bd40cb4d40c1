pub mod education;
pub mod experience;
pub mod explanation;
pub mod location;
pub mod pipeline;
pub mod scoring;
pub mod skills;
pub mod weights;

pub use education::score_education;
pub use experience::score_experience;
pub use explanation::{build_reasons, build_suggestions};
pub use location::score_location;
pub use pipeline::{rank_candidates_for_position, rank_positions_for_candidate, RankingOptions};
pub use scoring::{compute_match, MatchComputation};
pub use skills::{
    score_skills, BonusSkillEntry, MissingSkillEntry, SkillMatchDetail, SkillScore,
};
pub use weights::{AlgorithmConfig, ConfigError, WEIGHT_SUM_TOLERANCE};

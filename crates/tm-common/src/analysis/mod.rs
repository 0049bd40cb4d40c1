pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::matching::MatchComputation;
use crate::{Candidate, Position};

pub use gemini::GeminiAnalyzer;

/// Qualitative augmentation layered on top of a numeric match result.
/// Always best-effort: the neutral value below is what callers fall back to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysis {
    #[serde(default)]
    pub compatibility_narrative: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub concerns: Vec<String>,
    #[serde(default)]
    pub skill_recommendations: Vec<String>,
    #[serde(default)]
    pub career_advice: String,
    #[serde(default)]
    pub confidence_score: f64,
}

impl MatchAnalysis {
    /// Neutral stand-in recorded when the analyzer is unavailable or failed.
    pub fn unavailable() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.compatibility_narrative.is_empty()
            && self.strengths.is_empty()
            && self.concerns.is_empty()
            && self.skill_recommendations.is_empty()
            && self.career_advice.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("analysis response malformed: {0}")]
    Malformed(String),
    #[error("analysis timed out after {0:?}")]
    Timeout(Duration),
}

/// A narrative-analysis capability. Implementations must be safe to call
/// concurrently; they never see the persistence layer.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    /// Implementation name recorded in logs ("gemini", ...).
    fn name(&self) -> &'static str;

    async fn analyze(
        &self,
        candidate: &Candidate,
        position: &Position,
        computation: &MatchComputation,
    ) -> Result<MatchAnalysis, AnalysisError>;
}

#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    pub enabled: bool,
    pub model: String,
    pub endpoint: String,
    pub api_key: String,
    pub timeout_secs: u64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            model: "gemini-2.5-flash".into(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta/models".into(),
            api_key: String::new(),
            timeout_secs: 10,
        }
    }
}

impl AnalysisConfig {
    pub fn from_env() -> Self {
        fn parse_bool(key: &str, default: bool) -> bool {
            match std::env::var(key) {
                Ok(val) => matches!(val.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
                Err(_) => default,
            }
        }

        fn parse_u64(key: &str, default: u64) -> u64 {
            std::env::var(key)
                .ok()
                .and_then(|raw| raw.parse::<u64>().ok())
                .unwrap_or(default)
        }

        let defaults = Self::default();
        let api_key = std::env::var("TM_ANALYSIS_API_KEY")
            .ok()
            .or_else(|| std::env::var("GOOGLE_AI_API_KEY").ok())
            .unwrap_or_default();

        Self {
            // Without a key the analyzer cannot run regardless of the flag.
            enabled: parse_bool("TM_ANALYSIS_ENABLED", !api_key.is_empty()) && !api_key.is_empty(),
            model: std::env::var("TM_ANALYSIS_MODEL").unwrap_or(defaults.model),
            endpoint: std::env::var("TM_ANALYSIS_ENDPOINT").unwrap_or(defaults.endpoint),
            api_key,
            timeout_secs: parse_u64("TM_ANALYSIS_TIMEOUT_SECONDS", defaults.timeout_secs),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Build the configured analyzer, or `None` when analysis is disabled.
pub fn create_analyzer(config: &AnalysisConfig) -> Option<Box<dyn MatchAnalyzer>> {
    if !config.enabled {
        return None;
    }

    match GeminiAnalyzer::new(config) {
        Ok(analyzer) => Some(Box::new(analyzer)),
        Err(err) => {
            warn!(error = %err, "failed to build analyzer; analysis disabled");
            None
        }
    }
}

/// Run the analyzer inside a hard deadline and absorb every failure mode
/// into the neutral analysis. This wrapper is the only way the scoring
/// pipeline invokes an analyzer, so augmentation can never raise out of it.
pub async fn analyze_or_default(
    analyzer: &dyn MatchAnalyzer,
    timeout: Duration,
    candidate: &Candidate,
    position: &Position,
    computation: &MatchComputation,
) -> MatchAnalysis {
    let outcome = tokio::time::timeout(timeout, analyzer.analyze(candidate, position, computation))
        .await
        .map_err(|_| AnalysisError::Timeout(timeout));

    match outcome {
        Ok(Ok(analysis)) => analysis,
        Ok(Err(err)) | Err(err) => {
            warn!(
                analyzer = analyzer.name(),
                candidate_id = ?computation.candidate_id,
                position_id = ?computation.position_id,
                error = %err,
                "analysis degraded to neutral result"
            );
            MatchAnalysis::unavailable()
        }
    }
}

use std::sync::OnceLock;
use std::time::Instant;

use serde_json::Value;
use tokio_postgres::types::Json;
use tracing::warn;

/// Convert an optional JSON value into a Postgres-compatible wrapper.
pub fn normalize_json(value: &Option<Value>) -> Option<Json<&Value>> {
    value.as_ref().map(Json)
}

/// Decode a JSONB array of strings, dropping non-string elements.
pub fn parse_string_array(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(|v| v.as_str().map(|s| s.to_string()))
            .collect(),
        _ => vec![],
    }
}

fn slow_query_threshold_ms() -> Option<u64> {
    static CACHE: OnceLock<Option<u64>> = OnceLock::new();

    *CACHE.get_or_init(|| {
        std::env::var("TM_DB_LOG_MIN_DURATION_MS")
            .ok()
            .and_then(|raw| raw.parse::<i64>().ok())
            .map(|v| v.max(0) as u64)
            .filter(|v| *v > 0)
    })
}

/// Emit a warning when a labelled query ran longer than the threshold set
/// via `TM_DB_LOG_MIN_DURATION_MS`. No-op when the variable is unset.
pub fn maybe_log_slow_query(label: &str, started_at: Instant) {
    if let Some(threshold_ms) = slow_query_threshold_ms() {
        let elapsed_ms = started_at.elapsed().as_millis() as u64;
        if elapsed_ms >= threshold_ms {
            warn!(query = label, elapsed_ms, "slow_query_detected");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_json_handles_options() {
        let none: Option<Value> = None;
        assert!(normalize_json(&none).is_none());

        let some = Some(json!({"score": 88.0}));
        assert!(normalize_json(&some).is_some());
    }

    #[test]
    fn parse_string_array_filters_non_strings() {
        let value = Some(json!(["Berlin", 42, "Munich", null]));
        assert_eq!(parse_string_array(value), vec!["Berlin", "Munich"]);

        assert!(parse_string_array(None).is_empty());
        assert!(parse_string_array(Some(json!({"not": "an array"}))).is_empty());
    }
}

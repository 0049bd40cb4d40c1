use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Allowed drift of the weight sum away from 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("weight '{field}' of config '{name}' must be non-negative, got {value}")]
    NegativeWeight {
        name: String,
        field: &'static str,
        value: f64,
    },
    #[error("weights of config '{name}' must sum to 1.0 +/- {tolerance}, got {sum:.4}")]
    WeightSum {
        name: String,
        sum: f64,
        tolerance: f64,
    },
}

/// Named weighting of the four match dimensions.
///
/// A config is rejected outright when its weights do not sum to 1.0 within
/// [`WEIGHT_SUM_TOLERANCE`]; it is never silently renormalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmConfig {
    pub name: String,
    pub skill_weight: f64,
    pub experience_weight: f64,
    pub education_weight: f64,
    pub location_weight: f64,
}

impl AlgorithmConfig {
    /// The production default: skills dominate, location matters least.
    pub fn balanced_default() -> Self {
        Self {
            name: "default".to_string(),
            skill_weight: 0.4,
            experience_weight: 0.3,
            education_weight: 0.2,
            location_weight: 0.1,
        }
    }

    pub fn sum(&self) -> f64 {
        self.skill_weight + self.experience_weight + self.education_weight + self.location_weight
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("skill_weight", self.skill_weight),
            ("experience_weight", self.experience_weight),
            ("education_weight", self.education_weight),
            ("location_weight", self.location_weight),
        ] {
            if value < 0.0 {
                return Err(ConfigError::NegativeWeight {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                name: self.name.clone(),
                sum,
                tolerance: WEIGHT_SUM_TOLERANCE,
            });
        }

        Ok(())
    }
}

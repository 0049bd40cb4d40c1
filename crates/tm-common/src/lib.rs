pub mod analysis;
pub mod batch;
pub mod cache;
pub mod db;
pub mod logging;
pub mod matching;
pub mod service;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// Self-reported mastery tier for a candidate skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Proficiency {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl Proficiency {
    /// Multiplier applied to the 0–100 proficiency axis of a skill score.
    pub fn weight(self) -> f64 {
        match self {
            Proficiency::Beginner => 0.3,
            Proficiency::Intermediate => 0.6,
            Proficiency::Advanced => 0.8,
            Proficiency::Expert => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Proficiency::Beginner => "beginner",
            Proficiency::Intermediate => "intermediate",
            Proficiency::Advanced => "advanced",
            Proficiency::Expert => "expert",
        }
    }
}

impl FromStr for Proficiency {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "beginner" => Ok(Proficiency::Beginner),
            "intermediate" => Ok(Proficiency::Intermediate),
            "advanced" => Ok(Proficiency::Advanced),
            "expert" => Ok(Proficiency::Expert),
            other => Err(ParseEnumError {
                kind: "proficiency",
                value: other.to_string(),
            }),
        }
    }
}

/// Position-side classification of how essential a required skill is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Importance {
    Critical,
    Important,
    NiceToHave,
}

impl Importance {
    pub fn weight(self) -> f64 {
        match self {
            Importance::Critical => 3.0,
            Importance::Important => 2.0,
            Importance::NiceToHave => 1.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Importance::Critical => "critical",
            Importance::Important => "important",
            Importance::NiceToHave => "nice_to_have",
        }
    }
}

impl FromStr for Importance {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "critical" => Ok(Importance::Critical),
            "important" => Ok(Importance::Important),
            "nice_to_have" => Ok(Importance::NiceToHave),
            other => Err(ParseEnumError {
                kind: "importance",
                value: other.to_string(),
            }),
        }
    }
}

/// Highest credential a candidate holds, on an ordinal scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    Diploma,
    Bachelor,
    Master,
    Phd,
}

impl EducationLevel {
    pub fn rank(self) -> i32 {
        match self {
            EducationLevel::Diploma => 1,
            EducationLevel::Bachelor => 2,
            EducationLevel::Master => 3,
            EducationLevel::Phd => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EducationLevel::Diploma => "diploma",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Phd => "phd",
        }
    }
}

impl FromStr for EducationLevel {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "diploma" => Ok(EducationLevel::Diploma),
            "bachelor" => Ok(EducationLevel::Bachelor),
            "master" => Ok(EducationLevel::Master),
            "phd" => Ok(EducationLevel::Phd),
            other => Err(ParseEnumError {
                kind: "education level",
                value: other.to_string(),
            }),
        }
    }
}

/// Seniority band a position is advertised at. Drives both the
/// years-of-experience requirement and the derived education requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
    Executive,
}

impl ExperienceLevel {
    pub fn required_years(self) -> f64 {
        match self {
            ExperienceLevel::Entry => 0.0,
            ExperienceLevel::Junior => 1.0,
            ExperienceLevel::Mid => 3.0,
            ExperienceLevel::Senior => 5.0,
            ExperienceLevel::Lead => 8.0,
            ExperienceLevel::Executive => 10.0,
        }
    }

    /// Positions do not carry an explicit education requirement; it is
    /// inferred from the seniority band.
    pub fn required_education_rank(self) -> i32 {
        match self {
            ExperienceLevel::Entry => 1,
            ExperienceLevel::Junior | ExperienceLevel::Mid | ExperienceLevel::Senior => 2,
            ExperienceLevel::Lead | ExperienceLevel::Executive => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
            ExperienceLevel::Executive => "executive",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "entry" => Ok(ExperienceLevel::Entry),
            "junior" => Ok(ExperienceLevel::Junior),
            "mid" => Ok(ExperienceLevel::Mid),
            "senior" => Ok(ExperienceLevel::Senior),
            "lead" => Ok(ExperienceLevel::Lead),
            "executive" => Ok(ExperienceLevel::Executive),
            other => Err(ParseEnumError {
                kind: "experience level",
                value: other.to_string(),
            }),
        }
    }
}

/// Work arrangement offered by a position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteOption {
    #[default]
    OnSite,
    Remote,
    Hybrid,
}

impl RemoteOption {
    pub fn as_str(self) -> &'static str {
        match self {
            RemoteOption::OnSite => "on_site",
            RemoteOption::Remote => "remote",
            RemoteOption::Hybrid => "hybrid",
        }
    }
}

impl FromStr for RemoteOption {
    type Err = ParseEnumError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "on_site" => Ok(RemoteOption::OnSite),
            "remote" => Ok(RemoteOption::Remote),
            "hybrid" => Ok(RemoteOption::Hybrid),
            other => Err(ParseEnumError {
                kind: "remote option",
                value: other.to_string(),
            }),
        }
    }
}

// Commonly used data models for the matching functions. These are plain
// immutable snapshots; the scoring code never sees a persistence handle.

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Candidate {
    pub id: Option<i64>,
    pub display_name: String,
    pub education_level: Option<EducationLevel>,
    pub preferred_locations: Vec<String>,
    pub skills: Vec<CandidateSkill>,
    pub is_seeking: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CandidateSkill {
    pub name: String,
    pub proficiency: Proficiency,
    pub years_of_experience: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Position {
    pub id: Option<i64>,
    pub title: String,
    pub experience_level: ExperienceLevel,
    pub location_city: String,
    pub remote_option: RemoteOption,
    pub required_skills: Vec<RequiredSkill>,
    pub preferred_skills: Vec<PreferredSkill>,
    pub is_open: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequiredSkill {
    pub name: String,
    pub importance: Importance,
    pub min_experience_years: f64,
    /// Position-specific multiplier, 0.1–5.0.
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PreferredSkill {
    pub name: String,
    /// Additive bonus multiplier, 0.1–2.0.
    pub bonus_points: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proficiency_weights_are_monotonic() {
        let tiers = [
            Proficiency::Beginner,
            Proficiency::Intermediate,
            Proficiency::Advanced,
            Proficiency::Expert,
        ];
        assert!(tiers.windows(2).all(|w| w[0].weight() < w[1].weight()));
        assert_eq!(Proficiency::Expert.weight(), 1.0);
    }

    #[test]
    fn enums_round_trip_through_strings() {
        for level in [
            ExperienceLevel::Entry,
            ExperienceLevel::Junior,
            ExperienceLevel::Mid,
            ExperienceLevel::Senior,
            ExperienceLevel::Lead,
            ExperienceLevel::Executive,
        ] {
            assert_eq!(level.as_str().parse::<ExperienceLevel>().unwrap(), level);
        }
        assert_eq!(
            "nice_to_have".parse::<Importance>().unwrap(),
            Importance::NiceToHave
        );
        assert_eq!("on_site".parse::<RemoteOption>().unwrap(), RemoteOption::OnSite);
    }

    #[test]
    fn unknown_variant_is_rejected() {
        let err = "guru".parse::<Proficiency>().unwrap_err();
        assert_eq!(err.kind, "proficiency");
        assert_eq!(err.value, "guru");
    }

    #[test]
    fn derived_education_requirement_follows_seniority() {
        assert_eq!(ExperienceLevel::Entry.required_education_rank(), 1);
        assert_eq!(ExperienceLevel::Senior.required_education_rank(), 2);
        assert_eq!(ExperienceLevel::Executive.required_education_rank(), 3);
    }
}

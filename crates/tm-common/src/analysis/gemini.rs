use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::{AnalysisConfig, AnalysisError, MatchAnalysis, MatchAnalyzer};
use crate::matching::MatchComputation;
use crate::{Candidate, Position};

/// Narrative analyzer backed by the Gemini `generateContent` endpoint.
pub struct GeminiAnalyzer {
    client: reqwest::Client,
    model: String,
    endpoint: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: ResponseContent,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GeminiAnalyzer {
    pub fn new(config: &AnalysisConfig) -> Result<Self, AnalysisError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            client,
            model: config.model.clone(),
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    fn build_prompt(
        candidate: &Candidate,
        position: &Position,
        computation: &MatchComputation,
    ) -> String {
        let skills = candidate
            .skills
            .iter()
            .map(|s| {
                format!(
                    "{} ({}, {:.1}y)",
                    s.name,
                    s.proficiency.as_str(),
                    s.years_of_experience
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        let required = position
            .required_skills
            .iter()
            .map(|r| format!("{} ({})", r.name, r.importance.as_str()))
            .collect::<Vec<_>>()
            .join(", ");
        let missing = computation
            .skill
            .missing
            .iter()
            .map(|m| m.skill_name.as_str())
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "You are a recruitment analyst. A candidate was scored against a position \
             by a deterministic engine; add a qualitative read on top of it.\n\
             Candidate: {name}; education {education}; skills: {skills}.\n\
             Position: {title} ({level}); required skills: {required}.\n\
             Engine result: overall {overall:.1}/100 \
             (skills {skill:.1}, experience {experience:.1}, education {edu:.1}, location {location:.1}); \
             missing skills: {missing}.\n\
             Reply with a single JSON object and nothing else, using exactly these keys: \
             compatibility_narrative (string), strengths (string array), concerns (string array), \
             skill_recommendations (string array), career_advice (string), \
             confidence_score (number between 0 and 1).",
            name = candidate.display_name,
            education = candidate
                .education_level
                .map(|l| l.as_str())
                .unwrap_or("unknown"),
            skills = if skills.is_empty() { "none listed" } else { skills.as_str() },
            title = position.title,
            level = position.experience_level.as_str(),
            required = if required.is_empty() { "none listed" } else { required.as_str() },
            overall = computation.overall_score,
            skill = computation.skill_score,
            experience = computation.experience_score,
            edu = computation.education_score,
            location = computation.location_score,
            missing = if missing.is_empty() { "none" } else { missing.as_str() },
        )
    }

    /// Models routinely wrap JSON in a markdown fence; strip it before
    /// parsing.
    fn extract_json(text: &str) -> &str {
        let trimmed = text.trim();
        let without_open = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        without_open
            .strip_suffix("```")
            .unwrap_or(without_open)
            .trim()
    }

    fn parse_response(body: GenerateContentResponse) -> Result<MatchAnalysis, AnalysisError> {
        let text = body
            .candidates
            .first()
            .and_then(|candidate| candidate.content.parts.first())
            .map(|part| part.text.as_str())
            .ok_or_else(|| AnalysisError::Malformed("response carried no text part".into()))?;

        let mut analysis: MatchAnalysis = serde_json::from_str(Self::extract_json(text))
            .map_err(|err| AnalysisError::Malformed(err.to_string()))?;
        analysis.confidence_score = analysis.confidence_score.clamp(0.0, 1.0);
        Ok(analysis)
    }
}

#[async_trait]
impl MatchAnalyzer for GeminiAnalyzer {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn analyze(
        &self,
        candidate: &Candidate,
        position: &Position,
        computation: &MatchComputation,
    ) -> Result<MatchAnalysis, AnalysisError> {
        let url = format!("{}/{}:generateContent", self.endpoint, self.model);
        let prompt = Self::build_prompt(candidate, position, computation);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{ "parts": [{ "text": prompt }] }]
            }))
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateContentResponse = response.json().await?;
        Self::parse_response(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with_text(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: vec![ResponseCandidate {
                content: ResponseContent {
                    parts: vec![ResponsePart {
                        text: text.to_string(),
                    }],
                },
            }],
        }
    }

    #[test]
    fn parses_plain_json_payload() {
        let body = response_with_text(
            r#"{"compatibility_narrative":"good fit","strengths":["Python"],"confidence_score":0.8}"#,
        );
        let analysis = GeminiAnalyzer::parse_response(body).unwrap();
        assert_eq!(analysis.compatibility_narrative, "good fit");
        assert_eq!(analysis.strengths, vec!["Python"]);
        assert!((analysis.confidence_score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn strips_markdown_fences_before_parsing() {
        let body = response_with_text(
            "```json\n{\"compatibility_narrative\":\"fenced\",\"confidence_score\":2.5}\n```",
        );
        let analysis = GeminiAnalyzer::parse_response(body).unwrap();
        assert_eq!(analysis.compatibility_narrative, "fenced");
        // Out-of-range confidence is clamped, not rejected.
        assert_eq!(analysis.confidence_score, 1.0);
    }

    #[test]
    fn empty_response_is_malformed() {
        let body = GenerateContentResponse { candidates: vec![] };
        let err = GeminiAnalyzer::parse_response(body).unwrap_err();
        assert!(matches!(err, AnalysisError::Malformed(_)));
    }

    #[test]
    fn prompt_names_the_missing_skills() {
        let candidate = Candidate {
            display_name: "Ada".into(),
            ..Candidate::default()
        };
        let position = Position {
            title: "Platform Engineer".into(),
            required_skills: vec![crate::RequiredSkill {
                name: "Kubernetes".into(),
                importance: crate::Importance::Critical,
                min_experience_years: 2.0,
                weight: 1.0,
            }],
            ..Position::default()
        };
        let computation = crate::matching::compute_match(
            &candidate,
            &position,
            &crate::matching::AlgorithmConfig::balanced_default(),
        )
        .unwrap();

        let prompt = GeminiAnalyzer::build_prompt(&candidate, &position, &computation);
        assert!(prompt.contains("Kubernetes"));
        assert!(prompt.contains("missing skills: Kubernetes"));
        assert!(prompt.contains("confidence_score"));
    }
}

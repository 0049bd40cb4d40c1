use crate::Importance;

use super::skills::SkillScore;

/// Build the human-readable reasons a pairing is recommended. Evaluation
/// order is fixed so the output is deterministic for identical inputs.
pub fn build_reasons(
    skill: &SkillScore,
    experience_score: f64,
    education_score: f64,
    location_score: f64,
) -> Vec<String> {
    let mut reasons = Vec::new();

    if skill.score >= 80.0 {
        reasons.push(format!("Skill match is high at {:.1}%", skill.score));
    }

    let matched_ratio = skill.matched_count as f64 / skill.required_count.max(1) as f64;
    if matched_ratio >= 0.8 {
        reasons.push(format!(
            "Meets {}/{} required skills",
            skill.matched_count, skill.required_count
        ));
    }

    if skill.bonus_count > 0 {
        reasons.push(format!("Brings {} bonus skills", skill.bonus_count));
    }

    if experience_score >= 90.0 {
        reasons.push("Work experience fully meets the requirement".to_string());
    } else if experience_score >= 70.0 {
        reasons.push("Work experience largely meets the requirement".to_string());
    }

    if education_score >= 90.0 {
        reasons.push("Educational background fully matches".to_string());
    }

    if location_score >= 90.0 {
        reasons.push("Location fits the position".to_string());
    }

    reasons
}

fn name_top_missing(skill: &SkillScore, importance: Importance) -> Option<String> {
    let names: Vec<&str> = skill
        .missing
        .iter()
        .filter(|entry| entry.importance == importance)
        .take(3)
        .map(|entry| entry.skill_name.as_str())
        .collect();

    if names.is_empty() {
        None
    } else {
        Some(names.join(", "))
    }
}

/// Build improvement suggestions, critical gaps first, then important ones,
/// then a generic nudge when overall skill coverage is weak.
pub fn build_suggestions(skill: &SkillScore) -> Vec<String> {
    let mut suggestions = Vec::new();

    if let Some(names) = name_top_missing(skill, Importance::Critical) {
        suggestions.push(format!("Focus on learning the critical skills: {names}"));
    }

    if let Some(names) = name_top_missing(skill, Importance::Important) {
        suggestions.push(format!("Round out the important skills: {names}"));
    }

    if skill.score < 60.0 {
        suggestions.push(
            "Deepen proficiency in the required skills and gather more project experience"
                .to_string(),
        );
    }

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::skills::MissingSkillEntry;

    fn missing(name: &str, importance: Importance) -> MissingSkillEntry {
        MissingSkillEntry {
            skill_name: name.into(),
            importance,
            min_experience_years: 0.0,
        }
    }

    #[test]
    fn strong_match_collects_every_reason() {
        let skill = SkillScore {
            score: 92.0,
            required_count: 5,
            matched_count: 5,
            bonus_count: 2,
            ..SkillScore::default()
        };

        let reasons = build_reasons(&skill, 95.0, 100.0, 100.0);
        assert_eq!(reasons.len(), 6);
        assert!(reasons[0].contains("92.0%"));
        assert_eq!(reasons[1], "Meets 5/5 required skills");
        assert_eq!(reasons[2], "Brings 2 bonus skills");
    }

    #[test]
    fn middling_experience_gets_the_softer_reason() {
        let skill = SkillScore::default();
        let reasons = build_reasons(&skill, 75.0, 50.0, 50.0);
        assert_eq!(reasons, vec!["Work experience largely meets the requirement"]);
    }

    #[test]
    fn weak_match_yields_no_reasons() {
        let skill = SkillScore {
            score: 30.0,
            required_count: 4,
            matched_count: 1,
            ..SkillScore::default()
        };
        assert!(build_reasons(&skill, 40.0, 50.0, 20.0).is_empty());
    }

    #[test]
    fn critical_gaps_are_suggested_before_important_ones() {
        let skill = SkillScore {
            score: 45.0,
            missing: vec![
                missing("Kubernetes", Importance::Important),
                missing("Rust", Importance::Critical),
                missing("Terraform", Importance::Critical),
            ],
            ..SkillScore::default()
        };

        let suggestions = build_suggestions(&skill);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("critical"));
        assert!(suggestions[0].contains("Rust, Terraform"));
        assert!(suggestions[1].contains("Kubernetes"));
        assert!(suggestions[2].contains("proficiency"));
    }

    #[test]
    fn missing_lists_are_capped_at_three_names() {
        let skill = SkillScore {
            score: 90.0,
            missing: (0..5)
                .map(|i| missing(&format!("skill-{i}"), Importance::Critical))
                .collect(),
            ..SkillScore::default()
        };

        let suggestions = build_suggestions(&skill);
        assert_eq!(suggestions.len(), 1);
        assert!(suggestions[0].contains("skill-0, skill-1, skill-2"));
        assert!(!suggestions[0].contains("skill-3"));
    }

    #[test]
    fn nothing_to_suggest_for_a_complete_match() {
        let skill = SkillScore {
            score: 88.0,
            required_count: 2,
            matched_count: 2,
            ..SkillScore::default()
        };
        assert!(build_suggestions(&skill).is_empty());
    }
}

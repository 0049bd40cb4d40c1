use crate::{Candidate, Position, RemoteOption};

/// A candidate with no stated preference is scored neutrally rather than
/// penalized for indifference.
const NO_PREFERENCE_SCORE: f64 = 60.0;
const MISMATCH_SCORE: f64 = 20.0;

/// Score geographic fit. Remote and hybrid positions make location
/// irrelevant; otherwise the position's city is checked against the
/// candidate's preferred locations.
pub fn score_location(candidate: &Candidate, position: &Position) -> f64 {
    if matches!(
        position.remote_option,
        RemoteOption::Remote | RemoteOption::Hybrid
    ) {
        return 100.0;
    }

    if candidate
        .preferred_locations
        .iter()
        .any(|city| city == &position.location_city)
    {
        return 100.0;
    }

    if candidate.preferred_locations.is_empty() {
        return NO_PREFERENCE_SCORE;
    }

    MISMATCH_SCORE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate_preferring(cities: &[&str]) -> Candidate {
        Candidate {
            preferred_locations: cities.iter().map(|c| c.to_string()).collect(),
            ..Candidate::default()
        }
    }

    fn onsite_in(city: &str) -> Position {
        Position {
            location_city: city.into(),
            remote_option: RemoteOption::OnSite,
            ..Position::default()
        }
    }

    #[test]
    fn remote_positions_ignore_location() {
        let position = Position {
            location_city: "Berlin".into(),
            remote_option: RemoteOption::Remote,
            ..Position::default()
        };
        assert_eq!(score_location(&candidate_preferring(&["Lisbon"]), &position), 100.0);
        assert_eq!(score_location(&candidate_preferring(&[]), &position), 100.0);
    }

    #[test]
    fn hybrid_positions_ignore_location() {
        let position = Position {
            location_city: "Berlin".into(),
            remote_option: RemoteOption::Hybrid,
            ..Position::default()
        };
        assert_eq!(score_location(&candidate_preferring(&["Lisbon"]), &position), 100.0);
    }

    #[test]
    fn preferred_city_matches() {
        let score = score_location(
            &candidate_preferring(&["Berlin", "Munich"]),
            &onsite_in("Munich"),
        );
        assert_eq!(score, 100.0);
    }

    #[test]
    fn no_preferences_score_neutrally() {
        assert_eq!(
            score_location(&candidate_preferring(&[]), &onsite_in("Berlin")),
            60.0
        );
    }

    #[test]
    fn explicit_mismatch_is_penalized() {
        assert_eq!(
            score_location(&candidate_preferring(&["Lisbon"]), &onsite_in("Berlin")),
            20.0
        );
    }
}

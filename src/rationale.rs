//! Human-readable explanations for scored candidates

use crate::domain::{FactorWeight, Game, Rationale, Side};
use crate::features::FeatureVector;
use crate::scoring::ScoredCandidate;

const TOP_FACTORS: usize = 3;
const FILLER_FACTORS: [&str; 3] = ["Advanced Analytics", "Statistical Modeling", "Market Analysis"];

const STRONG_FORM: f64 = 0.6;
const WEATHER_NOTE_THRESHOLD: f64 = -0.05;
const INJURY_NOTE_THRESHOLD: f64 = -0.1;

/// Display label for a feature or importance name
pub fn humanize_feature_name(name: &str) -> String {
    let label = match name {
        "odds_value" => "Betting Odds Analysis",
        "odds_movement" => "Line Movement",
        "market_efficiency" => "Market Conditions",
        "home_win_rate" => "Home Team Record",
        "away_win_rate" => "Away Team Record",
        "recent_form_home" => "Home Team Form",
        "recent_form_away" => "Away Team Form",
        "head_to_head_record" => "Head-to-Head History",
        "weather_impact" => "Weather Conditions",
        "injury_impact" => "Injury Reports",
        "rest_days_home" => "Rest Advantage",
        "travel_distance" => "Travel Factors",
        other => return title_case(other),
    };
    label.to_string()
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Risk bucket from confidence and expected value
pub fn risk_assessment(confidence: f64, expected_value: f64) -> &'static str {
    if confidence > 80.0 && expected_value > 0.1 {
        "Low risk - High confidence with strong expected value"
    } else if confidence > 70.0 && expected_value > 0.05 {
        "Moderate risk - Good confidence with positive expected value"
    } else if confidence > 60.0 {
        "Moderate risk - Acceptable confidence level"
    } else {
        "Higher risk - Lower confidence, proceed with caution"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RationaleBuilder;

impl RationaleBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(
        &self,
        candidate: &ScoredCandidate,
        game: &Game,
        features: &FeatureVector,
    ) -> Rationale {
        let ranked = ranked_importance(&candidate.feature_importance);
        let mut top_factors: Vec<String> = ranked
            .iter()
            .take(TOP_FACTORS)
            .map(|f| humanize_feature_name(&f.name))
            .collect();
        for filler in FILLER_FACTORS {
            if top_factors.len() >= TOP_FACTORS {
                break;
            }
            top_factors.push(filler.to_string());
        }

        let team = game.team(candidate.side);
        let (own_form, own_weighted) = match candidate.side {
            Side::Home => (features.recent_form_home, features.home_weighted_form),
            Side::Away => (features.recent_form_away, features.away_weighted_form),
        };
        let strong_form = own_form > STRONG_FORM || own_weighted > STRONG_FORM;

        let mut parts = vec![format!(
            "ML model recommends {} based on comprehensive analysis.",
            team
        )];
        if strong_form {
            parts.push(match candidate.side {
                Side::Home => "Home team shows strong recent form.".to_string(),
                Side::Away => "Away team demonstrates excellent recent performance.".to_string(),
            });
        }
        if features.weather_impact < WEATHER_NOTE_THRESHOLD {
            parts.push("Weather conditions may impact game dynamics.".to_string());
        }
        if features.injury_impact < INJURY_NOTE_THRESHOLD {
            parts.push("Key injuries considered in the analysis.".to_string());
        }
        parts.push(format!("Key factors include {}.", top_factors.join(", ")));

        Rationale {
            reasoning: parts.join(" "),
            top_factors,
            risk_assessment: risk_assessment(candidate.confidence, candidate.expected_value)
                .to_string(),
            confidence_factors: ranked.into_iter().take(TOP_FACTORS).collect(),
            key_insights: key_insights(candidate, features, own_form.max(own_weighted)),
        }
    }
}

fn ranked_importance(importance: &[FactorWeight]) -> Vec<FactorWeight> {
    let mut ranked = importance.to_vec();
    // Stable: equal weights keep the strategy's order
    ranked.sort_by(|a, b| b.weight.total_cmp(&a.weight));
    ranked
}

fn key_insights(candidate: &ScoredCandidate, features: &FeatureVector, form: f64) -> Vec<String> {
    let mut insights = Vec::new();
    let label = match candidate.side {
        Side::Home => "Home",
        Side::Away => "Away",
    };

    if form > STRONG_FORM {
        insights.push(format!("{} team showing {:.1}% recent form", label, form * 100.0));
    }

    let matchup_edge = match candidate.side {
        Side::Home => features.offensive_matchup_advantage,
        Side::Away => features.defensive_matchup_advantage,
    };
    if matchup_edge > 5.0 {
        insights.push("Favorable offensive vs defensive matchup".to_string());
    }

    if (features.home_injury_impact - features.away_injury_impact).abs() > 0.05 {
        insights.push("Significant injury advantage identified".to_string());
    }

    if candidate.expected_value > 0.05 {
        insights.push(format!(
            "Strong value bet with {:.1}% expected return",
            candidate.expected_value * 100.0
        ));
    }

    if candidate.scoring_fallback {
        insights.push("Conservative default applied after a scoring error".to_string());
    }

    if features.is_degraded() {
        let groups: Vec<&str> = features.degraded.iter().map(|g| g.as_str()).collect();
        insights.push(format!("Limited data: {} defaulted", groups.join(", ")));
    }

    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::League;
    use crate::features::FeatureGroup;
    use chrono::Utc;

    fn candidate(side: Side, confidence: f64, ev: f64, importance: Vec<FactorWeight>) -> ScoredCandidate {
        ScoredCandidate {
            game_index: 0,
            side,
            team: String::new(),
            odds: Some(-110.0),
            win_probability: confidence / 100.0,
            confidence,
            expected_value: ev,
            feature_importance: importance,
            model_version: "test".into(),
            scoring_fallback: false,
            rationale: None,
        }
    }

    fn game() -> Game {
        Game::new("Chiefs", "Bills", League::NFL, Utc::now())
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize_feature_name("odds_value"), "Betting Odds Analysis");
        assert_eq!(humanize_feature_name("travel_distance"), "Travel Factors");
        assert_eq!(humanize_feature_name("team_efficiency"), "Team Efficiency");
        assert_eq!(humanize_feature_name("home_advantage"), "Home Advantage");
    }

    #[test]
    fn test_risk_buckets() {
        assert!(risk_assessment(85.0, 0.15).starts_with("Low risk"));
        assert!(risk_assessment(85.0, 0.02).contains("Acceptable"));
        assert!(risk_assessment(75.0, 0.06).contains("Good confidence"));
        assert!(risk_assessment(55.0, 0.5).starts_with("Higher risk"));
    }

    #[test]
    fn test_top_factors_padded() {
        let c = candidate(
            Side::Home,
            58.0,
            0.0,
            vec![FactorWeight::new("team_strength", 0.6), FactorWeight::new("odds_value", 0.4)],
        );
        let r = RationaleBuilder::new().build(&c, &game(), &FeatureVector::default());
        assert_eq!(
            r.top_factors,
            vec!["Team Strength", "Betting Odds Analysis", "Advanced Analytics"]
        );
        assert_eq!(r.confidence_factors.len(), 2);
        assert!(r.reasoning.starts_with("ML model recommends Chiefs"));
        assert!(r.reasoning.ends_with("Key factors include Team Strength, Betting Odds Analysis, Advanced Analytics."));
    }

    #[test]
    fn test_top_factors_ranked_by_weight() {
        let c = candidate(
            Side::Away,
            70.0,
            0.0,
            vec![
                FactorWeight::new("injury_impact", 0.10),
                FactorWeight::new("team_efficiency", 0.25),
                FactorWeight::new("recent_form", 0.25),
                FactorWeight::new("market_value", 0.10),
            ],
        );
        let r = RationaleBuilder::new().build(&c, &game(), &FeatureVector::default());
        assert_eq!(
            r.top_factors,
            vec!["Team Efficiency", "Recent Form", "Injury Reports"]
        );
    }

    #[test]
    fn test_notes_and_insights() {
        let fv = FeatureVector {
            recent_form_away: 0.8,
            weather_impact: -0.15,
            injury_impact: -0.225,
            home_injury_impact: -0.2,
            degraded: [FeatureGroup::Weather].into_iter().collect(),
            ..Default::default()
        };
        let c = candidate(Side::Away, 72.0, 0.08, Vec::new());
        let r = RationaleBuilder::new().build(&c, &game(), &fv);

        assert!(r.reasoning.contains("Bills"));
        assert!(r.reasoning.contains("Away team demonstrates excellent recent performance."));
        assert!(r.reasoning.contains("Weather conditions"));
        assert!(r.reasoning.contains("Key injuries"));
        assert_eq!(r.top_factors.len(), 3);
        assert!(r.key_insights.contains(&"Away team showing 80.0% recent form".to_string()));
        assert!(r.key_insights.contains(&"Strong value bet with 8.0% expected return".to_string()));
        assert!(r.key_insights.contains(&"Significant injury advantage identified".to_string()));
        assert!(r.key_insights.iter().any(|i| i.contains("weather defaulted")));
        assert!(r.risk_assessment.contains("Good confidence"));
    }
}

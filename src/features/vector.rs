//! Fixed-schema feature record
//!
//! Every field has a neutral default so a game with no supporting data still
//! produces a complete vector. `degraded` lists the groups that fell back to
//! those defaults because their computation failed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::FeatureGroup;
use crate::error::ScoringError;

/// Default input order for trained models
pub const MODEL_FEATURES: [&str; 16] = [
    "odds_value",
    "odds_movement",
    "market_efficiency",
    "home_win_rate",
    "away_win_rate",
    "head_to_head_record",
    "recent_form_home",
    "recent_form_away",
    "rest_days_home",
    "rest_days_away",
    "travel_distance",
    "weather_impact",
    "strength_of_schedule",
    "injury_impact",
    "motivation_factor",
    "home_indicator",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    // Odds
    pub odds_value: f64,
    pub odds_movement: f64,
    pub line_movement_significance: f64,
    pub market_efficiency: f64,
    pub home_implied_probability: f64,
    pub away_implied_probability: f64,

    // Team records
    pub home_win_rate: f64,
    pub away_win_rate: f64,
    pub recent_form_home: f64,
    pub recent_form_away: f64,
    pub head_to_head_record: f64,

    // Efficiency
    pub home_offensive_rating: f64,
    pub home_defensive_rating: f64,
    pub away_offensive_rating: f64,
    pub away_defensive_rating: f64,
    pub home_net_rating: f64,
    pub away_net_rating: f64,
    pub home_pace: f64,
    pub away_pace: f64,
    pub offensive_matchup_advantage: f64,
    pub defensive_matchup_advantage: f64,
    pub pace_differential: f64,

    // Form
    pub home_weighted_form: f64,
    pub away_weighted_form: f64,
    pub home_form_trend: f64,
    pub away_form_trend: f64,
    pub home_clutch_performance: f64,
    pub away_clutch_performance: f64,
    pub home_blowout_tendency: f64,
    pub away_blowout_tendency: f64,

    // Schedule
    pub home_sos_past: f64,
    pub away_sos_past: f64,
    pub home_sos_future: f64,
    pub away_sos_future: f64,
    pub home_record_vs_quality: f64,
    pub away_record_vs_quality: f64,
    pub rest_days_home: f64,
    pub rest_days_away: f64,

    // Venue
    pub travel_distance: f64,
    pub altitude_impact: f64,

    // Weather
    pub weather_impact: f64,

    // Injuries
    pub injury_impact: f64,
    pub home_injury_impact: f64,
    pub away_injury_impact: f64,

    // Placeholders, not derived from data yet
    pub motivation_factor: f64,
    pub revenge_game_factor: f64,
    pub playoff_implications: f64,
    pub sharp_money_indicator: f64,
    pub public_betting_percentage: f64,

    /// Groups replaced by defaults
    #[serde(default)]
    pub degraded: BTreeSet<FeatureGroup>,
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self {
            odds_value: 0.0,
            odds_movement: 0.0,
            line_movement_significance: 0.0,
            market_efficiency: 1.0,
            home_implied_probability: 0.5,
            away_implied_probability: 0.5,

            home_win_rate: 0.5,
            away_win_rate: 0.5,
            recent_form_home: 0.5,
            recent_form_away: 0.5,
            head_to_head_record: 0.5,

            home_offensive_rating: 100.0,
            home_defensive_rating: 100.0,
            away_offensive_rating: 100.0,
            away_defensive_rating: 100.0,
            home_net_rating: 0.0,
            away_net_rating: 0.0,
            home_pace: 100.0,
            away_pace: 100.0,
            offensive_matchup_advantage: 0.0,
            defensive_matchup_advantage: 0.0,
            pace_differential: 0.0,

            home_weighted_form: 0.5,
            away_weighted_form: 0.5,
            home_form_trend: 0.0,
            away_form_trend: 0.0,
            home_clutch_performance: 0.5,
            away_clutch_performance: 0.5,
            home_blowout_tendency: 0.5,
            away_blowout_tendency: 0.5,

            home_sos_past: 0.5,
            away_sos_past: 0.5,
            home_sos_future: 0.5,
            away_sos_future: 0.5,
            home_record_vs_quality: 0.5,
            away_record_vs_quality: 0.5,
            rest_days_home: 3.0,
            rest_days_away: 3.0,

            travel_distance: 0.0,
            altitude_impact: 0.0,

            weather_impact: 0.0,

            injury_impact: 0.0,
            home_injury_impact: 0.0,
            away_injury_impact: 0.0,

            motivation_factor: 0.0,
            revenge_game_factor: 0.0,
            playoff_implications: 0.0,
            sharp_money_indicator: 0.0,
            public_betting_percentage: 0.5,

            degraded: BTreeSet::new(),
        }
    }
}

impl FeatureVector {
    /// All numeric fields with their names, in schema order
    pub fn named_values(&self) -> Vec<(&'static str, f64)> {
        vec![
            ("odds_value", self.odds_value),
            ("odds_movement", self.odds_movement),
            ("line_movement_significance", self.line_movement_significance),
            ("market_efficiency", self.market_efficiency),
            ("home_implied_probability", self.home_implied_probability),
            ("away_implied_probability", self.away_implied_probability),
            ("home_win_rate", self.home_win_rate),
            ("away_win_rate", self.away_win_rate),
            ("recent_form_home", self.recent_form_home),
            ("recent_form_away", self.recent_form_away),
            ("head_to_head_record", self.head_to_head_record),
            ("home_offensive_rating", self.home_offensive_rating),
            ("home_defensive_rating", self.home_defensive_rating),
            ("away_offensive_rating", self.away_offensive_rating),
            ("away_defensive_rating", self.away_defensive_rating),
            ("home_net_rating", self.home_net_rating),
            ("away_net_rating", self.away_net_rating),
            ("home_pace", self.home_pace),
            ("away_pace", self.away_pace),
            ("offensive_matchup_advantage", self.offensive_matchup_advantage),
            ("defensive_matchup_advantage", self.defensive_matchup_advantage),
            ("pace_differential", self.pace_differential),
            ("home_weighted_form", self.home_weighted_form),
            ("away_weighted_form", self.away_weighted_form),
            ("home_form_trend", self.home_form_trend),
            ("away_form_trend", self.away_form_trend),
            ("home_clutch_performance", self.home_clutch_performance),
            ("away_clutch_performance", self.away_clutch_performance),
            ("home_blowout_tendency", self.home_blowout_tendency),
            ("away_blowout_tendency", self.away_blowout_tendency),
            ("home_sos_past", self.home_sos_past),
            ("away_sos_past", self.away_sos_past),
            ("home_sos_future", self.home_sos_future),
            ("away_sos_future", self.away_sos_future),
            ("home_record_vs_quality", self.home_record_vs_quality),
            ("away_record_vs_quality", self.away_record_vs_quality),
            ("rest_days_home", self.rest_days_home),
            ("rest_days_away", self.rest_days_away),
            ("travel_distance", self.travel_distance),
            ("altitude_impact", self.altitude_impact),
            ("weather_impact", self.weather_impact),
            ("injury_impact", self.injury_impact),
            ("home_injury_impact", self.home_injury_impact),
            ("away_injury_impact", self.away_injury_impact),
            ("motivation_factor", self.motivation_factor),
            ("revenge_game_factor", self.revenge_game_factor),
            ("playoff_implications", self.playoff_implications),
            ("sharp_money_indicator", self.sharp_money_indicator),
            ("public_betting_percentage", self.public_betting_percentage),
        ]
    }

    /// Look up a feature by name.
    ///
    /// Also resolves the model aliases `strength_of_schedule` (home past SOS)
    /// and `home_indicator` (always 1.0, features are home-oriented).
    pub fn get(&self, name: &str) -> Option<f64> {
        match name {
            "strength_of_schedule" => Some(self.home_sos_past),
            "home_indicator" => Some(1.0),
            _ => self
                .named_values()
                .into_iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v),
        }
    }

    /// Ordered model input for the given feature names
    pub fn model_input<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> std::result::Result<Vec<f64>, ScoringError> {
        names
            .iter()
            .map(|n| {
                self.get(n.as_ref())
                    .ok_or_else(|| ScoringError::MissingFeature(n.as_ref().to_string()))
            })
            .collect()
    }

    pub fn is_degraded(&self) -> bool {
        !self.degraded.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_neutral() {
        let fv = FeatureVector::default();
        assert_eq!(fv.home_win_rate, 0.5);
        assert_eq!(fv.home_offensive_rating, 100.0);
        assert_eq!(fv.rest_days_home, 3.0);
        assert_eq!(fv.injury_impact, 0.0);
        assert!(!fv.is_degraded());
        assert!(fv.named_values().len() >= 45);
    }

    #[test]
    fn test_model_input_order() {
        let fv = FeatureVector {
            odds_value: -120.0,
            home_sos_past: 0.7,
            ..Default::default()
        };
        let input = fv.model_input(&MODEL_FEATURES).unwrap();
        assert_eq!(input.len(), 16);
        assert_eq!(input[0], -120.0);
        assert_eq!(input[12], 0.7);
        assert_eq!(input[15], 1.0);
    }

    #[test]
    fn test_model_input_unknown_feature() {
        let fv = FeatureVector::default();
        let err = fv.model_input(&["elo_rating"]).unwrap_err();
        assert_eq!(err, ScoringError::MissingFeature("elo_rating".into()));
    }
}

//! Rule-based scoring strategies

use super::{ScoringInput, ScoringStrategy, StrategyOutput};
use crate::config::ScoringConfig;
use crate::domain::{model_version, FactorWeight, League, Side};
use crate::error::ScoringError;

/// Win-rate differential model.
///
/// Always scores from the home team's perspective regardless of side; the
/// legacy selection path depends on that.
#[derive(Debug, Clone, Default)]
pub struct Heuristic;

impl Heuristic {
    pub const CONFIDENCE: f64 = 40.0;
}

impl ScoringStrategy for Heuristic {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn model_version(&self) -> &str {
        model_version::HEURISTIC
    }

    fn evaluate(&self, input: &ScoringInput<'_>) -> Result<StrategyOutput, ScoringError> {
        let f = input.features;
        let p = (0.5 + (f.home_win_rate - f.away_win_rate) * 0.3).clamp(0.1, 0.9);
        if !p.is_finite() {
            return Err(ScoringError::InvalidProbability(p));
        }
        Ok(StrategyOutput {
            win_probability: p,
            confidence: Self::CONFIDENCE,
            feature_importance: vec![
                FactorWeight::new("team_strength", 0.6),
                FactorWeight::new("odds_value", 0.4),
            ],
        })
    }
}

/// Confidence bonus or penalty driven by the size of the price
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OddsBand {
    pub penalty_threshold: f64,
    pub sweet_spot: [f64; 2],
    pub adjustment: f64,
}

impl Default for OddsBand {
    fn default() -> Self {
        Self {
            penalty_threshold: 200.0,
            sweet_spot: [100.0, 150.0],
            adjustment: 5.0,
        }
    }
}

impl OddsBand {
    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            penalty_threshold: config.odds_penalty_threshold,
            sweet_spot: config.odds_sweet_spot,
            adjustment: config.odds_band_adjustment,
        }
    }

    pub fn adjust(&self, odds: f64) -> f64 {
        let abs = odds.abs();
        if abs > self.penalty_threshold {
            -self.adjustment
        } else if abs >= self.sweet_spot[0] && abs <= self.sweet_spot[1] {
            self.adjustment
        } else {
            0.0
        }
    }
}

/// Venues worth an extra point of home-field advantage
const HOSTILE_VENUES: [&str; 3] = ["arrowhead", "lambeau", "centurylink"];

pub fn home_field_advantage(league: League, venue: Option<&str>) -> f64 {
    let base = match league {
        League::NFL => 3.0,
        League::NBA => 2.5,
        League::MLB | League::NHL => 2.0,
    };
    let hostile = venue
        .map(|v| {
            let lower = v.to_ascii_lowercase();
            HOSTILE_VENUES.iter().any(|h| lower.contains(h))
        })
        .unwrap_or(false);
    if hostile {
        base + 1.0
    } else {
        base
    }
}

/// Multi-factor confidence model used by the production selection path
#[derive(Debug, Clone, Default)]
pub struct WeightedHeuristic {
    band: OddsBand,
}

impl WeightedHeuristic {
    pub const MIN_CONFIDENCE: f64 = 50.0;
    pub const MAX_CONFIDENCE: f64 = 95.0;

    pub fn new(band: OddsBand) -> Self {
        Self { band }
    }

    pub fn confidence(&self, input: &ScoringInput<'_>) -> f64 {
        let f = input.features;
        let hfa = home_field_advantage(input.game.league, input.game.venue.as_deref());

        let (home_field, own_off, opp_def, own_form, opp_form, own_inj, opp_inj) = match input.side
        {
            Side::Home => (
                hfa,
                f.home_offensive_rating,
                f.away_defensive_rating,
                f.home_weighted_form,
                f.away_weighted_form,
                f.home_injury_impact,
                f.away_injury_impact,
            ),
            Side::Away => (
                -hfa,
                f.away_offensive_rating,
                f.home_defensive_rating,
                f.away_weighted_form,
                f.home_weighted_form,
                f.away_injury_impact,
                f.home_injury_impact,
            ),
        };

        let mut confidence = 50.0 + home_field;
        confidence += (own_off - opp_def) / 10.0 * 2.0;
        confidence += (own_form - opp_form) * 20.0;
        confidence += (own_inj - opp_inj) * 10.0;
        confidence += f.weather_impact * 5.0;
        confidence += self.band.adjust(input.odds);

        confidence.clamp(Self::MIN_CONFIDENCE, Self::MAX_CONFIDENCE)
    }

    fn importance(side: Side) -> Vec<FactorWeight> {
        match side {
            Side::Home => vec![
                FactorWeight::new("team_efficiency", 0.25),
                FactorWeight::new("recent_form", 0.20),
                FactorWeight::new("home_advantage", 0.15),
                FactorWeight::new("matchup_analysis", 0.15),
                FactorWeight::new("injury_impact", 0.10),
                FactorWeight::new("weather_conditions", 0.05),
                FactorWeight::new("market_value", 0.10),
            ],
            Side::Away => vec![
                FactorWeight::new("team_efficiency", 0.25),
                FactorWeight::new("recent_form", 0.25),
                FactorWeight::new("road_performance", 0.15),
                FactorWeight::new("matchup_analysis", 0.15),
                FactorWeight::new("injury_impact", 0.10),
                FactorWeight::new("market_value", 0.10),
            ],
        }
    }
}

impl ScoringStrategy for WeightedHeuristic {
    fn name(&self) -> &'static str {
        "weighted_heuristic"
    }

    fn model_version(&self) -> &str {
        model_version::WEIGHTED
    }

    fn evaluate(&self, input: &ScoringInput<'_>) -> Result<StrategyOutput, ScoringError> {
        let confidence = self.confidence(input);
        if !confidence.is_finite() {
            return Err(ScoringError::Inference(format!(
                "non-finite confidence for {} side",
                input.side
            )));
        }
        Ok(StrategyOutput {
            win_probability: confidence / 100.0,
            confidence,
            feature_importance: Self::importance(input.side),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Game;
    use crate::features::FeatureVector;
    use chrono::Utc;

    fn input<'a>(game: &'a Game, features: &'a FeatureVector, side: Side) -> ScoringInput<'a> {
        ScoringInput {
            game,
            features,
            side,
            odds: game.moneyline(side).unwrap_or(0.0),
        }
    }

    #[test]
    fn test_heuristic_ignores_side() {
        let game = Game::new("H", "A", League::NBA, Utc::now()).with_moneyline(-150.0, 130.0);
        let fv = FeatureVector {
            home_win_rate: 0.8,
            away_win_rate: 0.4,
            ..Default::default()
        };
        let home = Heuristic.evaluate(&input(&game, &fv, Side::Home)).unwrap();
        let away = Heuristic.evaluate(&input(&game, &fv, Side::Away)).unwrap();
        assert!((home.win_probability - 0.62).abs() < 1e-9);
        assert_eq!(home.win_probability, away.win_probability);
        assert_eq!(home.confidence, 40.0);
        assert_eq!(home.feature_importance[0].name, "team_strength");
    }

    #[test]
    fn test_heuristic_clamps() {
        let game = Game::new("H", "A", League::NBA, Utc::now());
        let fv = FeatureVector {
            home_win_rate: 5.0,
            away_win_rate: 0.0,
            ..Default::default()
        };
        let out = Heuristic.evaluate(&input(&game, &fv, Side::Home)).unwrap();
        assert_eq!(out.win_probability, 0.9);
    }

    #[test]
    fn test_weighted_home_and_away_baseline() {
        let game = Game::new("Chiefs", "Bills", League::NFL, Utc::now()).with_moneyline(-120.0, 100.0);
        let fv = FeatureVector::default();
        let model = WeightedHeuristic::default();

        // 50 + 3 home field + 5 sweet spot
        assert_eq!(model.confidence(&input(&game, &fv, Side::Home)), 58.0);
        // 50 - 3 + 5
        assert_eq!(model.confidence(&input(&game, &fv, Side::Away)), 52.0);
    }

    #[test]
    fn test_weighted_hostile_venue_and_penalty() {
        let game = Game::new("Chiefs", "Bills", League::NFL, Utc::now())
            .with_moneyline(-250.0, 210.0)
            .with_venue("GEHA Field at Arrowhead Stadium");
        let fv = FeatureVector {
            home_offensive_rating: 120.0,
            ..Default::default()
        };
        let model = WeightedHeuristic::default();
        // 50 + 4 + 4 - 5
        assert_eq!(model.confidence(&input(&game, &fv, Side::Home)), 53.0);
    }

    #[test]
    fn test_weighted_confidence_bounds() {
        let game = Game::new("H", "A", League::NBA, Utc::now()).with_moneyline(-120.0, 100.0);
        let strong = FeatureVector {
            home_offensive_rating: 200.0,
            home_weighted_form: 1.0,
            away_weighted_form: 0.0,
            ..Default::default()
        };
        let model = WeightedHeuristic::default();
        let home = model.evaluate(&input(&game, &strong, Side::Home)).unwrap();
        let away = model.evaluate(&input(&game, &strong, Side::Away)).unwrap();
        assert_eq!(home.confidence, 95.0);
        assert_eq!(away.confidence, 50.0);
        assert_eq!(home.win_probability, 0.95);
        assert_eq!(away.feature_importance[2].name, "road_performance");
    }

    #[test]
    fn test_odds_band() {
        let band = OddsBand::default();
        assert_eq!(band.adjust(-110.0), 5.0);
        assert_eq!(band.adjust(150.0), 5.0);
        assert_eq!(band.adjust(-175.0), 0.0);
        assert_eq!(band.adjust(-201.0), -5.0);
        assert_eq!(band.adjust(95.0), 0.0);
    }
}

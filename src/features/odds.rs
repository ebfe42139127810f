//! Market features derived from moneyline prices

use super::ensure_finite;
use crate::domain::{Game, AWAY_ML, AWAY_ML_OPEN, HOME_ML, HOME_ML_OPEN};
use crate::error::FeatureError;

/// Implied win probability of an American price.
///
/// Zero and non-finite prices carry no information and map to 0.5.
pub fn odds_to_probability(odds: f64) -> f64 {
    if odds == 0.0 || !odds.is_finite() {
        return 0.5;
    }
    if odds > 0.0 {
        100.0 / (odds + 100.0)
    } else {
        let abs = odds.abs();
        abs / (abs + 100.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OddsFeatures {
    pub odds_value: f64,
    pub odds_movement: f64,
    pub line_movement_significance: f64,
    pub market_efficiency: f64,
    pub home_implied_probability: f64,
    pub away_implied_probability: f64,
}

impl Default for OddsFeatures {
    fn default() -> Self {
        Self {
            odds_value: 0.0,
            odds_movement: 0.0,
            line_movement_significance: 0.0,
            market_efficiency: 1.0,
            home_implied_probability: 0.5,
            away_implied_probability: 0.5,
        }
    }
}

pub fn compute(game: &Game) -> Result<OddsFeatures, FeatureError> {
    let (home_ml, away_ml) = match (game.odds.get(HOME_ML), game.odds.get(AWAY_ML)) {
        (Some(h), Some(a)) => (*h, *a),
        _ => return Ok(OddsFeatures::default()),
    };

    let home_prob = odds_to_probability(ensure_finite("home_ml", home_ml)?);
    let away_prob = odds_to_probability(ensure_finite("away_ml", away_ml)?);

    let odds_movement = match game.odds.get(HOME_ML_OPEN) {
        Some(open) => home_ml - ensure_finite(HOME_ML_OPEN, *open)?,
        None => 0.0,
    };
    if let Some(open) = game.odds.get(AWAY_ML_OPEN) {
        ensure_finite(AWAY_ML_OPEN, *open)?;
    }

    Ok(OddsFeatures {
        odds_value: home_ml,
        odds_movement,
        line_movement_significance: (odds_movement.abs() / 50.0).min(1.0),
        market_efficiency: home_prob + away_prob,
        home_implied_probability: home_prob,
        away_implied_probability: away_prob,
    })
}

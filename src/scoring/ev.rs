//! Expected value of a moneyline stake

use crate::error::ScoringError;

/// Profit per unit staked if the bet wins
pub fn decimal_payout(odds: f64) -> Result<f64, ScoringError> {
    if odds == 0.0 || !odds.is_finite() {
        return Err(ScoringError::InvalidOdds(odds));
    }
    if odds > 0.0 {
        Ok(odds / 100.0)
    } else {
        Ok(100.0 / odds.abs())
    }
}

/// `p * payout - (1 - p)` per unit staked
pub fn expected_value(win_probability: f64, odds: f64) -> Result<f64, ScoringError> {
    if !(0.0..=1.0).contains(&win_probability) {
        return Err(ScoringError::InvalidProbability(win_probability));
    }
    let payout = decimal_payout(odds)?;
    Ok(win_probability * payout - (1.0 - win_probability))
}

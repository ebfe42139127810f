/// Input validation for pick requests
///
/// Requests are checked before any provider call or scoring so that a
/// malformed batch is rejected as a whole with a client error.
use crate::domain::{Game, PickRequest};
use crate::error::{PickwiseError, Result};

/// Validate a single American price
///
/// # Arguments
/// * `odds` - Price to validate
/// * `field_name` - Name of the field for error messages
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err` if zero or non-finite
pub fn validate_odds(odds: f64, field_name: &str) -> Result<()> {
    if !odds.is_finite() {
        return Err(PickwiseError::Validation(format!(
            "{} must be a finite number: {}",
            field_name, odds
        )));
    }

    if odds == 0.0 {
        return Err(PickwiseError::Validation(format!(
            "{} cannot be zero",
            field_name
        )));
    }

    Ok(())
}

/// Validate one game's teams and odds
pub fn validate_game(game: &Game, index: usize) -> Result<()> {
    if game.home_team.trim().is_empty() || game.away_team.trim().is_empty() {
        return Err(PickwiseError::Validation(format!(
            "games[{}]: team names cannot be blank",
            index
        )));
    }

    if game.home_team.trim().eq_ignore_ascii_case(game.away_team.trim()) {
        return Err(PickwiseError::Validation(format!(
            "games[{}]: home and away team are both '{}'",
            index, game.home_team
        )));
    }

    for (key, odds) in &game.odds {
        validate_odds(*odds, &format!("games[{}].odds.{}", index, key))?;
    }

    Ok(())
}

/// Validate a full request
///
/// # Returns
/// * `Ok(())` if every game and threshold is usable
/// * `Err(PickwiseError::Validation)` describing the first problem found
pub fn validate_request(request: &PickRequest) -> Result<()> {
    if request.games.is_empty() {
        return Err(PickwiseError::Validation(
            "games must not be empty".to_string(),
        ));
    }

    if request.min_odds > request.max_odds {
        return Err(PickwiseError::Validation(format!(
            "min_odds {} is greater than max_odds {}",
            request.min_odds, request.max_odds
        )));
    }

    if !(0.0..=100.0).contains(&request.min_confidence) {
        return Err(PickwiseError::Validation(format!(
            "min_confidence must be between 0 and 100: {}",
            request.min_confidence
        )));
    }

    for (index, game) in request.games.iter().enumerate() {
        validate_game(game, index)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::League;
    use chrono::{NaiveDate, Utc};

    fn request(games: Vec<Game>) -> PickRequest {
        PickRequest::new(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap(), games)
    }

    fn game(home: &str, away: &str) -> Game {
        Game::new(home, away, League::NBA, Utc::now()).with_moneyline(-110.0, -110.0)
    }

    #[test]
    fn test_validate_odds() {
        assert!(validate_odds(-110.0, "home_ml").is_ok());
        assert!(validate_odds(0.0, "home_ml").is_err());
        assert!(validate_odds(f64::NAN, "home_ml").is_err());
        assert!(validate_odds(f64::INFINITY, "home_ml").is_err());
    }

    #[test]
    fn test_empty_games_rejected() {
        let err = validate_request(&request(Vec::new())).unwrap_err();
        assert!(err.is_client_error());
        assert!(err.to_string().contains("games must not be empty"));
    }

    #[test]
    fn test_team_names() {
        assert!(validate_request(&request(vec![game("Celtics", "Knicks")])).is_ok());
        assert!(validate_request(&request(vec![game("  ", "Knicks")])).is_err());
        assert!(validate_request(&request(vec![game("Knicks", "knicks")])).is_err());
    }

    #[test]
    fn test_thresholds() {
        let inverted = request(vec![game("Celtics", "Knicks")]).with_odds_window(300, -200);
        assert!(validate_request(&inverted).is_err());

        let too_confident = request(vec![game("Celtics", "Knicks")]).with_min_confidence(101.0);
        assert!(validate_request(&too_confident).is_err());
    }

    #[test]
    fn test_zero_odds_rejected() {
        let bad = Game::new("Celtics", "Knicks", League::NBA, Utc::now()).with_moneyline(0.0, 120.0);
        let err = validate_request(&request(vec![bad])).unwrap_err();
        assert!(err.to_string().contains("games[0].odds.home_ml"));
    }

    #[test]
    fn test_missing_odds_allowed() {
        let bare = Game::new("Celtics", "Knicks", League::NBA, Utc::now());
        assert!(validate_request(&request(vec![bare])).is_ok());
    }
}

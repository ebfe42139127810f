use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Odds key for the home moneyline
pub const HOME_ML: &str = "home_ml";
/// Odds key for the away moneyline
pub const AWAY_ML: &str = "away_ml";
/// Opening-line keys (optional, feed line movement)
pub const HOME_ML_OPEN: &str = "home_ml_open";
pub const AWAY_ML_OPEN: &str = "away_ml_open";

/// Supported sports leagues
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum League {
    NFL,
    NBA,
    MLB,
    NHL,
}

impl League {
    pub fn as_str(&self) -> &'static str {
        match self {
            League::NFL => "NFL",
            League::NBA => "NBA",
            League::MLB => "MLB",
            League::NHL => "NHL",
        }
    }

    /// Indoor leagues never see weather effects
    pub fn is_indoor(&self) -> bool {
        matches!(self, League::NBA | League::NHL)
    }

    /// Regular-season length, used to size simulated records
    pub fn season_games(&self) -> u32 {
        match self {
            League::NFL => 17,
            League::NBA | League::NHL => 82,
            League::MLB => 162,
        }
    }
}

impl std::fmt::Display for League {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which team a moneyline selection backs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Home,
    Away,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Home, Side::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Home => "home",
            Side::Away => "away",
        }
    }

    /// Key of this side's moneyline in the odds map
    pub fn odds_key(&self) -> &'static str {
        match self {
            Side::Home => HOME_ML,
            Side::Away => AWAY_ML,
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Betting market type. Only moneyline is produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketType {
    Moneyline,
}

/// Weather conditions at a venue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Weather {
    /// Degrees Fahrenheit
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Miles per hour
    #[serde(default)]
    pub wind_speed: f64,
    /// Inches
    #[serde(default)]
    pub precipitation: f64,
    /// Compass bearing the wind blows from (degrees)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

fn default_temperature() -> f64 {
    70.0
}

impl Default for Weather {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            wind_speed: 0.0,
            precipitation: 0.0,
            wind_direction: None,
            humidity: None,
            conditions: None,
        }
    }
}

/// One scheduled game as supplied by the caller
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub home_team: String,
    pub away_team: String,
    pub league: League,
    pub start_time: DateTime<Utc>,
    /// Market key -> American odds (e.g. `home_ml: -110`)
    #[serde(default)]
    pub odds: HashMap<String, f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather: Option<Weather>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injuries: Option<Vec<String>>,
}

impl Game {
    pub fn new(
        home_team: impl Into<String>,
        away_team: impl Into<String>,
        league: League,
        start_time: DateTime<Utc>,
    ) -> Self {
        Self {
            home_team: home_team.into(),
            away_team: away_team.into(),
            league,
            start_time,
            odds: HashMap::new(),
            venue: None,
            weather: None,
            injuries: None,
        }
    }

    pub fn with_moneyline(mut self, home_ml: f64, away_ml: f64) -> Self {
        self.odds.insert(HOME_ML.to_string(), home_ml);
        self.odds.insert(AWAY_ML.to_string(), away_ml);
        self
    }

    pub fn with_venue(mut self, venue: impl Into<String>) -> Self {
        self.venue = Some(venue.into());
        self
    }

    pub fn with_weather(mut self, weather: Weather) -> Self {
        self.weather = Some(weather);
        self
    }

    pub fn with_injuries(mut self, injuries: Vec<String>) -> Self {
        self.injuries = Some(injuries);
        self
    }

    /// Team name for a side
    pub fn team(&self, side: Side) -> &str {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    /// Moneyline for a side, if listed
    pub fn moneyline(&self, side: Side) -> Option<f64> {
        self.odds.get(side.odds_key()).copied()
    }

    /// Short label used in logs ("Away @ Home")
    pub fn matchup(&self) -> String {
        format!("{} @ {}", self.away_team, self.home_team)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_game_deserializes_wire_shape() {
        let game: Game = serde_json::from_value(json!({
            "home_team": "Kansas City Chiefs",
            "away_team": "Buffalo Bills",
            "league": "NFL",
            "start_time": "2024-01-21T20:00:00Z",
            "odds": {"home_ml": -120, "away_ml": 100},
            "venue": "Arrowhead Stadium",
            "weather": {"temperature": 45, "wind_speed": 8}
        }))
        .unwrap();

        assert_eq!(game.league, League::NFL);
        assert_eq!(game.moneyline(Side::Home), Some(-120.0));
        assert_eq!(game.moneyline(Side::Away), Some(100.0));
        let weather = game.weather.unwrap();
        assert_eq!(weather.precipitation, 0.0);
        assert!(game.injuries.is_none());
    }

    #[test]
    fn test_weather_defaults_to_mild() {
        let weather: Weather = serde_json::from_value(json!({})).unwrap();
        assert_eq!(weather.temperature, 70.0);
        assert_eq!(weather.wind_speed, 0.0);
    }

    #[test]
    fn test_side_helpers() {
        assert_eq!(Side::Away.odds_key(), "away_ml");
        assert_eq!(serde_json::to_string(&Side::Home).unwrap(), "\"home\"");
    }
}

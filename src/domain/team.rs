//! Provider-supplied team records
//!
//! Everything here is read-only input to the feature pipeline. Field defaults
//! mirror what providers return when a value is unknown.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Latitude/longitude pair in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in statute miles (haversine)
    pub fn distance_miles(&self, other: &GeoPoint) -> f64 {
        const EARTH_RADIUS_MILES: f64 = 3958.8;
        let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();
        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
    }
}

/// Season statistics for one team
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamStats {
    pub team_name: String,
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default = "neutral")]
    pub win_percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_per_game: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points_allowed_per_game: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offensive_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defensive_rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pace: Option<f64>,
    /// Recent results, most recent first
    #[serde(default)]
    pub recent_form: Vec<GameResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sos_past: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sos_future: Option<f64>,
    /// Win fraction against quality opponents
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub record_vs_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_location: Option<GeoPoint>,
}

fn neutral() -> f64 {
    0.5
}

impl TeamStats {
    /// Stats record with only the name set; every metric at its neutral default
    pub fn unknown(team_name: impl Into<String>) -> Self {
        Self {
            team_name: team_name.into(),
            wins: 0,
            losses: 0,
            win_percentage: neutral(),
            points_per_game: None,
            points_allowed_per_game: None,
            offensive_rating: None,
            defensive_rating: None,
            pace: None,
            recent_form: Vec::new(),
            sos_past: None,
            sos_future: None,
            record_vs_quality: None,
            home_location: None,
        }
    }
}

/// Outcome of a completed game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    #[serde(rename = "W", alias = "w")]
    Win,
    #[serde(rename = "L", alias = "l")]
    Loss,
}

impl GameResult {
    pub fn is_win(&self) -> bool {
        matches!(self, GameResult::Win)
    }
}

/// One completed game from a team's recent history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecentGame {
    pub date: NaiveDate,
    #[serde(default)]
    pub opponent: String,
    pub result: GameResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_for: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_against: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_rating: Option<f64>,
    /// Signed points margin from this team's perspective
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<f64>,
}

impl RecentGame {
    /// Explicit margin if reported, otherwise derived from the score
    pub fn point_margin(&self) -> Option<f64> {
        self.margin.or_else(|| match (self.score_for, self.score_against) {
            (Some(pf), Some(pa)) => Some(pf as f64 - pa as f64),
            _ => None,
        })
    }
}

/// Availability designation on an injury report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InjuryStatus {
    Out,
    Doubtful,
    Questionable,
    Probable,
}

impl InjuryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InjuryStatus::Out => "Out",
            InjuryStatus::Doubtful => "Doubtful",
            InjuryStatus::Questionable => "Questionable",
            InjuryStatus::Probable => "Probable",
        }
    }

    /// Case-insensitive match anywhere in free text ("Star QB (out)")
    pub fn find_in(text: &str) -> Option<Self> {
        let lower = text.to_ascii_lowercase();
        [
            InjuryStatus::Out,
            InjuryStatus::Doubtful,
            InjuryStatus::Questionable,
            InjuryStatus::Probable,
        ]
        .into_iter()
        .find(|status| {
            let needle = status.as_str().to_ascii_lowercase();
            lower
                .split(|c: char| !c.is_ascii_alphanumeric())
                .any(|word| word == needle)
        })
    }
}

impl std::fmt::Display for InjuryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Importance tier of an injured player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImpactTier {
    High,
    Medium,
    Low,
}

/// One row of a team injury report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InjuryReport {
    pub player: String,
    #[serde(default)]
    pub position: String,
    pub status: InjuryStatus,
    #[serde(default)]
    pub injury: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<ImpactTier>,
}

impl InjuryReport {
    /// Short description used when enriching a game's injury list
    pub fn describe(&self) -> String {
        format!("{} ({})", self.player, self.status)
    }
}

/// Venue metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VenueInfo {
    pub name: String,
    #[serde(default)]
    pub elevation_ft: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub indoor: bool,
}

/// Everything known about one team going into a game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TeamContext {
    pub stats: Option<TeamStats>,
    pub injuries: Vec<InjuryReport>,
    /// Most recent first
    pub recent_games: Vec<RecentGame>,
}

/// Both teams plus the venue, as consumed by the feature pipeline
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchupContext {
    pub home: TeamContext,
    pub away: TeamContext,
    pub venue: Option<VenueInfo>,
}

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::game::{Game, League, MarketType};
use super::team::TeamStats;

/// Model-version tags reported on every pick
pub mod model_version {
    pub const HEURISTIC: &str = "1.0.0-heuristic";
    pub const WEIGHTED: &str = "2.0.0-complex";
    pub const TRAINED_DEFAULT: &str = "1.0.0";
    /// A single candidate whose scoring failed
    pub const SCORING_FALLBACK: &str = "fallback";
    /// Conservative pick built by callers when nothing is viable
    pub const FALLBACK: &str = "fallback";
    pub const EMERGENCY: &str = "emergency";
}

fn default_min_odds() -> i32 {
    -200
}

fn default_max_odds() -> i32 {
    300
}

fn default_min_confidence() -> f64 {
    60.0
}

/// One batch request for a pick
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickRequest {
    pub date: NaiveDate,
    pub games: Vec<Game>,
    /// Free-form context; `team_stats` (team name -> TeamStats) overrides provider stats
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
    #[serde(default = "default_min_odds")]
    pub min_odds: i32,
    #[serde(default = "default_max_odds")]
    pub max_odds: i32,
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f64,
}

impl PickRequest {
    pub fn new(date: NaiveDate, games: Vec<Game>) -> Self {
        Self {
            date,
            games,
            context: HashMap::new(),
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
            min_confidence: default_min_confidence(),
        }
    }

    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    pub fn with_odds_window(mut self, min_odds: i32, max_odds: i32) -> Self {
        self.min_odds = min_odds;
        self.max_odds = max_odds;
        self
    }

    /// Caller-supplied stats for a team from `context.team_stats`, if any
    pub fn context_team_stats(&self, team: &str) -> Option<TeamStats> {
        let value = self.context.get("team_stats")?.get(team)?;
        match serde_json::from_value::<TeamStats>(value.clone()) {
            Ok(stats) => Some(stats),
            Err(e) => {
                tracing::warn!("Ignoring malformed context.team_stats for {}: {}", team, e);
                None
            }
        }
    }
}

/// Explanation attached to a pick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rationale {
    pub reasoning: String,
    pub top_factors: Vec<String>,
    pub risk_assessment: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub confidence_factors: Vec<FactorWeight>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_insights: Vec<String>,
}

/// Named importance weight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorWeight {
    pub name: String,
    pub weight: f64,
}

impl FactorWeight {
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}

/// Final recommendation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pick {
    /// "<Team> ML"
    pub selection: String,
    pub market: MarketType,
    pub league: League,
    pub odds: f64,
    pub confidence: f64,
    #[serde(default)]
    pub expected_value: Option<f64>,
    pub rationale: Rationale,
    pub features_used: Vec<String>,
    pub generated_at: DateTime<Utc>,
    pub model_version: String,
}

/// Selection label for a moneyline pick
pub fn selection_label(team: &str) -> String {
    format!("{} ML", team)
}

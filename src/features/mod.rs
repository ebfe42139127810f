//! Feature engineering
//!
//! [`FeatureEngineer::process`] turns one game plus optional team context into
//! a complete [`FeatureVector`]. Each group is computed independently; a group
//! that fails is replaced by its defaults and recorded in
//! [`FeatureVector::degraded`] so one bad input never sinks the whole vector.

pub mod form;
pub mod injury;
pub mod odds;
pub mod situational;
pub mod vector;

pub use odds::odds_to_probability;
pub use vector::{FeatureVector, MODEL_FEATURES};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

use crate::domain::{Game, MatchupContext};
use crate::error::FeatureError;

/// Independently computed slices of the feature vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureGroup {
    Odds,
    Team,
    Efficiency,
    Form,
    Schedule,
    Venue,
    Weather,
    Injuries,
}

impl FeatureGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureGroup::Odds => "odds",
            FeatureGroup::Team => "team",
            FeatureGroup::Efficiency => "efficiency",
            FeatureGroup::Form => "form",
            FeatureGroup::Schedule => "schedule",
            FeatureGroup::Venue => "venue",
            FeatureGroup::Weather => "weather",
            FeatureGroup::Injuries => "injuries",
        }
    }
}

impl std::fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reject NaN/inf before it reaches the vector
pub(crate) fn ensure_finite(field: &'static str, value: f64) -> Result<f64, FeatureError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FeatureError::NonFinite { field, value })
    }
}

/// Stateless feature pipeline
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureEngineer;

impl FeatureEngineer {
    pub fn new() -> Self {
        Self
    }

    /// Build the feature vector for a game. Never fails.
    pub fn process(&self, game: &Game, context: Option<&MatchupContext>) -> FeatureVector {
        let empty = MatchupContext::default();
        let ctx = context.unwrap_or(&empty);
        let mut degraded = BTreeSet::new();

        let odds = run_group(FeatureGroup::Odds, game, &mut degraded, || odds::compute(game));
        let team = run_group(FeatureGroup::Team, game, &mut degraded, || {
            form::compute_team(ctx)
        });
        let efficiency = run_group(FeatureGroup::Efficiency, game, &mut degraded, || {
            form::compute_efficiency(ctx)
        });
        let recent = run_group(FeatureGroup::Form, game, &mut degraded, || {
            form::compute_form(ctx)
        });
        let schedule = run_group(FeatureGroup::Schedule, game, &mut degraded, || {
            situational::compute_schedule(game, ctx)
        });
        let venue = run_group(FeatureGroup::Venue, game, &mut degraded, || {
            situational::compute_venue(game, ctx)
        });
        let weather_impact = run_group(FeatureGroup::Weather, game, &mut degraded, || {
            situational::compute_weather(game, ctx)
        });
        let injuries = run_group(FeatureGroup::Injuries, game, &mut degraded, || {
            injury::compute(game, ctx)
        });

        debug!(
            "Features for {}: odds_value={:.1}, market_efficiency={:.3}, degraded={}",
            game.matchup(),
            odds.odds_value,
            odds.market_efficiency,
            degraded.len()
        );

        FeatureVector {
            odds_value: odds.odds_value,
            odds_movement: odds.odds_movement,
            line_movement_significance: odds.line_movement_significance,
            market_efficiency: odds.market_efficiency,
            home_implied_probability: odds.home_implied_probability,
            away_implied_probability: odds.away_implied_probability,

            home_win_rate: team.home_win_rate,
            away_win_rate: team.away_win_rate,
            recent_form_home: team.recent_form_home,
            recent_form_away: team.recent_form_away,
            head_to_head_record: team.head_to_head_record,

            home_offensive_rating: efficiency.home_offensive_rating,
            home_defensive_rating: efficiency.home_defensive_rating,
            away_offensive_rating: efficiency.away_offensive_rating,
            away_defensive_rating: efficiency.away_defensive_rating,
            home_net_rating: efficiency.home_net_rating,
            away_net_rating: efficiency.away_net_rating,
            home_pace: efficiency.home_pace,
            away_pace: efficiency.away_pace,
            offensive_matchup_advantage: efficiency.offensive_matchup_advantage,
            defensive_matchup_advantage: efficiency.defensive_matchup_advantage,
            pace_differential: efficiency.pace_differential,

            home_weighted_form: recent.home_weighted_form,
            away_weighted_form: recent.away_weighted_form,
            home_form_trend: recent.home_form_trend,
            away_form_trend: recent.away_form_trend,
            home_clutch_performance: recent.home_clutch_performance,
            away_clutch_performance: recent.away_clutch_performance,
            home_blowout_tendency: recent.home_blowout_tendency,
            away_blowout_tendency: recent.away_blowout_tendency,

            home_sos_past: schedule.home_sos_past,
            away_sos_past: schedule.away_sos_past,
            home_sos_future: schedule.home_sos_future,
            away_sos_future: schedule.away_sos_future,
            home_record_vs_quality: schedule.home_record_vs_quality,
            away_record_vs_quality: schedule.away_record_vs_quality,
            rest_days_home: schedule.rest_days_home,
            rest_days_away: schedule.rest_days_away,

            travel_distance: venue.travel_distance,
            altitude_impact: venue.altitude_impact,

            weather_impact,

            injury_impact: injuries.injury_impact,
            home_injury_impact: injuries.home_injury_impact,
            away_injury_impact: injuries.away_injury_impact,

            degraded,
            ..FeatureVector::default()
        }
    }
}

fn run_group<T: Default>(
    group: FeatureGroup,
    game: &Game,
    degraded: &mut BTreeSet<FeatureGroup>,
    compute: impl FnOnce() -> Result<T, FeatureError>,
) -> T {
    match compute() {
        Ok(values) => values,
        Err(e) => {
            warn!(
                "Feature group {} failed for {}, using defaults: {}",
                group,
                game.matchup(),
                e
            );
            degraded.insert(group);
            T::default()
        }
    }
}

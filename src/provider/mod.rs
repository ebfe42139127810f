//! Team, venue, weather and odds data sources
//!
//! The engine only consumes the record shapes below. Every method returns a
//! [`ProviderError`] on failure and the engine substitutes defaults, so a
//! flaky provider degrades picks instead of failing them.

pub mod cache;
pub mod rate_limit;
pub mod simulated;

pub use cache::CachedProvider;
pub use rate_limit::{RateLimitedProvider, RateLimiter};
pub use simulated::SimulatedProvider;

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ProviderConfig;
use crate::domain::{InjuryReport, League, RecentGame, TeamStats, VenueInfo, Weather};
use crate::error::ProviderError;

#[cfg_attr(test, mockall::automock)]
pub trait TeamStatsProvider: Send + Sync {
    fn get_team_stats(&self, team: &str, league: League) -> Result<TeamStats, ProviderError>;

    fn get_injury_report(
        &self,
        team: &str,
        league: League,
    ) -> Result<Vec<InjuryReport>, ProviderError>;

    /// Most recent first, at most `limit` games
    fn get_recent_games(
        &self,
        team: &str,
        league: League,
        limit: usize,
    ) -> Result<Vec<RecentGame>, ProviderError>;

    fn get_weather_for_venue(
        &self,
        venue: &str,
        time: DateTime<Utc>,
    ) -> Result<Weather, ProviderError>;

    fn get_venue_info(&self, venue: &str) -> Result<VenueInfo, ProviderError>;

    /// Market key -> American odds
    fn get_odds_for_game(
        &self,
        home_team: &str,
        away_team: &str,
        league: League,
    ) -> Result<HashMap<String, f64>, ProviderError>;
}

/// Wrap a base provider with the configured rate limit and cache.
///
/// The cache sits outside the limiter so hits never spend call budget.
pub fn layered(base: Arc<dyn TeamStatsProvider>, config: &ProviderConfig) -> Arc<dyn TeamStatsProvider> {
    let limited: Arc<dyn TeamStatsProvider> = Arc::new(RateLimitedProvider::new(
        base,
        config.calls_per_minute as usize,
        Duration::from_secs(config.window_secs),
    ));
    if config.cache {
        Arc::new(CachedProvider::new(limited))
    } else {
        limited
    }
}

//! Sliding-window call budget for upstream providers

use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::debug;

use super::TeamStatsProvider;
use crate::domain::{InjuryReport, League, RecentGame, TeamStats, VenueInfo, Weather};
use crate::error::ProviderError;

/// Blocking limiter: at most `max_calls` per `window`
#[derive(Debug)]
pub struct RateLimiter {
    calls: Mutex<VecDeque<Instant>>,
    max_calls: usize,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_calls: usize, window: Duration) -> Self {
        Self {
            calls: Mutex::new(VecDeque::with_capacity(max_calls)),
            max_calls: max_calls.max(1),
            window,
        }
    }

    pub fn per_minute(max_calls: usize) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    /// Block the calling thread until a call slot is free, then take it
    pub fn acquire(&self) {
        loop {
            let wait = {
                let mut calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
                let now = Instant::now();
                while let Some(front) = calls.front() {
                    if now.duration_since(*front) >= self.window {
                        calls.pop_front();
                    } else {
                        break;
                    }
                }
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }
                match calls.front() {
                    Some(oldest) => self.window.saturating_sub(now.duration_since(*oldest)),
                    None => Duration::ZERO,
                }
            };
            debug!("Provider rate limit reached, sleeping {:?}", wait);
            std::thread::sleep(wait);
        }
    }

    /// Calls counted in the current window
    pub fn in_window(&self) -> usize {
        let calls = self.calls.lock().unwrap_or_else(|e| e.into_inner());
        let now = Instant::now();
        calls
            .iter()
            .filter(|t| now.duration_since(**t) < self.window)
            .count()
    }
}

/// Provider decorator that spends one slot per upstream call
pub struct RateLimitedProvider {
    inner: Arc<dyn TeamStatsProvider>,
    limiter: RateLimiter,
}

impl RateLimitedProvider {
    pub fn new(inner: Arc<dyn TeamStatsProvider>, max_calls: usize, window: Duration) -> Self {
        Self {
            inner,
            limiter: RateLimiter::new(max_calls, window),
        }
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }
}

impl TeamStatsProvider for RateLimitedProvider {
    fn get_team_stats(&self, team: &str, league: League) -> Result<TeamStats, ProviderError> {
        self.limiter.acquire();
        self.inner.get_team_stats(team, league)
    }

    fn get_injury_report(
        &self,
        team: &str,
        league: League,
    ) -> Result<Vec<InjuryReport>, ProviderError> {
        self.limiter.acquire();
        self.inner.get_injury_report(team, league)
    }

    fn get_recent_games(
        &self,
        team: &str,
        league: League,
        limit: usize,
    ) -> Result<Vec<RecentGame>, ProviderError> {
        self.limiter.acquire();
        self.inner.get_recent_games(team, league, limit)
    }

    fn get_weather_for_venue(
        &self,
        venue: &str,
        time: DateTime<Utc>,
    ) -> Result<Weather, ProviderError> {
        self.limiter.acquire();
        self.inner.get_weather_for_venue(venue, time)
    }

    fn get_venue_info(&self, venue: &str) -> Result<VenueInfo, ProviderError> {
        self.limiter.acquire();
        self.inner.get_venue_info(venue)
    }

    fn get_odds_for_game(
        &self,
        home_team: &str,
        away_team: &str,
        league: League,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.limiter.acquire();
        self.inner.get_odds_for_game(home_team, away_team, league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTeamStatsProvider;

    #[test]
    fn test_call_over_budget_blocks_for_window() {
        let limiter = RateLimiter::new(2, Duration::from_millis(200));
        let start = Instant::now();
        limiter.acquire();
        limiter.acquire();
        assert!(start.elapsed() < Duration::from_millis(100));
        assert_eq!(limiter.in_window(), 2);

        limiter.acquire();
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(190), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_secs(2), "elapsed {:?}", elapsed);
    }

    #[test]
    fn test_decorator_passes_through() {
        let mut mock = MockTeamStatsProvider::new();
        mock.expect_get_venue_info()
            .times(1)
            .returning(|_| Err(ProviderError::NotFound("venue".into())));

        let provider = RateLimitedProvider::new(Arc::new(mock), 5, Duration::from_secs(60));
        assert_eq!(
            provider.get_venue_info("Nowhere"),
            Err(ProviderError::NotFound("venue".into()))
        );
        assert_eq!(provider.limiter().in_window(), 1);
    }
}

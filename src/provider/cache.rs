//! Read-through cache for team lookups
//!
//! Entries are keyed by (team, league, date) so a long-running server picks
//! up fresh data at day rollover; entries from earlier days are evicted when
//! the date moves forward. Errors are never cached.

use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex};
use tracing::debug;

use super::TeamStatsProvider;
use crate::domain::{InjuryReport, League, RecentGame, TeamStats, VenueInfo, Weather};
use crate::error::ProviderError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TeamKey {
    team: String,
    league: League,
    date: NaiveDate,
}

pub struct CachedProvider {
    inner: Arc<dyn TeamStatsProvider>,
    /// Fixed as-of date; `None` uses today's UTC date per lookup
    as_of: Option<NaiveDate>,
    stats: DashMap<TeamKey, TeamStats>,
    injuries: DashMap<TeamKey, Vec<InjuryReport>>,
    recent: DashMap<(TeamKey, usize), Vec<RecentGame>>,
    venues: DashMap<String, VenueInfo>,
    /// Latest date a lookup was keyed on
    current_date: Mutex<Option<NaiveDate>>,
}

impl CachedProvider {
    pub fn new(inner: Arc<dyn TeamStatsProvider>) -> Self {
        Self {
            inner,
            as_of: None,
            stats: DashMap::new(),
            injuries: DashMap::new(),
            recent: DashMap::new(),
            venues: DashMap::new(),
            current_date: Mutex::new(None),
        }
    }

    pub fn with_as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }

    pub fn set_as_of(&mut self, date: NaiveDate) {
        self.as_of = Some(date);
    }

    fn key(&self, team: &str, league: League) -> TeamKey {
        let date = self.as_of.unwrap_or_else(|| Utc::now().date_naive());
        self.roll_over(date);
        TeamKey {
            team: team.trim().to_lowercase(),
            league,
            date,
        }
    }

    fn roll_over(&self, date: NaiveDate) {
        let mut current = self.current_date.lock().unwrap_or_else(|e| e.into_inner());
        match *current {
            Some(seen) if seen >= date => {}
            Some(_) => {
                self.evict_before(date);
                *current = Some(date);
            }
            None => *current = Some(date),
        }
    }

    /// Drop team entries keyed on days before `date`
    pub fn evict_before(&self, date: NaiveDate) {
        let before = self.len();
        self.stats.retain(|k, _| k.date >= date);
        self.injuries.retain(|k, _| k.date >= date);
        self.recent.retain(|(k, _), _| k.date >= date);
        debug!("Provider cache rolled to {}: {} -> {} entries", date, before, self.len());
    }

    pub fn len(&self) -> usize {
        self.stats.len() + self.injuries.len() + self.recent.len() + self.venues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.stats.clear();
        self.injuries.clear();
        self.recent.clear();
        self.venues.clear();
    }
}

fn read_through<K, V>(
    map: &DashMap<K, V>,
    key: K,
    fetch: impl FnOnce() -> Result<V, ProviderError>,
) -> Result<V, ProviderError>
where
    K: Eq + Hash,
    V: Clone,
{
    if let Some(hit) = map.get(&key) {
        return Ok(hit.value().clone());
    }
    let value = fetch()?;
    map.insert(key, value.clone());
    Ok(value)
}

impl TeamStatsProvider for CachedProvider {
    fn get_team_stats(&self, team: &str, league: League) -> Result<TeamStats, ProviderError> {
        read_through(&self.stats, self.key(team, league), || {
            self.inner.get_team_stats(team, league)
        })
    }

    fn get_injury_report(
        &self,
        team: &str,
        league: League,
    ) -> Result<Vec<InjuryReport>, ProviderError> {
        read_through(&self.injuries, self.key(team, league), || {
            self.inner.get_injury_report(team, league)
        })
    }

    fn get_recent_games(
        &self,
        team: &str,
        league: League,
        limit: usize,
    ) -> Result<Vec<RecentGame>, ProviderError> {
        read_through(&self.recent, (self.key(team, league), limit), || {
            self.inner.get_recent_games(team, league, limit)
        })
    }

    // Weather and odds move during the day; always go upstream
    fn get_weather_for_venue(
        &self,
        venue: &str,
        time: DateTime<Utc>,
    ) -> Result<Weather, ProviderError> {
        self.inner.get_weather_for_venue(venue, time)
    }

    fn get_venue_info(&self, venue: &str) -> Result<VenueInfo, ProviderError> {
        read_through(&self.venues, venue.trim().to_lowercase(), || {
            self.inner.get_venue_info(venue)
        })
    }

    fn get_odds_for_game(
        &self,
        home_team: &str,
        away_team: &str,
        league: League,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        self.inner.get_odds_for_game(home_team, away_team, league)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MockTeamStatsProvider;

    #[test]
    fn test_repeated_lookup_hits_inner_once() {
        let mut mock = MockTeamStatsProvider::new();
        mock.expect_get_team_stats()
            .times(1)
            .returning(|team, _| Ok(TeamStats::unknown(team)));

        let cache = CachedProvider::new(Arc::new(mock))
            .with_as_of(NaiveDate::from_ymd_opt(2024, 1, 21).unwrap());
        let first = cache.get_team_stats("Kansas City Chiefs", League::NFL).unwrap();
        let second = cache.get_team_stats("kansas city chiefs ", League::NFL).unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_errors_are_not_cached() {
        let mut mock = MockTeamStatsProvider::new();
        mock.expect_get_injury_report()
            .times(2)
            .returning(|_, _| Err(ProviderError::Network("timeout".into())));

        let cache = CachedProvider::new(Arc::new(mock));
        assert!(cache.get_injury_report("Bills", League::NFL).is_err());
        assert!(cache.get_injury_report("Bills", League::NFL).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_day_rollover_evicts_previous_day() {
        let mut mock = MockTeamStatsProvider::new();
        mock.expect_get_team_stats()
            .times(3)
            .returning(|team, _| Ok(TeamStats::unknown(team)));
        mock.expect_get_recent_games()
            .times(2)
            .returning(|_, _, _| Ok(Vec::new()));

        let day = NaiveDate::from_ymd_opt(2024, 1, 21).unwrap();
        let mut cache = CachedProvider::new(Arc::new(mock)).with_as_of(day);
        cache.get_team_stats("Chiefs", League::NFL).unwrap();
        cache.get_recent_games("Chiefs", League::NFL, 10).unwrap();
        assert_eq!(cache.len(), 2);

        for offset in 1..=2 {
            cache.set_as_of(day + chrono::Duration::days(offset));
            cache.get_team_stats("Chiefs", League::NFL).unwrap();
            assert_eq!(cache.len(), 1);
        }

        cache.get_recent_games("Chiefs", League::NFL, 10).unwrap();
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_leagues_cached_separately() {
        let mut mock = MockTeamStatsProvider::new();
        mock.expect_get_recent_games()
            .times(2)
            .returning(|_, _, _| Ok(Vec::new()));

        let cache = CachedProvider::new(Arc::new(mock));
        cache.get_recent_games("Rangers", League::NHL, 10).unwrap();
        cache.get_recent_games("Rangers", League::MLB, 10).unwrap();
        cache.get_recent_games("Rangers", League::NHL, 10).unwrap();
    }
}

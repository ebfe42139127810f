//! Deterministic offline provider
//!
//! Every record is generated from a `StdRng` seeded with the SHA-256 of the
//! lowercased lookup key, so the same team always gets the same numbers.
//! Used for offline runs and as a test double.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

use super::TeamStatsProvider;
use crate::domain::{
    GameResult, GeoPoint, ImpactTier, InjuryReport, InjuryStatus, League, RecentGame, TeamStats,
    VenueInfo, Weather, AWAY_ML, HOME_ML,
};
use crate::error::ProviderError;
use crate::features::situational::is_indoor_venue;

/// Venues generated at altitude
const HIGH_ALTITUDE_VENUES: [(&str, f64); 3] = [
    ("coors", 5200.0),
    ("mile high", 5280.0),
    ("ball arena", 5280.0),
];

#[derive(Debug, Clone)]
pub struct SimulatedProvider {
    as_of: NaiveDate,
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        Self::new(Utc::now().date_naive())
    }
}

impl SimulatedProvider {
    pub fn new(as_of: NaiveDate) -> Self {
        Self { as_of }
    }

    fn rng(parts: &[&str]) -> StdRng {
        let mut hasher = Sha256::new();
        for part in parts {
            hasher.update(part.trim().to_lowercase().as_bytes());
            hasher.update(b"|");
        }
        StdRng::from_seed(hasher.finalize().into())
    }

    fn team_rng(team: &str, league: League, stream: &str) -> StdRng {
        Self::rng(&[team, league.as_str(), stream])
    }

    fn days_between_games(league: League) -> i64 {
        match league {
            League::NFL => 7,
            League::NBA | League::NHL => 2,
            League::MLB => 1,
        }
    }

    fn positions(league: League) -> &'static [&'static str] {
        match league {
            League::NFL => &["QB", "RB", "WR", "TE", "CB", "LB", "K"],
            League::NBA => &["PG", "SG", "SF", "PF", "C"],
            League::MLB => &["SP", "RP", "C", "SS", "CF", "1B"],
            League::NHL => &["G", "C", "D", "LW", "RW"],
        }
    }

    fn point_scale(league: League) -> (u32, u32) {
        match league {
            League::NFL => (10, 38),
            League::NBA => (95, 130),
            League::MLB => (0, 10),
            League::NHL => (0, 6),
        }
    }
}

impl TeamStatsProvider for SimulatedProvider {
    fn get_team_stats(&self, team: &str, league: League) -> Result<TeamStats, ProviderError> {
        let mut rng = Self::team_rng(team, league, "stats");
        let played = league.season_games() / 2 + rng.gen_range(0..=league.season_games() / 2);
        let wins = rng.gen_range(0..=played);
        let losses = played - wins;
        let (low, high) = Self::point_scale(league);
        let ppg = rng.gen_range(low as f64..=high as f64);
        let papg = rng.gen_range(low as f64..=high as f64);

        let recent = self.get_recent_games(team, league, 10)?;

        Ok(TeamStats {
            team_name: team.to_string(),
            wins,
            losses,
            win_percentage: if played == 0 {
                0.5
            } else {
                wins as f64 / played as f64
            },
            points_per_game: Some(ppg),
            points_allowed_per_game: Some(papg),
            offensive_rating: Some(rng.gen_range(95.0..120.0)),
            defensive_rating: Some(rng.gen_range(95.0..120.0)),
            pace: Some(rng.gen_range(95.0..105.0)),
            recent_form: recent.iter().map(|g| g.result).collect(),
            sos_past: Some(rng.gen_range(0.35..0.65)),
            sos_future: Some(rng.gen_range(0.35..0.65)),
            record_vs_quality: None,
            home_location: Some(GeoPoint::new(
                rng.gen_range(25.0..48.0),
                rng.gen_range(-122.0..-71.0),
            )),
        })
    }

    fn get_injury_report(
        &self,
        team: &str,
        league: League,
    ) -> Result<Vec<InjuryReport>, ProviderError> {
        let mut rng = Self::team_rng(team, league, "injuries");
        let positions = Self::positions(league);
        let statuses = [
            InjuryStatus::Out,
            InjuryStatus::Doubtful,
            InjuryStatus::Questionable,
            InjuryStatus::Probable,
        ];
        let tiers = [ImpactTier::High, ImpactTier::Medium, ImpactTier::Low];
        let injuries = ["Ankle", "Knee", "Hamstring", "Concussion", "Shoulder"];

        let count = rng.gen_range(0..=3);
        Ok((0..count)
            .map(|i| InjuryReport {
                player: format!("{} Player {}", team, i + 1),
                position: positions[rng.gen_range(0..positions.len())].to_string(),
                status: statuses[rng.gen_range(0..statuses.len())],
                injury: injuries[rng.gen_range(0..injuries.len())].to_string(),
                impact: Some(tiers[rng.gen_range(0..tiers.len())]),
            })
            .collect())
    }

    fn get_recent_games(
        &self,
        team: &str,
        league: League,
        limit: usize,
    ) -> Result<Vec<RecentGame>, ProviderError> {
        let mut rng = Self::team_rng(team, league, "recent");
        let gap = Self::days_between_games(league);
        let (low, high) = Self::point_scale(league);

        Ok((0..limit)
            .map(|i| {
                let a = rng.gen_range(low..=high);
                let mut b = rng.gen_range(low..=high);
                if a == b {
                    b = if b > low { b - 1 } else { b + 1 };
                }
                let result = if a > b { GameResult::Win } else { GameResult::Loss };
                RecentGame {
                    date: self.as_of - Duration::days(gap * (i as i64 + 1)),
                    opponent: format!("Opponent {}", i + 1),
                    result,
                    score_for: Some(a),
                    score_against: Some(b),
                    opponent_rating: Some(rng.gen_range(90.0..115.0)),
                    margin: Some(a as f64 - b as f64),
                }
            })
            .collect())
    }

    fn get_weather_for_venue(
        &self,
        venue: &str,
        time: DateTime<Utc>,
    ) -> Result<Weather, ProviderError> {
        let day = time.date_naive().to_string();
        let mut rng = Self::rng(&[venue, day.as_str(), "weather"]);
        let precipitation = if rng.gen_bool(0.2) {
            rng.gen_range(0.05..0.5)
        } else {
            0.0
        };
        Ok(Weather {
            temperature: rng.gen_range(25.0..95.0),
            wind_speed: rng.gen_range(0.0..30.0),
            precipitation,
            wind_direction: Some(rng.gen_range(0.0..360.0)),
            humidity: Some(rng.gen_range(20.0..90.0)),
            conditions: Some(if precipitation > 0.0 { "Rain" } else { "Clear" }.to_string()),
        })
    }

    fn get_venue_info(&self, venue: &str) -> Result<VenueInfo, ProviderError> {
        let mut rng = Self::rng(&[venue, "venue"]);
        let lower = venue.to_lowercase();
        let elevation_ft = HIGH_ALTITUDE_VENUES
            .iter()
            .find(|(name, _)| lower.contains(name))
            .map(|(_, ft)| *ft)
            .unwrap_or_else(|| rng.gen_range(0.0..1200.0));
        Ok(VenueInfo {
            name: venue.to_string(),
            elevation_ft,
            location: Some(GeoPoint::new(
                rng.gen_range(25.0..48.0),
                rng.gen_range(-122.0..-71.0),
            )),
            indoor: is_indoor_venue(venue),
        })
    }

    fn get_odds_for_game(
        &self,
        home_team: &str,
        away_team: &str,
        league: League,
    ) -> Result<HashMap<String, f64>, ProviderError> {
        let mut rng = Self::rng(&[home_team, away_team, league.as_str(), "odds"]);
        let favorite = rng.gen_range(105.0_f64..260.0).round();
        let underdog = (favorite - rng.gen_range(10.0..25.0)).round().max(100.0);
        let (home_ml, away_ml) = if rng.gen_bool(0.55) {
            (-favorite, underdog)
        } else {
            (underdog, -favorite)
        };
        Ok(HashMap::from([
            (HOME_ML.to_string(), home_ml),
            (AWAY_ML.to_string(), away_ml),
        ]))
    }
}

//! Schedule, venue and weather features

use super::ensure_finite;
use super::form::{record_vs_quality, strength_of_schedule};
use crate::domain::{Game, League, MatchupContext, TeamContext, Weather};
use crate::error::FeatureError;

pub const DEFAULT_REST_DAYS: f64 = 3.0;
pub const MAX_REST_DAYS: f64 = 14.0;
/// Elevation below which altitude has no effect
pub const ALTITUDE_THRESHOLD_FT: f64 = 1000.0;
pub const WEATHER_IMPACT_LIMIT: f64 = 0.3;

/// Venue-name keywords that mark a covered stadium
const INDOOR_KEYWORDS: [&str; 4] = ["dome", "indoor", "arena", "center"];

/// Compass bearing (wind source) that blows toward the outfield in a
/// nominal park facing 45 degrees
const WIND_OUT_BEARING: f64 = 225.0;
const WIND_IN_BEARING: f64 = 45.0;
const WIND_CONE_DEGREES: f64 = 45.0;

/// True when the venue name suggests a roof
pub fn is_indoor_venue(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    INDOOR_KEYWORDS.iter().any(|k| lower.contains(k))
}

fn bearing_delta(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Sport-specific weather adjustment, clamped to +/-0.3
pub fn weather_impact(league: League, weather: &Weather) -> f64 {
    let mut impact: f64 = 0.0;
    match league {
        League::NFL => {
            if weather.temperature < 35.0 {
                impact -= 0.15;
            }
            if weather.wind_speed > 25.0 {
                impact -= 0.2;
            }
            if weather.precipitation > 0.1 {
                impact -= 0.1;
            }
        }
        League::MLB => {
            if weather.temperature > 85.0 {
                impact += 0.05;
            } else if weather.temperature < 50.0 {
                impact -= 0.05;
            }
            if weather.wind_speed > 10.0 {
                if let Some(dir) = weather.wind_direction {
                    if bearing_delta(dir, WIND_OUT_BEARING) <= WIND_CONE_DEGREES {
                        impact += 0.1;
                    } else if bearing_delta(dir, WIND_IN_BEARING) <= WIND_CONE_DEGREES {
                        impact -= 0.1;
                    }
                }
            }
            if weather.precipitation > 0.1 {
                impact -= 0.05;
            }
        }
        League::NBA | League::NHL => {}
    }
    impact.clamp(-WEATHER_IMPACT_LIMIT, WEATHER_IMPACT_LIMIT)
}

/// League-specific altitude adjustment; zero at or below 1000 ft
pub fn altitude_impact(league: League, elevation_ft: f64) -> f64 {
    if elevation_ft <= ALTITUDE_THRESHOLD_FT {
        return 0.0;
    }
    let tier = if elevation_ft > 5000.0 {
        0
    } else if elevation_ft > 3000.0 {
        1
    } else {
        2
    };
    let table: [f64; 3] = match league {
        League::MLB => [0.10, 0.05, 0.02],
        League::NFL => [-0.03, -0.02, -0.01],
        League::NBA => [-0.02, -0.015, -0.005],
        League::NHL => [-0.02, -0.01, -0.005],
    };
    table[tier]
}

/// Days since the team's last game, clamped to [0, 14]
pub fn rest_days(team: &TeamContext, game: &Game) -> f64 {
    let Some(last) = team.recent_games.iter().map(|g| g.date).max() else {
        return DEFAULT_REST_DAYS;
    };
    let days = (game.start_time.date_naive() - last).num_days() as f64;
    days.clamp(0.0, MAX_REST_DAYS)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleFeatures {
    pub home_sos_past: f64,
    pub away_sos_past: f64,
    pub home_sos_future: f64,
    pub away_sos_future: f64,
    pub home_record_vs_quality: f64,
    pub away_record_vs_quality: f64,
    pub rest_days_home: f64,
    pub rest_days_away: f64,
}

impl Default for ScheduleFeatures {
    fn default() -> Self {
        Self {
            home_sos_past: 0.5,
            away_sos_past: 0.5,
            home_sos_future: 0.5,
            away_sos_future: 0.5,
            home_record_vs_quality: 0.5,
            away_record_vs_quality: 0.5,
            rest_days_home: DEFAULT_REST_DAYS,
            rest_days_away: DEFAULT_REST_DAYS,
        }
    }
}

pub fn compute_schedule(
    game: &Game,
    ctx: &MatchupContext,
) -> Result<ScheduleFeatures, FeatureError> {
    let sos_future = |team: &TeamContext| {
        team.stats.as_ref().and_then(|s| s.sos_future).unwrap_or(0.5)
    };
    let home_stats = ctx.home.stats.as_ref();
    let away_stats = ctx.away.stats.as_ref();

    Ok(ScheduleFeatures {
        home_sos_past: ensure_finite(
            "home_sos_past",
            strength_of_schedule(&ctx.home.recent_games, home_stats),
        )?,
        away_sos_past: ensure_finite(
            "away_sos_past",
            strength_of_schedule(&ctx.away.recent_games, away_stats),
        )?,
        home_sos_future: ensure_finite("home_sos_future", sos_future(&ctx.home))?,
        away_sos_future: ensure_finite("away_sos_future", sos_future(&ctx.away))?,
        home_record_vs_quality: ensure_finite(
            "home_record_vs_quality",
            record_vs_quality(&ctx.home.recent_games, home_stats),
        )?,
        away_record_vs_quality: ensure_finite(
            "away_record_vs_quality",
            record_vs_quality(&ctx.away.recent_games, away_stats),
        )?,
        rest_days_home: rest_days(&ctx.home, game),
        rest_days_away: rest_days(&ctx.away, game),
    })
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VenueFeatures {
    pub travel_distance: f64,
    pub altitude_impact: f64,
}

pub fn compute_venue(game: &Game, ctx: &MatchupContext) -> Result<VenueFeatures, FeatureError> {
    let origin = ctx.away.stats.as_ref().and_then(|s| s.home_location);
    let destination = ctx
        .venue
        .as_ref()
        .and_then(|v| v.location)
        .or_else(|| ctx.home.stats.as_ref().and_then(|s| s.home_location));

    let travel_distance = match (origin, destination) {
        (Some(from), Some(to)) => ensure_finite("travel_distance", from.distance_miles(&to))?,
        _ => 0.0,
    };

    let altitude = match &ctx.venue {
        Some(venue) => altitude_impact(game.league, ensure_finite("elevation_ft", venue.elevation_ft)?),
        None => 0.0,
    };

    Ok(VenueFeatures {
        travel_distance,
        altitude_impact: altitude,
    })
}

pub fn compute_weather(game: &Game, ctx: &MatchupContext) -> Result<f64, FeatureError> {
    let Some(weather) = &game.weather else {
        return Ok(0.0);
    };
    let indoor = game.league.is_indoor()
        || ctx.venue.as_ref().map(|v| v.indoor).unwrap_or(false)
        || game.venue.as_deref().map(is_indoor_venue).unwrap_or(false);
    if indoor {
        return Ok(0.0);
    }
    ensure_finite("temperature", weather.temperature)?;
    ensure_finite("wind_speed", weather.wind_speed)?;
    ensure_finite("precipitation", weather.precipitation)?;
    Ok(weather_impact(game.league, weather))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GameResult, GeoPoint, RecentGame, TeamStats, VenueInfo};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn weather(temperature: f64, wind_speed: f64, precipitation: f64) -> Weather {
        Weather {
            temperature,
            wind_speed,
            precipitation,
            ..Default::default()
        }
    }

    #[test]
    fn test_nfl_weather() {
        assert_eq!(weather_impact(League::NFL, &weather(70.0, 5.0, 0.0)), 0.0);
        assert!(approx(weather_impact(League::NFL, &weather(20.0, 5.0, 0.0)), -0.15));
        // All three penalties clamp at the floor
        assert!(approx(weather_impact(League::NFL, &weather(20.0, 30.0, 0.5)), -0.3));
    }

    #[test]
    fn test_mlb_weather_wind_direction() {
        let mut w = weather(90.0, 15.0, 0.0);
        w.wind_direction = Some(230.0);
        assert!(approx(weather_impact(League::MLB, &w), 0.15));

        w.wind_direction = Some(30.0);
        assert!(approx(weather_impact(League::MLB, &w), -0.05));

        // Crosswind
        w.wind_direction = Some(135.0);
        assert!(approx(weather_impact(League::MLB, &w), 0.05));

        // Light wind ignored
        let mut calm = weather(45.0, 5.0, 0.2);
        calm.wind_direction = Some(225.0);
        assert!(approx(weather_impact(League::MLB, &calm), -0.1));
    }

    #[test]
    fn test_indoor_leagues_have_no_weather() {
        assert_eq!(weather_impact(League::NBA, &weather(-10.0, 50.0, 3.0)), 0.0);
        assert_eq!(weather_impact(League::NHL, &weather(-10.0, 50.0, 3.0)), 0.0);
    }

    #[test]
    fn test_domed_venue_ignores_weather() {
        let game = Game::new("Lions", "Bears", League::NFL, Utc::now())
            .with_venue("Ford Field Dome")
            .with_weather(weather(10.0, 40.0, 1.0));
        assert_eq!(compute_weather(&game, &MatchupContext::default()).unwrap(), 0.0);
        assert!(is_indoor_venue("Crypto.com Arena"));
        assert!(!is_indoor_venue("Lambeau Field"));
    }

    #[test]
    fn test_altitude_tiers() {
        assert_eq!(altitude_impact(League::MLB, 900.0), 0.0);
        assert_eq!(altitude_impact(League::MLB, 5280.0), 0.10);
        assert_eq!(altitude_impact(League::NFL, 5280.0), -0.03);
        assert_eq!(altitude_impact(League::NBA, 4000.0), -0.015);
        assert_eq!(altitude_impact(League::NHL, 1500.0), -0.005);
    }

    #[test]
    fn test_rest_days_clamped() {
        let game = Game::new(
            "H",
            "A",
            League::NBA,
            Utc.with_ymd_and_hms(2024, 3, 10, 19, 0, 0).unwrap(),
        );
        let mut team = TeamContext::default();
        assert_eq!(rest_days(&team, &game), 3.0);

        team.recent_games.push(RecentGame {
            date: NaiveDate::from_ymd_opt(2024, 3, 8).unwrap(),
            opponent: "X".into(),
            result: GameResult::Win,
            score_for: None,
            score_against: None,
            opponent_rating: None,
            margin: None,
        });
        assert_eq!(rest_days(&team, &game), 2.0);

        team.recent_games[0].date = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
        assert_eq!(rest_days(&team, &game), 14.0);
    }

    #[test]
    fn test_travel_distance_to_venue() {
        let game = Game::new("Chiefs", "Bills", League::NFL, Utc::now());
        let mut ctx = MatchupContext::default();
        let mut bills = TeamStats::unknown("Bills");
        bills.home_location = Some(GeoPoint::new(42.7738, -78.7870));
        ctx.away.stats = Some(bills);
        ctx.venue = Some(VenueInfo {
            name: "Arrowhead Stadium".into(),
            elevation_ft: 750.0,
            location: Some(GeoPoint::new(39.0489, -94.4839)),
            indoor: false,
        });

        let f = compute_venue(&game, &ctx).unwrap();
        assert!(f.travel_distance > 800.0 && f.travel_distance < 900.0);
        assert_eq!(f.altitude_impact, 0.0);
    }
}

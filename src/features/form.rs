//! Team strength, efficiency and recent-form features
//!
//! All helpers take recent games most-recent-first, as providers return them.

use super::ensure_finite;
use crate::domain::{GameResult, MatchupContext, RecentGame, TeamContext, TeamStats};
use crate::error::FeatureError;

/// Games considered by the weighted form calculation
pub const FORM_WINDOW: usize = 10;
/// Per-game decay applied to older results
pub const FORM_DECAY: f64 = 0.9;
/// Games decided by this many points or fewer count as close
pub const CLUTCH_MARGIN: f64 = 7.0;
/// Opponents rated at or above this are "quality"
pub const QUALITY_OPPONENT_RATING: f64 = 105.0;

const NEUTRAL: f64 = 0.5;
const DEFAULT_RATING: f64 = 100.0;
const DEFAULT_PACE: f64 = 100.0;

/// Win fraction of a W/L sequence
pub fn simple_form(results: &[GameResult]) -> f64 {
    if results.is_empty() {
        return NEUTRAL;
    }
    let wins = results.iter().filter(|r| r.is_win()).count();
    wins as f64 / results.len() as f64
}

/// Recency- and opponent-weighted win rate over the last [`FORM_WINDOW`] games
pub fn weighted_form(games: &[RecentGame]) -> f64 {
    let mut weighted = 0.0;
    let mut total_weight = 0.0;
    for (i, game) in games.iter().take(FORM_WINDOW).enumerate() {
        let weight = FORM_DECAY.powi(i as i32);
        let outcome = if game.result.is_win() { 1.0 } else { 0.0 };
        let strength = 0.5 + 0.5 * (game.opponent_rating.unwrap_or(DEFAULT_RATING) / 100.0);
        weighted += outcome * strength * weight;
        total_weight += weight;
    }
    if total_weight == 0.0 {
        NEUTRAL
    } else {
        weighted / total_weight
    }
}

/// Weighted form of the last five games minus the five before them
pub fn form_trend(games: &[RecentGame]) -> f64 {
    if games.len() < 6 {
        return 0.0;
    }
    let recent = weighted_form(&games[..5]);
    let end = games.len().min(FORM_WINDOW);
    let older = weighted_form(&games[5..end]);
    recent - older
}

/// Win fraction in close games
pub fn clutch_performance(games: &[RecentGame]) -> f64 {
    let close: Vec<&RecentGame> = games
        .iter()
        .filter(|g| matches!(g.point_margin(), Some(m) if m.abs() <= CLUTCH_MARGIN))
        .collect();
    if close.is_empty() {
        return NEUTRAL;
    }
    close.iter().filter(|g| g.result.is_win()).count() as f64 / close.len() as f64
}

/// Average margin size scaled so a 20-point average is 1.0
pub fn blowout_tendency(games: &[RecentGame]) -> f64 {
    let margins: Vec<f64> = games.iter().filter_map(|g| g.point_margin()).collect();
    if margins.is_empty() {
        return NEUTRAL;
    }
    let mean = margins.iter().map(|m| m.abs()).sum::<f64>() / margins.len() as f64;
    (mean / 20.0).clamp(0.0, 1.0)
}

/// Past schedule strength from opponent ratings, falling back to the provider value
pub fn strength_of_schedule(games: &[RecentGame], stats: Option<&TeamStats>) -> f64 {
    let normalized: Vec<f64> = games
        .iter()
        .filter_map(|g| g.opponent_rating)
        .map(|r| ((r - 80.0) / 40.0).clamp(0.0, 1.0))
        .collect();
    if !normalized.is_empty() {
        return normalized.iter().sum::<f64>() / normalized.len() as f64;
    }
    stats.and_then(|s| s.sos_past).unwrap_or(NEUTRAL)
}

/// Win fraction against quality opponents, preferring the provider value
pub fn record_vs_quality(games: &[RecentGame], stats: Option<&TeamStats>) -> f64 {
    if let Some(rvq) = stats.and_then(|s| s.record_vs_quality) {
        return rvq;
    }
    let quality: Vec<&RecentGame> = games
        .iter()
        .filter(|g| matches!(g.opponent_rating, Some(r) if r >= QUALITY_OPPONENT_RATING))
        .collect();
    if quality.is_empty() {
        return NEUTRAL;
    }
    quality.iter().filter(|g| g.result.is_win()).count() as f64 / quality.len() as f64
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamFeatures {
    pub home_win_rate: f64,
    pub away_win_rate: f64,
    pub recent_form_home: f64,
    pub recent_form_away: f64,
    pub head_to_head_record: f64,
}

impl Default for TeamFeatures {
    fn default() -> Self {
        Self {
            home_win_rate: NEUTRAL,
            away_win_rate: NEUTRAL,
            recent_form_home: NEUTRAL,
            recent_form_away: NEUTRAL,
            head_to_head_record: NEUTRAL,
        }
    }
}

fn team_record(team: &TeamContext) -> (f64, f64) {
    let win_rate = team.stats.as_ref().map(|s| s.win_percentage).unwrap_or(NEUTRAL);
    let form = match team.stats.as_ref() {
        Some(s) if !s.recent_form.is_empty() => simple_form(&s.recent_form),
        _ => {
            let results: Vec<GameResult> = team.recent_games.iter().map(|g| g.result).collect();
            simple_form(&results)
        }
    };
    (win_rate, form)
}

pub fn compute_team(ctx: &MatchupContext) -> Result<TeamFeatures, FeatureError> {
    let (home_win_rate, recent_form_home) = team_record(&ctx.home);
    let (away_win_rate, recent_form_away) = team_record(&ctx.away);
    Ok(TeamFeatures {
        home_win_rate: ensure_finite("home_win_rate", home_win_rate)?,
        away_win_rate: ensure_finite("away_win_rate", away_win_rate)?,
        recent_form_home,
        recent_form_away,
        // No head-to-head source yet
        head_to_head_record: NEUTRAL,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyFeatures {
    pub home_offensive_rating: f64,
    pub home_defensive_rating: f64,
    pub away_offensive_rating: f64,
    pub away_defensive_rating: f64,
    pub home_net_rating: f64,
    pub away_net_rating: f64,
    pub home_pace: f64,
    pub away_pace: f64,
    pub offensive_matchup_advantage: f64,
    pub defensive_matchup_advantage: f64,
    pub pace_differential: f64,
}

impl Default for EfficiencyFeatures {
    fn default() -> Self {
        Self {
            home_offensive_rating: DEFAULT_RATING,
            home_defensive_rating: DEFAULT_RATING,
            away_offensive_rating: DEFAULT_RATING,
            away_defensive_rating: DEFAULT_RATING,
            home_net_rating: 0.0,
            away_net_rating: 0.0,
            home_pace: DEFAULT_PACE,
            away_pace: DEFAULT_PACE,
            offensive_matchup_advantage: 0.0,
            defensive_matchup_advantage: 0.0,
            pace_differential: 0.0,
        }
    }
}

fn ratings(team: &TeamContext) -> (f64, f64, f64) {
    let stats = team.stats.as_ref();
    (
        stats.and_then(|s| s.offensive_rating).unwrap_or(DEFAULT_RATING),
        stats.and_then(|s| s.defensive_rating).unwrap_or(DEFAULT_RATING),
        stats.and_then(|s| s.pace).unwrap_or(DEFAULT_PACE),
    )
}

pub fn compute_efficiency(ctx: &MatchupContext) -> Result<EfficiencyFeatures, FeatureError> {
    let (home_off, home_def, home_pace) = ratings(&ctx.home);
    let (away_off, away_def, away_pace) = ratings(&ctx.away);

    Ok(EfficiencyFeatures {
        home_offensive_rating: ensure_finite("home_offensive_rating", home_off)?,
        home_defensive_rating: ensure_finite("home_defensive_rating", home_def)?,
        away_offensive_rating: ensure_finite("away_offensive_rating", away_off)?,
        away_defensive_rating: ensure_finite("away_defensive_rating", away_def)?,
        home_net_rating: home_off - home_def,
        away_net_rating: away_off - away_def,
        home_pace: ensure_finite("home_pace", home_pace)?,
        away_pace: ensure_finite("away_pace", away_pace)?,
        offensive_matchup_advantage: home_off - away_def,
        defensive_matchup_advantage: away_off - home_def,
        pace_differential: (home_pace - away_pace).abs(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormFeatures {
    pub home_weighted_form: f64,
    pub away_weighted_form: f64,
    pub home_form_trend: f64,
    pub away_form_trend: f64,
    pub home_clutch_performance: f64,
    pub away_clutch_performance: f64,
    pub home_blowout_tendency: f64,
    pub away_blowout_tendency: f64,
}

impl Default for FormFeatures {
    fn default() -> Self {
        Self {
            home_weighted_form: NEUTRAL,
            away_weighted_form: NEUTRAL,
            home_form_trend: 0.0,
            away_form_trend: 0.0,
            home_clutch_performance: NEUTRAL,
            away_clutch_performance: NEUTRAL,
            home_blowout_tendency: NEUTRAL,
            away_blowout_tendency: NEUTRAL,
        }
    }
}

pub fn compute_form(ctx: &MatchupContext) -> Result<FormFeatures, FeatureError> {
    let home = &ctx.home.recent_games;
    let away = &ctx.away.recent_games;
    Ok(FormFeatures {
        home_weighted_form: ensure_finite("home_weighted_form", weighted_form(home))?,
        away_weighted_form: ensure_finite("away_weighted_form", weighted_form(away))?,
        home_form_trend: ensure_finite("home_form_trend", form_trend(home))?,
        away_form_trend: ensure_finite("away_form_trend", form_trend(away))?,
        home_clutch_performance: clutch_performance(home),
        away_clutch_performance: clutch_performance(away),
        home_blowout_tendency: ensure_finite("home_blowout_tendency", blowout_tendency(home))?,
        away_blowout_tendency: ensure_finite("away_blowout_tendency", blowout_tendency(away))?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn game(result: GameResult, opponent_rating: Option<f64>, margin: Option<f64>) -> RecentGame {
        RecentGame {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            opponent: "Opp".into(),
            result,
            score_for: None,
            score_against: None,
            opponent_rating,
            margin,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_simple_form() {
        use GameResult::*;
        assert_eq!(simple_form(&[]), 0.5);
        assert_eq!(simple_form(&[Win, Win, Loss, Win]), 0.75);
    }

    #[test]
    fn test_weighted_form_decay_and_strength() {
        assert_eq!(weighted_form(&[]), 0.5);

        // Win then loss, default-rated opponents: 1 / (1 + 0.9)
        let games = vec![
            game(GameResult::Win, None, None),
            game(GameResult::Loss, None, None),
        ];
        assert!(approx(weighted_form(&games), 1.0 / 1.9));

        // Beating a weaker opponent counts for less
        let weak = vec![game(GameResult::Win, Some(80.0), None)];
        assert!(approx(weighted_form(&weak), 0.9));
    }

    #[test]
    fn test_weighted_form_is_deterministic_and_windowed() {
        let mut games: Vec<RecentGame> = (0..10).map(|_| game(GameResult::Loss, None, None)).collect();
        games.extend((0..5).map(|_| game(GameResult::Win, None, None)));
        assert_eq!(weighted_form(&games), 0.0);
        assert_eq!(weighted_form(&games), weighted_form(&games));
    }

    #[test]
    fn test_form_trend() {
        let five = vec![game(GameResult::Win, None, None); 5];
        assert_eq!(form_trend(&five), 0.0);

        let mut games = vec![game(GameResult::Win, None, None); 5];
        games.extend(vec![game(GameResult::Loss, None, None); 5]);
        assert!(approx(form_trend(&games), 1.0));
    }

    #[test]
    fn test_clutch_and_blowout() {
        let games = vec![
            game(GameResult::Win, None, Some(3.0)),
            game(GameResult::Loss, None, Some(-7.0)),
            game(GameResult::Win, None, Some(28.0)),
        ];
        assert!(approx(clutch_performance(&games), 0.5));
        assert!(approx(blowout_tendency(&games), (38.0 / 3.0) / 20.0));
        assert_eq!(clutch_performance(&[]), 0.5);
        assert_eq!(blowout_tendency(&[]), 0.5);

        let routs = vec![game(GameResult::Win, None, Some(45.0))];
        assert_eq!(blowout_tendency(&routs), 1.0);
    }

    #[test]
    fn test_strength_of_schedule_fallbacks() {
        let games = vec![
            game(GameResult::Win, Some(120.0), None),
            game(GameResult::Win, Some(100.0), None),
            game(GameResult::Win, Some(60.0), None),
        ];
        assert!(approx(strength_of_schedule(&games, None), (1.0 + 0.5 + 0.0) / 3.0));

        let mut stats = TeamStats::unknown("T");
        stats.sos_past = Some(0.62);
        assert_eq!(strength_of_schedule(&[], Some(&stats)), 0.62);
        assert_eq!(strength_of_schedule(&[], None), 0.5);
    }

    #[test]
    fn test_record_vs_quality() {
        let games = vec![
            game(GameResult::Win, Some(110.0), None),
            game(GameResult::Loss, Some(105.0), None),
            game(GameResult::Loss, Some(90.0), None),
        ];
        assert!(approx(record_vs_quality(&games, None), 0.5));

        let mut stats = TeamStats::unknown("T");
        stats.record_vs_quality = Some(0.8);
        assert_eq!(record_vs_quality(&games, Some(&stats)), 0.8);
    }

    #[test]
    fn test_efficiency_matchups() {
        let mut ctx = MatchupContext::default();
        let mut home = TeamStats::unknown("H");
        home.offensive_rating = Some(115.0);
        home.defensive_rating = Some(105.0);
        home.pace = Some(101.0);
        let mut away = TeamStats::unknown("A");
        away.offensive_rating = Some(110.0);
        away.defensive_rating = Some(108.0);
        away.pace = Some(97.0);
        ctx.home.stats = Some(home);
        ctx.away.stats = Some(away);

        let f = compute_efficiency(&ctx).unwrap();
        assert_eq!(f.offensive_matchup_advantage, 7.0);
        assert_eq!(f.defensive_matchup_advantage, 5.0);
        assert_eq!(f.home_net_rating, 10.0);
        assert_eq!(f.pace_differential, 4.0);
    }

    #[test]
    fn test_non_finite_rating_fails_group() {
        let mut ctx = MatchupContext::default();
        let mut stats = TeamStats::unknown("H");
        stats.offensive_rating = Some(f64::NAN);
        ctx.home.stats = Some(stats);
        assert!(compute_efficiency(&ctx).is_err());
    }
}

//! Injury impact scoring
//!
//! Each report contributes `tier base * status severity`; a team's total is
//! floored so a decimated roster cannot dominate every other signal.

use super::ensure_finite;
use crate::domain::{Game, ImpactTier, InjuryReport, InjuryStatus, League, MatchupContext};
use crate::error::FeatureError;

pub const IMPACT_FLOOR: f64 = -0.5;

pub fn tier_base(tier: ImpactTier) -> f64 {
    match tier {
        ImpactTier::High => -0.15,
        ImpactTier::Medium => -0.08,
        ImpactTier::Low => -0.03,
    }
}

pub fn status_multiplier(status: InjuryStatus) -> f64 {
    match status {
        InjuryStatus::Out => 1.5,
        InjuryStatus::Doubtful => 1.2,
        InjuryStatus::Questionable => 0.8,
        InjuryStatus::Probable => 1.0,
    }
}

type TierTable = [&'static [&'static str]; 3];

const NFL_TIERS: TierTable = [
    &["QB"],
    &["RB", "WR", "TE", "OL", "LT", "EDGE", "DE", "CB", "LB"],
    &[],
];
const NBA_TIERS: TierTable = [&["PG", "C"], &["SG", "SF", "PF", "G", "F"], &[]];
const MLB_TIERS: TierTable = [
    &["SP"],
    &["C", "SS", "CF", "2B", "3B", "1B", "LF", "RF", "DH", "CL"],
    &["RP"],
];
const NHL_TIERS: TierTable = [&["G"], &["C", "D"], &["LW", "RW", "W", "F"]];

fn tier_table(league: League) -> &'static TierTable {
    match league {
        League::NFL => &NFL_TIERS,
        League::NBA => &NBA_TIERS,
        League::MLB => &MLB_TIERS,
        League::NHL => &NHL_TIERS,
    }
}

/// Tier of a listed position, None when the league table doesn't name it
pub fn position_tier(league: League, position: &str) -> Option<ImpactTier> {
    let pos = position.trim().to_ascii_uppercase();
    let [high, medium, low] = tier_table(league);
    if high.contains(&pos.as_str()) {
        Some(ImpactTier::High)
    } else if medium.contains(&pos.as_str()) {
        Some(ImpactTier::Medium)
    } else if low.contains(&pos.as_str()) {
        Some(ImpactTier::Low)
    } else {
        None
    }
}

/// Resolved tier for a structured report
pub fn report_tier(league: League, report: &InjuryReport) -> ImpactTier {
    position_tier(league, &report.position)
        .or(report.impact)
        .unwrap_or(ImpactTier::Low)
}

pub fn report_impact(league: League, report: &InjuryReport) -> f64 {
    tier_base(report_tier(league, report)) * status_multiplier(report.status)
}

/// Summed impact of a team's injury report
pub fn team_injury_impact(league: League, reports: &[InjuryReport]) -> f64 {
    let total: f64 = reports.iter().map(|r| report_impact(league, r)).sum();
    total.max(IMPACT_FLOOR)
}

/// Impact of free-text injury notes ("Patrick Mahomes QB (Out)").
///
/// Notes without a recognisable status are ignored. A note with no listed
/// position counts as a Medium-tier player.
pub fn game_injury_impact(league: League, notes: &[String]) -> f64 {
    let total: f64 = notes
        .iter()
        .filter_map(|note| {
            let status = InjuryStatus::find_in(note)?;
            let tier = note
                .split(|c: char| !c.is_ascii_alphanumeric())
                .filter(|w| !w.is_empty())
                .find_map(|w| position_tier(league, w))
                .unwrap_or(ImpactTier::Medium);
            Some(tier_base(tier) * status_multiplier(status))
        })
        .sum();
    total.max(IMPACT_FLOOR)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjuryFeatures {
    pub injury_impact: f64,
    pub home_injury_impact: f64,
    pub away_injury_impact: f64,
}

pub fn compute(game: &Game, ctx: &MatchupContext) -> Result<InjuryFeatures, FeatureError> {
    let notes = game.injuries.as_deref().unwrap_or_default();
    Ok(InjuryFeatures {
        injury_impact: ensure_finite("injury_impact", game_injury_impact(game.league, notes))?,
        home_injury_impact: team_injury_impact(game.league, &ctx.home.injuries),
        away_injury_impact: team_injury_impact(game.league, &ctx.away.injuries),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(position: &str, status: InjuryStatus) -> InjuryReport {
        InjuryReport {
            player: "Player".into(),
            position: position.into(),
            status,
            injury: "Ankle".into(),
            impact: None,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_out_worse_than_probable() {
        let out = report_impact(League::NFL, &report("QB", InjuryStatus::Out));
        let probable = report_impact(League::NFL, &report("QB", InjuryStatus::Probable));
        assert!(out < probable);
        assert!(approx(out, -0.225));
        assert!(approx(probable, -0.15));
    }

    #[test]
    fn test_league_position_tiers() {
        assert_eq!(position_tier(League::NBA, "pg"), Some(ImpactTier::High));
        assert_eq!(position_tier(League::MLB, "SP"), Some(ImpactTier::High));
        assert_eq!(position_tier(League::MLB, "RP"), Some(ImpactTier::Low));
        assert_eq!(position_tier(League::NHL, "G"), Some(ImpactTier::High));
        assert_eq!(position_tier(League::NFL, "K"), None);
    }

    #[test]
    fn test_unknown_position_uses_reported_tier() {
        let mut r = report("K", InjuryStatus::Questionable);
        assert_eq!(report_tier(League::NFL, &r), ImpactTier::Low);
        r.impact = Some(ImpactTier::High);
        assert_eq!(report_tier(League::NFL, &r), ImpactTier::High);
    }

    #[test]
    fn test_team_impact_floor() {
        let reports = vec![report("QB", InjuryStatus::Out); 5];
        assert_eq!(team_injury_impact(League::NFL, &reports), IMPACT_FLOOR);
        assert_eq!(team_injury_impact(League::NFL, &[]), 0.0);
    }

    #[test]
    fn test_game_injury_notes() {
        let notes = vec![
            "Patrick Mahomes QB (Out)".to_string(),
            "Travis Kelce (Questionable)".to_string(),
            "Depth chart update".to_string(),
        ];
        let impact = game_injury_impact(League::NFL, &notes);
        assert!(approx(impact, -0.225 + -0.08 * 0.8));
    }
}

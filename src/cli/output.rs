//! Output formatting for `pickwise` commands.
//!
//! Supports two modes: human-readable tables (default) and JSON (--json).

use serde::Serialize;
use tabled::{Table, Tabled};

use crate::domain::Pick;
use crate::features::FeatureVector;
use crate::scoring::ScoredCandidate;
use crate::selection::Viability;

/// Output mode for command results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Table,
    Json,
}

impl OutputMode {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputMode::Json
        } else {
            OutputMode::Table
        }
    }
}

/// Print a vec of Tabled + Serialize items in the chosen mode.
pub fn print_items<T: Tabled + Serialize>(items: &[T], mode: OutputMode) -> anyhow::Result<()> {
    match mode {
        OutputMode::Table => {
            if items.is_empty() {
                println!("(no results)");
            } else {
                let table = Table::new(items).to_string();
                println!("{table}");
            }
        }
        OutputMode::Json => {
            let json = serde_json::to_string_pretty(items)?;
            println!("{json}");
        }
    }
    Ok(())
}

/// Print a single Serialize item as pretty JSON.
pub fn print_item<T: Serialize>(item: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(item)?);
    Ok(())
}

/// Print a warning message.
pub fn print_warn(msg: &str) {
    println!("\x1b[33m{msg}\x1b[0m");
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("\x1b[31m{msg}\x1b[0m");
}

#[derive(Debug, Serialize, Tabled)]
pub struct PickRow {
    pub selection: String,
    pub league: String,
    pub odds: f64,
    pub confidence: String,
    pub expected_value: String,
    pub risk: String,
    pub model: String,
}

impl From<&Pick> for PickRow {
    fn from(pick: &Pick) -> Self {
        Self {
            selection: pick.selection.clone(),
            league: pick.league.to_string(),
            odds: pick.odds,
            confidence: format!("{:.1}", pick.confidence),
            expected_value: pick
                .expected_value
                .map(|ev| format!("{:+.4}", ev))
                .unwrap_or_else(|| "-".to_string()),
            risk: pick.rationale.risk_assessment.clone(),
            model: pick.model_version.clone(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct CandidateRow {
    pub rank: usize,
    pub game: usize,
    pub team: String,
    pub odds: String,
    pub win_prob: String,
    pub confidence: String,
    pub ev: String,
    pub verdict: String,
}

impl CandidateRow {
    pub fn new(rank: usize, candidate: &ScoredCandidate, viability: &Viability) -> Self {
        Self {
            rank,
            game: candidate.game_index,
            team: candidate.team.clone(),
            odds: candidate
                .odds
                .map(|o| format!("{:+}", o))
                .unwrap_or_else(|| "-".to_string()),
            win_prob: format!("{:.3}", candidate.win_probability),
            confidence: format!("{:.1}", candidate.confidence),
            ev: format!("{:+.4}", candidate.expected_value),
            verdict: viability.to_string(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct FeatureRow {
    pub game: String,
    pub feature: String,
    pub value: String,
}

/// Flatten one game's vector into rows, degraded groups last
pub fn feature_rows(matchup: &str, features: &FeatureVector) -> Vec<FeatureRow> {
    let mut rows: Vec<FeatureRow> = features
        .named_values()
        .into_iter()
        .map(|(name, value)| FeatureRow {
            game: matchup.to_string(),
            feature: name.to_string(),
            value: format!("{:.4}", value),
        })
        .collect();
    for group in &features.degraded {
        rows.push(FeatureRow {
            game: matchup.to_string(),
            feature: format!("degraded:{}", group),
            value: "defaults".to_string(),
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureGroup;

    #[test]
    fn test_output_mode_from_flag() {
        assert_eq!(OutputMode::from_json_flag(true), OutputMode::Json);
        assert_eq!(OutputMode::from_json_flag(false), OutputMode::Table);
    }

    #[test]
    fn test_feature_rows_list_degraded_groups_last() {
        let mut features = FeatureVector::default();
        features.degraded.insert(FeatureGroup::Weather);

        let rows = feature_rows("Bills @ Chiefs", &features);
        assert_eq!(rows.len(), features.named_values().len() + 1);
        let last = rows.last().unwrap();
        assert_eq!(last.feature, "degraded:weather");
        assert!(rows.iter().all(|r| r.game == "Bills @ Chiefs"));
    }
}

//! One-shot command implementations
//!
//! Each command loads a request file, builds a fresh engine from
//! configuration and prints the result in the chosen output mode.

use anyhow::Context;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, warn};

use super::output::{
    feature_rows, print_item, print_items, print_warn, CandidateRow, OutputMode, PickRow,
};
use super::RequestArgs;
use crate::config::AppConfig;
use crate::domain::PickRequest;
use crate::provider::{layered, SimulatedProvider, TeamStatsProvider};
use crate::scoring::CandidateScorer;
use crate::selection::SelectionEngine;

/// Read a request from a file, or stdin for `-`
pub fn read_request(path: &Path) -> anyhow::Result<PickRequest> {
    let raw = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("reading request file {}", path.display()))?
    };
    serde_json::from_str(&raw).context("parsing pick request")
}

/// Read the request and apply command-line threshold overrides
pub fn load_request(args: &RequestArgs) -> anyhow::Result<PickRequest> {
    let mut request = read_request(&args.request)?;
    if args.min_odds.is_some() || args.max_odds.is_some() {
        let min = args.min_odds.unwrap_or(request.min_odds);
        let max = args.max_odds.unwrap_or(request.max_odds);
        request = request.with_odds_window(min, max);
    }
    if let Some(min_confidence) = args.min_confidence {
        request = request.with_min_confidence(min_confidence);
    }
    Ok(request)
}

/// Simulated provider wrapped in the configured limiter and cache
pub fn simulated_provider(
    config: &AppConfig,
    request: Option<&PickRequest>,
) -> Arc<dyn TeamStatsProvider> {
    let base = match request {
        Some(r) => SimulatedProvider::new(r.date),
        None => SimulatedProvider::default(),
    };
    layered(Arc::new(base), &config.provider)
}

fn engine_for(config: &AppConfig, args: &RequestArgs, request: &PickRequest) -> SelectionEngine {
    let scorer = CandidateScorer::from_config(&config.scoring);
    if !scorer.is_ready() {
        print_warn("Configured scoring strategy unavailable; using heuristic");
    }
    let provider = args
        .simulated
        .then(|| simulated_provider(config, Some(request)));
    debug!(
        "Engine: strategy={} provider={}",
        scorer.strategy_name(),
        if provider.is_some() { "simulated" } else { "none" }
    );
    SelectionEngine::from_config(config, scorer, provider)
}

pub fn run_pick(config: &AppConfig, args: &RequestArgs) -> anyhow::Result<()> {
    let request = load_request(args)?;
    let engine = engine_for(config, args, &request);
    let pick = engine.select(&request)?;

    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json => print_item(&pick)?,
        OutputMode::Table => {
            print_items(&[PickRow::from(&pick)], OutputMode::Table)?;
            println!();
            println!("{}", pick.rationale.reasoning);
            for insight in &pick.rationale.key_insights {
                println!("  - {}", insight);
            }
        }
    }
    Ok(())
}

pub fn run_rank(config: &AppConfig, args: &RequestArgs) -> anyhow::Result<()> {
    let request = load_request(args)?;
    let engine = engine_for(config, args, &request);
    let ranked = engine.rank(&request)?;

    if !ranked.iter().any(|(_, v)| v.is_viable()) {
        warn!("No viable candidate among {} evaluated", ranked.len());
    }

    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json => {
            let items: Vec<serde_json::Value> = ranked
                .iter()
                .map(|(candidate, viability)| {
                    serde_json::json!({
                        "candidate": candidate,
                        "viability": viability,
                    })
                })
                .collect();
            print_item(&items)?;
        }
        OutputMode::Table => {
            let rows: Vec<CandidateRow> = ranked
                .iter()
                .enumerate()
                .map(|(i, (c, v))| CandidateRow::new(i + 1, c, v))
                .collect();
            print_items(&rows, OutputMode::Table)?;
        }
    }
    Ok(())
}

pub fn run_features(config: &AppConfig, args: &RequestArgs) -> anyhow::Result<()> {
    let request = load_request(args)?;
    let engine = engine_for(config, args, &request);
    let vectors = engine.features(&request)?;

    match OutputMode::from_json_flag(args.json) {
        OutputMode::Json => {
            let items: Vec<serde_json::Value> = vectors
                .iter()
                .map(|(game, features)| {
                    serde_json::json!({
                        "game": game.matchup(),
                        "features": features,
                    })
                })
                .collect();
            print_item(&items)?;
        }
        OutputMode::Table => {
            let rows: Vec<_> = vectors
                .iter()
                .flat_map(|(game, features)| feature_rows(&game.matchup(), features))
                .collect();
            print_items(&rows, OutputMode::Table)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_read_request_file() {
        let path = std::env::temp_dir().join(format!("pickwise-req-{}.json", uuid::Uuid::new_v4()));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"date":"2024-01-21","games":[{{"home_team":"Chiefs","away_team":"Bills","league":"NFL","start_time":"2024-01-21T18:00:00Z","odds":{{"home_ml":-120,"away_ml":100}}}}],"min_confidence":50}}"#
        )
        .unwrap();

        let request = read_request(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(request.games.len(), 1);
        assert_eq!(request.min_confidence, 50.0);
        assert_eq!(request.min_odds, -200);
    }

    #[test]
    fn test_overrides_replace_request_thresholds() {
        let path = std::env::temp_dir().join(format!("pickwise-req-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(&path, r#"{"date":"2024-01-21","games":[],"max_odds":250}"#).unwrap();

        let args = RequestArgs {
            request: path.clone(),
            simulated: false,
            json: false,
            min_odds: Some(-150),
            max_odds: None,
            min_confidence: Some(55.0),
        };
        let request = load_request(&args).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(request.min_odds, -150);
        assert_eq!(request.max_odds, 250);
        assert_eq!(request.min_confidence, 55.0);
    }

    #[test]
    fn test_read_request_missing_file() {
        let err = read_request(Path::new("/nonexistent/request.json")).unwrap_err();
        assert!(err.to_string().contains("reading request file"));
    }
}

//! Pickwise CLI
//!
//! Commands:
//! - `pickwise pick` - Choose the single best moneyline pick for a request
//! - `pickwise rank` - Score every candidate and show its viability verdict
//! - `pickwise features` - Dump the engineered feature vectors
//! - `pickwise serve` - Run the HTTP API

pub mod commands;
pub mod output;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Moneyline pick engine CLI
#[derive(Parser, Debug)]
#[command(name = "pickwise")]
#[command(author, version, about = "Moneyline pick engine for NFL, NBA, MLB and NHL slates")]
pub struct Cli {
    /// Configuration directory (default.toml plus $PICKWISE_ENV overlay)
    #[arg(short, long, global = true, default_value = "config")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Choose the best pick for a request file
    Pick(RequestArgs),

    /// Rank every candidate with its viability verdict
    Rank(RequestArgs),

    /// Dump feature vectors for each game
    Features(RequestArgs),

    /// Serve the pick API over HTTP
    Serve {
        /// Port to listen on (overrides api.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enrich games from the deterministic simulated provider
        #[arg(long)]
        simulated: bool,
    },
}

#[derive(Args, Debug, Clone)]
pub struct RequestArgs {
    /// JSON pick request file, `-` reads stdin
    #[arg(short, long)]
    pub request: PathBuf,

    /// Enrich games from the deterministic simulated provider
    #[arg(long)]
    pub simulated: bool,

    /// Print JSON instead of tables
    #[arg(long)]
    pub json: bool,

    /// Override the request's lowest acceptable price
    #[arg(long, allow_hyphen_values = true)]
    pub min_odds: Option<i32>,

    /// Override the request's highest acceptable price
    #[arg(long, allow_hyphen_values = true)]
    pub max_odds: Option<i32>,

    /// Override the request's confidence floor
    #[arg(long)]
    pub min_confidence: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick_command() {
        let cli = Cli::try_parse_from([
            "pickwise",
            "--config",
            "/etc/pickwise",
            "pick",
            "--request",
            "slate.json",
            "--simulated",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/etc/pickwise"));
        match cli.command {
            Commands::Pick(args) => {
                assert_eq!(args.request, PathBuf::from("slate.json"));
                assert!(args.simulated);
                assert!(!args.json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["pickwise", "serve"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("config"));
        assert!(matches!(
            cli.command,
            Commands::Serve {
                port: None,
                simulated: false
            }
        ));
    }

    #[test]
    fn test_parse_threshold_overrides() {
        let cli = Cli::try_parse_from([
            "pickwise",
            "rank",
            "-r",
            "-",
            "--min-odds",
            "-150",
            "--min-confidence",
            "55",
        ])
        .unwrap();
        let Commands::Rank(args) = cli.command else {
            panic!("expected rank");
        };
        assert_eq!(args.min_odds, Some(-150));
        assert_eq!(args.max_odds, None);
        assert_eq!(args.min_confidence, Some(55.0));
    }

    #[test]
    fn test_request_is_required() {
        assert!(Cli::try_parse_from(["pickwise", "rank"]).is_err());
    }
}

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod features;
pub mod provider;
pub mod rationale;
pub mod scoring;
pub mod selection;
pub mod services;
pub mod validation;

pub use config::AppConfig;
pub use domain::{Game, League, Pick, PickRequest, Side};
pub use error::{PickwiseError, Result};
pub use features::{FeatureEngineer, FeatureVector};
pub use provider::{SimulatedProvider, TeamStatsProvider};
pub use scoring::{CandidateScorer, ScoringStrategy, StrategyKind};
pub use selection::{fallback_pick, SelectionEngine};

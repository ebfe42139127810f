//! Candidate scoring
//!
//! A [`ScoringStrategy`] turns features into a win probability and a
//! confidence for one side of one game. [`CandidateScorer`] wraps the active
//! strategy, adds expected value and substitutes a conservative result when
//! the strategy fails for a single candidate.

pub mod ev;
pub mod heuristic;
pub mod model;

pub use ev::{decimal_payout, expected_value};
pub use heuristic::{Heuristic, OddsBand, WeightedHeuristic};
pub use model::{DenseNetwork, TrainedModel};

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::ScoringConfig;
use crate::domain::{model_version, FactorWeight, Game, Rationale, Side};
use crate::error::ScoringError;
use crate::features::FeatureVector;

/// Everything a strategy sees for one candidate
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub game: &'a Game,
    pub features: &'a FeatureVector,
    pub side: Side,
    /// Moneyline for `side` (0.0 when not listed)
    pub odds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyOutput {
    pub win_probability: f64,
    pub confidence: f64,
    /// Ordered most important first
    pub feature_importance: Vec<FactorWeight>,
}

pub trait ScoringStrategy: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &'static str;

    fn model_version(&self) -> &str;

    fn evaluate(&self, input: &ScoringInput<'_>) -> Result<StrategyOutput, ScoringError>;
}

/// Strategy selected by `scoring.strategy`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Heuristic,
    #[default]
    WeightedHeuristic,
    TrainedModel,
}

impl std::str::FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "heuristic" => Ok(StrategyKind::Heuristic),
            "weighted_heuristic" | "weighted" => Ok(StrategyKind::WeightedHeuristic),
            "trained_model" | "model" => Ok(StrategyKind::TrainedModel),
            other => Err(format!("unknown scoring strategy: {}", other)),
        }
    }
}

/// One scored (game, side) pairing
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCandidate {
    /// Position of the game in the request
    pub game_index: usize,
    pub side: Side,
    pub team: String,
    pub odds: Option<f64>,
    pub win_probability: f64,
    pub confidence: f64,
    pub expected_value: f64,
    pub feature_importance: Vec<FactorWeight>,
    pub model_version: String,
    /// Strategy failed and the conservative default was used
    pub scoring_fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<Rationale>,
}

impl ScoredCandidate {
    /// `expected_value * confidence / 100`
    pub fn ev_weighted_confidence(&self) -> f64 {
        self.expected_value * self.confidence / 100.0
    }
}

/// Shared scorer; cheap to clone
#[derive(Debug, Clone)]
pub struct CandidateScorer {
    strategy: Arc<dyn ScoringStrategy>,
    degraded: bool,
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(Arc::new(WeightedHeuristic::default()))
    }
}

impl CandidateScorer {
    pub fn new(strategy: Arc<dyn ScoringStrategy>) -> Self {
        Self {
            strategy,
            degraded: false,
        }
    }

    /// Build the configured strategy. A trained model that fails to load
    /// falls back to [`Heuristic`] and marks the scorer degraded.
    pub fn from_config(config: &ScoringConfig) -> Self {
        match config.strategy {
            StrategyKind::Heuristic => Self::new(Arc::new(Heuristic)),
            StrategyKind::WeightedHeuristic => {
                Self::new(Arc::new(WeightedHeuristic::new(OddsBand::from_config(config))))
            }
            StrategyKind::TrainedModel => {
                let loaded = match &config.model_path {
                    Some(path) => TrainedModel::load(path),
                    None => Err(crate::error::PickwiseError::Model(
                        "no model_path configured".to_string(),
                    )),
                };
                match loaded {
                    Ok(model) => Self::new(Arc::new(model)),
                    Err(e) => {
                        error!("Trained model unavailable, falling back to heuristic: {}", e);
                        Self {
                            strategy: Arc::new(Heuristic),
                            degraded: true,
                        }
                    }
                }
            }
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    pub fn model_version(&self) -> &str {
        self.strategy.model_version()
    }

    /// False when the configured strategy could not be loaded
    pub fn is_ready(&self) -> bool {
        !self.degraded
    }

    /// Score one side of a game. Never fails.
    pub fn score(
        &self,
        game_index: usize,
        game: &Game,
        features: &FeatureVector,
        side: Side,
    ) -> ScoredCandidate {
        let odds = game.moneyline(side).filter(|o| *o != 0.0 && o.is_finite());
        let input = ScoringInput {
            game,
            features,
            side,
            odds: odds.unwrap_or(0.0),
        };

        let scored = self.strategy.evaluate(&input).and_then(|out| {
            let ev = match odds {
                Some(o) => expected_value(out.win_probability, o)?,
                None => 0.0,
            };
            Ok((out, ev))
        });

        match scored {
            Ok((out, ev)) => {
                debug!(
                    "Scored {} {} ({}): p={:.3}, confidence={:.1}, ev={:.4}",
                    game.team(side),
                    side,
                    self.strategy.name(),
                    out.win_probability,
                    out.confidence,
                    ev
                );
                ScoredCandidate {
                    game_index,
                    side,
                    team: game.team(side).to_string(),
                    odds,
                    win_probability: out.win_probability,
                    confidence: out.confidence,
                    expected_value: ev,
                    feature_importance: out.feature_importance,
                    model_version: self.strategy.model_version().to_string(),
                    scoring_fallback: false,
                    rationale: None,
                }
            }
            Err(e) => {
                warn!(
                    "Scoring failed for {} {}, using conservative default: {}",
                    game.team(side),
                    side,
                    e
                );
                Self::conservative(game_index, game, side, odds)
            }
        }
    }

    fn conservative(game_index: usize, game: &Game, side: Side, odds: Option<f64>) -> ScoredCandidate {
        ScoredCandidate {
            game_index,
            side,
            team: game.team(side).to_string(),
            odds,
            win_probability: 0.5,
            confidence: 50.0,
            expected_value: 0.0,
            feature_importance: Vec::new(),
            model_version: model_version::SCORING_FALLBACK.to_string(),
            scoring_fallback: true,
            rationale: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::League;
    use chrono::Utc;

    #[derive(Debug)]
    struct Broken;

    impl ScoringStrategy for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn model_version(&self) -> &str {
            "0.0.0"
        }

        fn evaluate(&self, _input: &ScoringInput<'_>) -> Result<StrategyOutput, ScoringError> {
            Err(ScoringError::Inference("weights corrupted".into()))
        }
    }

    fn game() -> Game {
        Game::new("Chiefs", "Bills", League::NFL, Utc::now()).with_moneyline(-120.0, 100.0)
    }

    #[test]
    fn test_default_scorer_is_weighted() {
        let scorer = CandidateScorer::default();
        assert_eq!(scorer.strategy_name(), "weighted_heuristic");
        assert_eq!(scorer.model_version(), "2.0.0-complex");
        assert!(scorer.is_ready());

        let c = scorer.score(0, &game(), &FeatureVector::default(), Side::Home);
        assert_eq!(c.team, "Chiefs");
        assert_eq!(c.confidence, 58.0);
        assert_eq!(c.odds, Some(-120.0));
        // 0.58 * (100/120) - 0.42
        assert!((c.expected_value - (0.58 * 100.0 / 120.0 - 0.42)).abs() < 1e-9);
        assert!(!c.scoring_fallback);
    }

    #[test]
    fn test_failed_strategy_gets_conservative_default() {
        let scorer = CandidateScorer::new(Arc::new(Broken));
        let c = scorer.score(3, &game(), &FeatureVector::default(), Side::Away);
        assert!(c.scoring_fallback);
        assert_eq!(c.game_index, 3);
        assert_eq!(c.win_probability, 0.5);
        assert_eq!(c.confidence, 50.0);
        assert_eq!(c.expected_value, 0.0);
        assert_eq!(c.model_version, "fallback");
    }

    #[test]
    fn test_missing_odds_scores_without_ev() {
        let g = Game::new("Chiefs", "Bills", League::NFL, Utc::now());
        let c = CandidateScorer::default().score(0, &g, &FeatureVector::default(), Side::Home);
        assert_eq!(c.odds, None);
        assert_eq!(c.expected_value, 0.0);
    }

    #[test]
    fn test_missing_model_falls_back_degraded() {
        let config = ScoringConfig {
            strategy: StrategyKind::TrainedModel,
            model_path: Some("no/such/model.json".into()),
            ..Default::default()
        };
        let scorer = CandidateScorer::from_config(&config);
        assert!(!scorer.is_ready());
        assert_eq!(scorer.strategy_name(), "heuristic");
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("weighted".parse::<StrategyKind>().unwrap(), StrategyKind::WeightedHeuristic);
        assert!("neural".parse::<StrategyKind>().is_err());
    }
}

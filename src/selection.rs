//! Best-pick selection across a batch of games
//!
//! For each game, in request order: fill missing data from the provider,
//! build features, score both sides and apply the viability filters. The
//! single best viable candidate becomes the pick. Nothing viable is reported
//! as [`PickwiseError::NoViableCandidate`]; callers that must always answer
//! use [`fallback_pick`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{AppConfig, SelectionConfig};
use crate::domain::{
    model_version, selection_label, FactorWeight, Game, ImpactTier, League, MarketType,
    MatchupContext, Pick, PickRequest, Rationale, Side, TeamContext, TeamStats, HOME_ML,
};
use crate::error::{PickwiseError, Result};
use crate::features::situational::is_indoor_venue;
use crate::features::{FeatureEngineer, FeatureVector};
use crate::provider::TeamStatsProvider;
use crate::rationale::RationaleBuilder;
use crate::scoring::{CandidateScorer, ScoredCandidate};
use crate::validation::validate_request;

/// How viable candidates are ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Maximise `expected_value * confidence / 100`
    #[default]
    EvWeightedConfidence,
    /// Highest expected value, confidence breaks ties
    EvThenConfidence,
}

/// Viability verdict for one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Viability {
    Viable,
    MissingOdds,
    OddsOutOfRange { odds: f64, min: i32, max: i32 },
    LowConfidence { confidence: f64, min: f64 },
    LowExpectedValue { expected_value: f64, min: f64 },
}

impl Viability {
    pub fn is_viable(&self) -> bool {
        matches!(self, Viability::Viable)
    }
}

impl std::fmt::Display for Viability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Viability::Viable => write!(f, "viable"),
            Viability::MissingOdds => write!(f, "missing odds"),
            Viability::OddsOutOfRange { odds, min, max } => {
                write!(f, "odds {} outside [{}, {}]", odds, min, max)
            }
            Viability::LowConfidence { confidence, min } => {
                write!(f, "confidence {:.1} < {:.1}", confidence, min)
            }
            Viability::LowExpectedValue { expected_value, min } => {
                write!(f, "ev {:.4} < {:.4}", expected_value, min)
            }
        }
    }
}

/// One game after enrichment and feature extraction
#[derive(Debug, Clone)]
pub struct GameEvaluation {
    pub game: Game,
    pub features: FeatureVector,
    pub candidates: Vec<(ScoredCandidate, Viability)>,
}

/// Per-request orchestrator; holds only shared read-only collaborators
pub struct SelectionEngine {
    scorer: CandidateScorer,
    engineer: FeatureEngineer,
    rationale: RationaleBuilder,
    provider: Option<Arc<dyn TeamStatsProvider>>,
    config: SelectionConfig,
    recent_games: usize,
}

impl SelectionEngine {
    pub fn new(scorer: CandidateScorer) -> Self {
        Self {
            scorer,
            engineer: FeatureEngineer::new(),
            rationale: RationaleBuilder::new(),
            provider: None,
            config: SelectionConfig::default(),
            recent_games: 10,
        }
    }

    pub fn from_config(
        config: &AppConfig,
        scorer: CandidateScorer,
        provider: Option<Arc<dyn TeamStatsProvider>>,
    ) -> Self {
        Self {
            provider,
            config: config.selection.clone(),
            recent_games: config.provider.recent_games,
            ..Self::new(scorer)
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn TeamStatsProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_selection_config(mut self, config: SelectionConfig) -> Self {
        self.config = config;
        self
    }

    /// Choose the single best viable pick
    pub fn select(&self, request: &PickRequest) -> Result<Pick> {
        let evaluations = self.evaluate(request)?;

        let evaluated: usize = evaluations.iter().map(|e| e.candidates.len()).sum();
        let viable: Vec<(&GameEvaluation, &ScoredCandidate)> = evaluations
            .iter()
            .flat_map(|e| {
                e.candidates
                    .iter()
                    .filter(|(_, v)| v.is_viable())
                    .map(move |(c, _)| (e, c))
            })
            .collect();

        let Some((evaluation, best)) = self.best(&viable) else {
            warn!(
                "No viable candidate among {} candidates from {} games",
                evaluated,
                request.games.len()
            );
            return Err(PickwiseError::NoViableCandidate {
                games: request.games.len(),
                evaluated,
            });
        };

        let rationale = self
            .rationale
            .build(best, &evaluation.game, &evaluation.features);
        let pick = build_pick(&evaluation.game, best, rationale);

        info!(
            "Selected {} ({}) at {}: confidence={:.1}, ev={:.4}, {} of {} viable",
            pick.selection,
            pick.league,
            pick.odds,
            pick.confidence,
            best.expected_value,
            viable.len(),
            evaluated
        );
        Ok(pick)
    }

    /// Every evaluated candidate with its verdict, best first
    pub fn rank(&self, request: &PickRequest) -> Result<Vec<(ScoredCandidate, Viability)>> {
        let mut ranked: Vec<(ScoredCandidate, Viability)> = self
            .evaluate(request)?
            .into_iter()
            .flat_map(|e| {
                let GameEvaluation {
                    game,
                    features,
                    candidates,
                } = e;
                candidates
                    .into_iter()
                    .map(|(mut c, v)| {
                        c.rationale = Some(self.rationale.build(&c, &game, &features));
                        (c, v)
                    })
                    .collect::<Vec<_>>()
            })
            .collect();

        // Viable first, then by the configured ranking
        ranked.sort_by(|(a, va), (b, vb)| {
            vb.is_viable()
                .cmp(&va.is_viable())
                .then_with(|| self.compare(b, a))
        });
        Ok(ranked)
    }

    /// Enriched games with their feature vectors
    pub fn features(&self, request: &PickRequest) -> Result<Vec<(Game, FeatureVector)>> {
        validate_request(request)?;
        Ok(request
            .games
            .iter()
            .map(|g| {
                let (game, ctx) = self.enrich(g, request);
                let features = self.engineer.process(&game, Some(&ctx));
                (game, features)
            })
            .collect())
    }

    pub fn evaluate(&self, request: &PickRequest) -> Result<Vec<GameEvaluation>> {
        validate_request(request)?;

        let mut evaluations = Vec::with_capacity(request.games.len());
        for (index, raw) in request.games.iter().enumerate() {
            let (game, ctx) = self.enrich(raw, request);
            let features = self.engineer.process(&game, Some(&ctx));

            let candidates = Side::BOTH
                .iter()
                .map(|side| {
                    let candidate = self.scorer.score(index, &game, &features, *side);
                    let viability = self.viability(&candidate, request);
                    debug!(
                        "{} {}: {}",
                        game.matchup(),
                        candidate.team,
                        viability
                    );
                    (candidate, viability)
                })
                .collect();

            evaluations.push(GameEvaluation {
                game,
                features,
                candidates,
            });
        }
        Ok(evaluations)
    }

    pub fn viability(&self, candidate: &ScoredCandidate, request: &PickRequest) -> Viability {
        let Some(odds) = candidate.odds else {
            return Viability::MissingOdds;
        };
        if odds < request.min_odds as f64 || odds > request.max_odds as f64 {
            return Viability::OddsOutOfRange {
                odds,
                min: request.min_odds,
                max: request.max_odds,
            };
        }
        if candidate.confidence < request.min_confidence {
            return Viability::LowConfidence {
                confidence: candidate.confidence,
                min: request.min_confidence,
            };
        }
        if let Some(min) = self.config.min_expected_value {
            if candidate.expected_value < min {
                return Viability::LowExpectedValue {
                    expected_value: candidate.expected_value,
                    min,
                };
            }
        }
        Viability::Viable
    }

    fn compare(&self, a: &ScoredCandidate, b: &ScoredCandidate) -> std::cmp::Ordering {
        match self.config.ranking {
            RankingMode::EvWeightedConfidence => a
                .ev_weighted_confidence()
                .total_cmp(&b.ev_weighted_confidence()),
            RankingMode::EvThenConfidence => a
                .expected_value
                .total_cmp(&b.expected_value)
                .then_with(|| a.confidence.total_cmp(&b.confidence)),
        }
    }

    /// Best by the configured ranking; the earliest candidate wins ties
    fn best<'a>(
        &self,
        viable: &[(&'a GameEvaluation, &'a ScoredCandidate)],
    ) -> Option<(&'a GameEvaluation, &'a ScoredCandidate)> {
        let mut best: Option<(&GameEvaluation, &ScoredCandidate)> = None;
        for &(evaluation, candidate) in viable {
            match best {
                Some((_, current)) if self.compare(candidate, current).is_le() => {}
                _ => best = Some((evaluation, candidate)),
            }
        }
        best
    }

    fn enrich(&self, raw: &Game, request: &PickRequest) -> (Game, MatchupContext) {
        let mut game = raw.clone();
        let mut ctx = MatchupContext::default();

        let Some(provider) = self.provider.as_deref() else {
            ctx.home.stats = request.context_team_stats(&game.home_team);
            ctx.away.stats = request.context_team_stats(&game.away_team);
            return (game, ctx);
        };

        if game.odds.is_empty() {
            match provider.get_odds_for_game(&game.home_team, &game.away_team, game.league) {
                Ok(odds) => game.odds = odds,
                Err(e) => warn!("Odds lookup failed for {}: {}", game.matchup(), e),
            }
        }

        if let Some(venue) = game.venue.clone() {
            match provider.get_venue_info(&venue) {
                Ok(info) => ctx.venue = Some(info),
                Err(e) => warn!("Venue lookup failed for {}: {}", venue, e),
            }
            let indoor =
                ctx.venue.as_ref().map(|v| v.indoor).unwrap_or(false) || is_indoor_venue(&venue);
            if game.weather.is_none() && !indoor {
                match provider.get_weather_for_venue(&venue, game.start_time) {
                    Ok(weather) => game.weather = Some(weather),
                    Err(e) => warn!("Weather lookup failed for {}: {}", venue, e),
                }
            }
        }

        ctx.home = self.team_context(provider, &game.home_team, game.league, request);
        ctx.away = self.team_context(provider, &game.away_team, game.league, request);

        if game.injuries.is_none() {
            let notes: Vec<String> = ctx
                .home
                .injuries
                .iter()
                .chain(&ctx.away.injuries)
                .filter(|r| r.impact == Some(ImpactTier::High))
                .map(|r| r.describe())
                .collect();
            game.injuries = Some(notes);
        }

        (game, ctx)
    }

    fn team_context(
        &self,
        provider: &dyn TeamStatsProvider,
        team: &str,
        league: League,
        request: &PickRequest,
    ) -> TeamContext {
        let stats: Option<TeamStats> = match request.context_team_stats(team) {
            Some(stats) => Some(stats),
            None => match provider.get_team_stats(team, league) {
                Ok(stats) => Some(stats),
                Err(e) => {
                    warn!("Stats lookup failed for {}: {}", team, e);
                    None
                }
            },
        };
        let injuries = provider.get_injury_report(team, league).unwrap_or_else(|e| {
            warn!("Injury lookup failed for {}: {}", team, e);
            Vec::new()
        });
        let recent_games = provider
            .get_recent_games(team, league, self.recent_games)
            .unwrap_or_else(|e| {
                warn!("Recent games lookup failed for {}: {}", team, e);
                Vec::new()
            });
        TeamContext {
            stats,
            injuries,
            recent_games,
        }
    }
}

fn build_pick(game: &Game, candidate: &ScoredCandidate, rationale: Rationale) -> Pick {
    Pick {
        selection: selection_label(game.team(candidate.side)),
        market: MarketType::Moneyline,
        league: game.league,
        odds: candidate.odds.unwrap_or_default(),
        confidence: candidate.confidence,
        expected_value: Some(candidate.expected_value),
        rationale,
        features_used: candidate
            .feature_importance
            .iter()
            .map(|f| f.name.clone())
            .collect(),
        generated_at: Utc::now(),
        model_version: candidate.model_version.clone(),
    }
}

/// Conservative pick for callers that must answer when nothing is viable.
///
/// Takes the first game with a near-even home line, else the first game's
/// home side.
pub fn fallback_pick(request: &PickRequest) -> Result<Pick> {
    let near_even = request.games.iter().find(|g| {
        g.odds
            .get(HOME_ML)
            .map(|o| (-150.0..=150.0).contains(o))
            .unwrap_or(false)
    });

    let (game, confidence, ev, version, reasoning) = match near_even {
        Some(game) => (
            game,
            55.0,
            0.01,
            model_version::FALLBACK,
            "Fallback selection based on conservative analysis.",
        ),
        None => {
            let game = request.games.first().ok_or_else(|| {
                PickwiseError::Validation("games must not be empty".to_string())
            })?;
            (
                game,
                50.0,
                0.0,
                model_version::EMERGENCY,
                "Emergency fallback selection.",
            )
        }
    };

    info!(
        "Using {} pick for {} ({} games)",
        version,
        game.matchup(),
        request.games.len()
    );

    Ok(Pick {
        selection: selection_label(&game.home_team),
        market: MarketType::Moneyline,
        league: game.league,
        odds: game.odds.get(HOME_ML).copied().unwrap_or(-110.0),
        confidence,
        expected_value: Some(ev),
        rationale: Rationale {
            reasoning: reasoning.to_string(),
            top_factors: vec![
                "Conservative Selection".to_string(),
                "Home Field Advantage".to_string(),
                "Market Analysis".to_string(),
            ],
            risk_assessment: "Higher risk - Lower confidence, proceed with caution".to_string(),
            confidence_factors: vec![FactorWeight::new("home_advantage", 1.0)],
            key_insights: Vec::new(),
        },
        features_used: vec!["home_advantage".to_string()],
        generated_at: Utc::now(),
        model_version: version.to_string(),
    })
}

use axum::extract::FromRef;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::provider::TeamStatsProvider;
use crate::scoring::CandidateScorer;
use crate::selection::SelectionEngine;
use crate::services::HealthState;

/// Shared application state for API handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,

    /// Loaded once at startup and shared by every request
    pub scorer: CandidateScorer,

    /// Optional data provider used to enrich games
    pub provider: Option<Arc<dyn TeamStatsProvider>>,

    pub health: Arc<HealthState>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        scorer: CandidateScorer,
        provider: Option<Arc<dyn TeamStatsProvider>>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            health: Arc::new(HealthState::new(scorer.clone())),
            scorer,
            provider,
        }
    }

    /// Build the per-request engine
    pub fn engine(&self) -> SelectionEngine {
        SelectionEngine::from_config(&self.config, self.scorer.clone(), self.provider.clone())
    }
}

impl FromRef<AppState> for Arc<HealthState> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.health)
    }
}

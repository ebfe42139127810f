//! Health probes for the pick service
//!
//! `/health` reports whether the configured scoring strategy loaded;
//! `/healthz` only answers that the process is alive.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::scoring::CandidateScorer;

/// Health status for a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }
}

/// Overall service health response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub ml_engine_ready: bool,
    pub strategy: String,
    pub model_version: String,
    pub timestamp: DateTime<Utc>,
    pub uptime_seconds: u64,
}

/// Shared state for the health endpoints
#[derive(Debug)]
pub struct HealthState {
    /// When the server started
    pub started_at: DateTime<Utc>,
    scorer: CandidateScorer,
}

impl HealthState {
    pub fn new(scorer: CandidateScorer) -> Self {
        Self {
            started_at: Utc::now(),
            scorer,
        }
    }

    /// A degraded scorer still answers picks with the heuristic
    pub fn get_health(&self) -> HealthResponse {
        let ready = self.scorer.is_ready();
        let uptime = (Utc::now() - self.started_at).num_seconds().max(0) as u64;

        HealthResponse {
            status: if ready {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            ml_engine_ready: ready,
            strategy: self.scorer.strategy_name().to_string(),
            model_version: self.scorer.model_version().to_string(),
            timestamp: Utc::now(),
            uptime_seconds: uptime,
        }
    }
}

/// GET /health
///
/// Always 200: a degraded scorer still serves picks.
pub async fn health_handler(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
    (StatusCode::OK, Json(state.get_health()))
}

/// GET /healthz
pub async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

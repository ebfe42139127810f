use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use crate::api::{state::AppState, types::ErrorResponse};
use crate::domain::{Pick, PickRequest};
use crate::error::PickwiseError;
use crate::selection::fallback_pick;

type ApiResult<T> = std::result::Result<Json<T>, (StatusCode, Json<ErrorResponse>)>;

fn error_response(e: &PickwiseError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = match e {
        e if e.is_client_error() => (StatusCode::BAD_REQUEST, "validation_error"),
        PickwiseError::NoViableCandidate { .. } => {
            (StatusCode::UNPROCESSABLE_ENTITY, "no_viable_candidate")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    };
    (status, Json(ErrorResponse::new(code, e.to_string())))
}

/// POST /api/ml/pick
pub async fn create_pick(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PickRequest>, JsonRejection>,
) -> ApiResult<Pick> {
    let Json(request) = payload.map_err(|rejection| {
        warn!("Rejected pick request body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("validation_error", rejection.body_text())),
        )
    })?;

    let request_id = Uuid::new_v4();
    let span = info_span!("pick", %request_id, games = request.games.len());
    let fallback_enabled = state.config.api.fallback_on_no_candidate;
    let engine = state.engine();

    let result = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        match engine.select(&request) {
            Err(e @ PickwiseError::NoViableCandidate { .. }) if fallback_enabled => {
                warn!("{}; answering with fallback pick", e);
                fallback_pick(&request)
            }
            other => other,
        }
    })
    .await
    .map_err(|e| {
        error!("Pick task failed: {}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse::new("internal_error", "pick task failed")),
        )
    })?;

    match result {
        Ok(pick) => {
            info!(
                "Pick {} {} @ {} (confidence {:.1}, model {})",
                request_id, pick.selection, pick.odds, pick.confidence, pick.model_version
            );
            Ok(Json(pick))
        }
        Err(e) => {
            if e.is_client_error() {
                warn!("Pick {} rejected: {}", request_id, e);
            } else {
                error!("Pick {} failed: {}", request_id, e);
            }
            Err(error_response(&e))
        }
    }
}

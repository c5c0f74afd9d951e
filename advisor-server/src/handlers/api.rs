//! JSON API handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use validator::Validate;

use potability_core::EngineStatus;

use crate::error::AppResult;
use crate::models::{CheckRequest, CheckResponse, FieldInfo};
use crate::AppState;

/// POST /api/v1/check
pub async fn check(
    State(state): State<AppState>,
    payload: Result<Json<CheckRequest>, JsonRejection>,
) -> AppResult<Json<CheckResponse>> {
    // malformed bodies get the same {error, status} shape as range failures
    let Json(req) = payload?;
    req.validate()?;
    let sample = req.into_sample()?;

    let verdict = state.advisor.check(&sample)?;
    let response = CheckResponse::from(verdict);

    tracing::info!(
        "Check {}: {} ({})",
        response.check_id,
        response.label,
        response.confidence_display
    );

    Ok(Json(response))
}

/// GET /api/v1/fields
pub async fn fields() -> Json<Vec<FieldInfo>> {
    Json(FieldInfo::all())
}

/// GET /api/v1/status
pub async fn status(State(state): State<AppState>) -> Json<EngineStatus> {
    Json(state.advisor.status())
}

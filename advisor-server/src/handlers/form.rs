//! HTML form handlers

use std::collections::HashMap;

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Form,
};

use crate::models::FormState;
use crate::views;
use crate::AppState;

/// GET / - form with defaults, no verdict
pub async fn index() -> Html<String> {
    Html(views::render_page(&FormState::defaults(), None))
}

/// POST /check
pub async fn check(
    State(state): State<AppState>,
    Form(submission): Form<HashMap<String, String>>,
) -> Response {
    let (form, sample) = FormState::from_submission(&submission);

    let Some(sample) = sample else {
        tracing::debug!("Form rejected: {} invalid field(s)", form.errors().count());
        let page = views::render_page(&form, None);
        return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
    };

    let verdict = match state.advisor.check(&sample) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!("Form check failed: {}", e);
            let page = views::render_error_page();
            return (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response();
        }
    };
    tracing::info!("Check: {} ({})", verdict.label, verdict.confidence_display());

    Html(views::render_page(&form, Some(&verdict))).into_response()
}

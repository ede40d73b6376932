//! REST endpoints for driving the wizard from a browser.

use std::sync::Arc;

use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::debug;

use crate::error::WizardError;

use super::manager::WizardManager;
use super::model::{AnswerValue, FieldKey};

/// Shared state for wizard routes.
#[derive(Clone)]
pub struct WizardRouteState {
    pub manager: Arc<WizardManager>,
}

#[derive(Debug, Deserialize)]
struct AnswerRequest {
    key: FieldKey,
    value: AnswerValue,
}

#[derive(Debug, Deserialize)]
struct ToggleRequest {
    option: String,
}

fn status_for(err: &WizardError) -> StatusCode {
    match err {
        WizardError::InvalidAnswerKey { .. }
        | WizardError::EmptyMultiChoice
        | WizardError::AnswerModeMismatch { .. }
        | WizardError::UnknownChoice { .. }
        | WizardError::NotMultiChoice { .. } => StatusCode::BAD_REQUEST,
        WizardError::NoPendingQuestion | WizardError::InvalidTransition { .. } => {
            StatusCode::CONFLICT
        }
        WizardError::NoArtifact => StatusCode::NOT_FOUND,
        WizardError::GenerationFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

fn error_response(err: WizardError) -> Response {
    debug!("Wizard request rejected: {}", err);
    (
        status_for(&err),
        Json(serde_json::json!({"error": err.to_string()})),
    )
        .into_response()
}

/// Malformed bodies get the same JSON error shape as wizard rejections.
fn rejection_response(rejection: JsonRejection) -> Response {
    debug!("Malformed wizard request: {}", rejection.body_text());
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": rejection.body_text()})),
    )
        .into_response()
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/wizard
async fn get_session(State(state): State<WizardRouteState>) -> impl IntoResponse {
    Json(state.manager.snapshot().await)
}

/// POST /api/wizard/answer
async fn submit_answer(
    State(state): State<WizardRouteState>,
    body: Result<Json<AnswerRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    match state.manager.submit_answer(body.key, body.value).await {
        Ok(_) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/wizard/toggle
async fn toggle_selection(
    State(state): State<WizardRouteState>,
    body: Result<Json<ToggleRequest>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => return rejection_response(rejection),
    };
    match state.manager.toggle_selection(&body.option).await {
        Ok(_) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/wizard/selection
///
/// Submits the staged multi-choice selections.
async fn submit_selection(State(state): State<WizardRouteState>) -> Response {
    match state.manager.submit_selection().await {
        Ok(_) => Json(state.manager.snapshot().await).into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/wizard/confirm
///
/// Starts generation and returns immediately; poll `GET /api/wizard` for
/// the settled state.
async fn confirm_generation(State(state): State<WizardRouteState>) -> Response {
    match state.manager.start_generation().await {
        Ok(_handle) => (
            StatusCode::ACCEPTED,
            Json(state.manager.snapshot().await),
        )
            .into_response(),
        Err(e) => error_response(e),
    }
}

/// POST /api/wizard/reset
async fn reset_session(State(state): State<WizardRouteState>) -> impl IntoResponse {
    Json(state.manager.reset_session().await)
}

/// GET /api/wizard/artifact
///
/// Downloads the generated HTML, or 404 before a successful generation.
async fn download_artifact(State(state): State<WizardRouteState>) -> Response {
    match state.manager.artifact().await {
        Some(html) => (
            [
                (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", state.manager.artifact_name()),
                ),
            ],
            html,
        )
            .into_response(),
        None => error_response(WizardError::NoArtifact),
    }
}

/// Build the wizard REST routes.
pub fn wizard_routes(state: WizardRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/wizard", get(get_session))
        .route("/api/wizard/answer", post(submit_answer))
        .route("/api/wizard/toggle", post(toggle_selection))
        .route("/api/wizard/selection", post(submit_selection))
        .route("/api/wizard/confirm", post(confirm_generation))
        .route("/api/wizard/reset", post(reset_session))
        .route("/api/wizard/artifact", get(download_artifact))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

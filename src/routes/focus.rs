use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::focus::{FocusStatusResponse, StartFocusRequest, StopFocusResponse},
    error::AppError,
    services::focus_service,
    state::SharedState,
};

/// Focus timer endpoints scoped to one session.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session/{id}/focus/start", post(start_focus))
        .route("/session/{id}/focus", get(focus_status))
        .route("/session/{id}/focus/stop", post(stop_focus))
}

/// Start a focus session.
#[utoipa::path(
    post,
    path = "/session/{id}/focus/start",
    tag = "focus",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    request_body = StartFocusRequest,
    responses(
        (status = 200, description = "Focus session started", body = FocusStatusResponse),
        (status = 400, description = "Missing topic or target"),
        (status = 409, description = "A focus session is already running")
    )
)]
pub async fn start_focus(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<StartFocusRequest>,
) -> Result<Json<FocusStatusResponse>, AppError> {
    payload.validate()?;
    Ok(Json(focus_service::start(&state, id, payload).await?))
}

/// Poll the focus timer. An elapsed countdown completes and pays out here.
#[utoipa::path(
    get,
    path = "/session/{id}/focus",
    tag = "focus",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    responses((status = 200, description = "Timer state", body = FocusStatusResponse))
)]
pub async fn focus_status(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<FocusStatusResponse>, AppError> {
    Ok(Json(focus_service::status(&state, id).await?))
}

/// Stop the running focus session.
#[utoipa::path(
    post,
    path = "/session/{id}/focus/stop",
    tag = "focus",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    responses(
        (status = 200, description = "Stop outcome", body = StopFocusResponse),
        (status = 409, description = "No focus session is running")
    )
)]
pub async fn stop_focus(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StopFocusResponse>, AppError> {
    Ok(Json(focus_service::stop(&state, id).await?))
}

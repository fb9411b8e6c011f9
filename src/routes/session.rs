use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::session::{LoginRequest, SessionResponse, UserProfile},
    error::AppError,
    services::session_service,
    state::SharedState,
};

/// Session lifecycle endpoints: login, profile, logout.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/session/login", post(login))
        .route("/session/{id}/profile", get(profile))
        .route("/session/{id}/logout", post(logout))
}

/// Log in with a nickname, registering it on first use.
#[utoipa::path(
    post,
    path = "/session/login",
    tag = "session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session opened", body = SessionResponse),
        (status = 400, description = "Invalid nickname")
    )
)]
pub async fn login(
    State(state): State<SharedState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    payload.validate()?;
    Ok(Json(session_service::login(&state, payload).await?))
}

/// Current profile of a live session.
#[utoipa::path(
    get,
    path = "/session/{id}/profile",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    responses(
        (status = 200, description = "Profile", body = UserProfile),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn profile(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(session_service::profile(&state, id).await?))
}

/// Close a session.
#[utoipa::path(
    post,
    path = "/session/{id}/logout",
    tag = "session",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session")
    )
)]
pub async fn logout(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    session_service::logout(&state, id)?;
    Ok(StatusCode::NO_CONTENT)
}

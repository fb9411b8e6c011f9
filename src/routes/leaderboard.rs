use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    dto::leaderboard::LeaderboardResponse, error::AppError, services::leaderboard_service,
    state::SharedState,
};

/// Query parameters accepted by the leaderboard endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LeaderboardQuery {
    /// Bypass the cached snapshot and re-fetch.
    #[serde(default)]
    pub refresh: bool,
}

/// Leaderboard endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/leaderboard", get(leaderboard))
}

/// Ranked snapshot of all users, cached between polls.
#[utoipa::path(
    get,
    path = "/leaderboard",
    tag = "leaderboard",
    params(LeaderboardQuery),
    responses(
        (status = 200, description = "Ranked snapshot", body = LeaderboardResponse),
        (status = 503, description = "Storage unavailable and nothing cached")
    )
)]
pub async fn leaderboard(
    State(state): State<SharedState>,
    Query(query): Query<LeaderboardQuery>,
) -> Result<Json<LeaderboardResponse>, AppError> {
    Ok(Json(
        leaderboard_service::get_snapshot(&state, query.refresh).await?,
    ))
}

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::chat::{ChatMessage, ChatPageResponse, ChatPostRequest},
    error::AppError,
    services::chat_service,
    state::SharedState,
};

/// Query parameters accepted by the wall listing endpoint.
#[derive(Debug, Deserialize, IntoParams)]
pub struct ChatQuery {
    /// Maximum number of messages to return.
    pub limit: Option<usize>,
}

/// Shared wall endpoints.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/chat", get(recent_messages))
        .route("/session/{id}/chat", post(post_message))
}

/// The most recent page of the wall, oldest first.
#[utoipa::path(
    get,
    path = "/chat",
    tag = "chat",
    params(ChatQuery),
    responses(
        (status = 200, description = "Recent messages", body = ChatPageResponse),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn recent_messages(
    State(state): State<SharedState>,
    Query(query): Query<ChatQuery>,
) -> Result<Json<ChatPageResponse>, AppError> {
    Ok(Json(chat_service::recent(&state, query.limit).await?))
}

/// Post one message under the session's nickname.
#[utoipa::path(
    post,
    path = "/session/{id}/chat",
    tag = "chat",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    request_body = ChatPostRequest,
    responses(
        (status = 200, description = "Message posted", body = ChatMessage),
        (status = 400, description = "Blank message"),
        (status = 503, description = "Storage unavailable")
    )
)]
pub async fn post_message(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChatPostRequest>,
) -> Result<Json<ChatMessage>, AppError> {
    payload.validate()?;
    Ok(Json(chat_service::post(&state, id, payload).await?))
}

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use uuid::Uuid;

use crate::{
    dto::cards::CardDrawResponse, error::AppError, services::card_service, state::SharedState,
};

/// Daily fate-card endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/session/{id}/card", post(draw_card))
}

/// Draw today's fate card.
#[utoipa::path(
    post,
    path = "/session/{id}/card",
    tag = "cards",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    responses(
        (status = 200, description = "Card drawn", body = CardDrawResponse),
        (status = 400, description = "Today's card was already drawn")
    )
)]
pub async fn draw_card(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CardDrawResponse>, AppError> {
    Ok(Json(card_service::draw(&state, id).await?))
}

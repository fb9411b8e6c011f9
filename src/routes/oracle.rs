use axum::{Json, Router, extract::State, routing::post};
use validator::Validate;

use crate::{
    dto::oracle::{OracleRequest, OracleResponse},
    error::AppError,
    services::oracle_service,
    state::SharedState,
};

/// Oracle endpoint.
pub fn router() -> Router<SharedState> {
    Router::new().route("/oracle", post(ask_oracle))
}

/// Put a question to the oracle. Provider failures come back as themed
/// answers, not HTTP errors.
#[utoipa::path(
    post,
    path = "/oracle",
    tag = "oracle",
    request_body = OracleRequest,
    responses(
        (status = 200, description = "Oracle answer", body = OracleResponse),
        (status = 400, description = "Blank question")
    )
)]
pub async fn ask_oracle(
    State(state): State<SharedState>,
    Json(payload): Json<OracleRequest>,
) -> Result<Json<OracleResponse>, AppError> {
    payload.validate()?;
    Ok(Json(oracle_service::ask(&state, payload).await?))
}

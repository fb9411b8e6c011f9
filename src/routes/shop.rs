use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dto::shop::{PurchaseRequest, PurchaseResponse, ShopCatalogResponse},
    error::AppError,
    services::shop_service,
    state::SharedState,
};

/// Shop endpoints: catalog listing and purchases.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/shop", get(catalog))
        .route("/session/{id}/shop/purchase", post(purchase))
}

/// List the purchasable items.
#[utoipa::path(
    get,
    path = "/shop",
    tag = "shop",
    responses((status = 200, description = "Shop catalog", body = ShopCatalogResponse))
)]
pub async fn catalog(State(state): State<SharedState>) -> Json<ShopCatalogResponse> {
    Json(shop_service::catalog(&state))
}

/// Buy one item for the session's user.
#[utoipa::path(
    post,
    path = "/session/{id}/shop/purchase",
    tag = "shop",
    params(("id" = Uuid, Path, description = "Session identifier returned by login")),
    request_body = PurchaseRequest,
    responses(
        (status = 200, description = "Item purchased", body = PurchaseResponse),
        (status = 400, description = "Not enough XP, or cosmetic already owned"),
        (status = 404, description = "Unknown item or session")
    )
)]
pub async fn purchase(
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<Json<PurchaseResponse>, AppError> {
    payload.validate()?;
    Ok(Json(shop_service::purchase(&state, id, payload).await?))
}

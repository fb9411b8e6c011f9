use axum::Router;

use crate::state::SharedState;

/// Daily fate-card routes.
pub mod cards;
/// Shared wall routes.
pub mod chat;
/// Swagger UI routes.
pub mod docs;
/// Focus timer routes.
pub mod focus;
/// Health check routes.
pub mod health;
/// Leaderboard routes.
pub mod leaderboard;
/// Oracle routes.
pub mod oracle;
/// Session lifecycle routes.
pub mod session;
/// Shop routes.
pub mod shop;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(focus::router())
        .merge(shop::router())
        .merge(cards::router())
        .merge(leaderboard::router())
        .merge(oracle::router())
        .merge(chat::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

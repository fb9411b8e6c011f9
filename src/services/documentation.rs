use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Study OS Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::login,
        crate::routes::session::profile,
        crate::routes::session::logout,
        crate::routes::focus::start_focus,
        crate::routes::focus::focus_status,
        crate::routes::focus::stop_focus,
        crate::routes::shop::catalog,
        crate::routes::shop::purchase,
        crate::routes::cards::draw_card,
        crate::routes::leaderboard::leaderboard,
        crate::routes::oracle::ask_oracle,
        crate::routes::chat::recent_messages,
        crate::routes::chat::post_message,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::LoginRequest,
            crate::dto::session::SessionResponse,
            crate::dto::session::UserProfile,
            crate::dto::session::HistoryEntry,
            crate::dto::session::ActiveBuff,
            crate::dto::focus::StartFocusRequest,
            crate::dto::focus::FocusModeInput,
            crate::dto::focus::FocusStatusResponse,
            crate::dto::focus::StopFocusResponse,
            crate::dto::focus::PayoutSummary,
            crate::dto::shop::ShopCatalogResponse,
            crate::dto::shop::ShopItemView,
            crate::dto::shop::PurchaseRequest,
            crate::dto::shop::PurchaseResponse,
            crate::dto::cards::CardDrawResponse,
            crate::dto::leaderboard::LeaderboardResponse,
            crate::dto::leaderboard::LeaderboardEntry,
            crate::dto::oracle::OracleRequest,
            crate::dto::oracle::OracleResponse,
            crate::dto::chat::ChatPostRequest,
            crate::dto::chat::ChatMessage,
            crate::dto::chat::ChatPageResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Nickname login and session lifecycle"),
        (name = "focus", description = "Focus timer and XP payouts"),
        (name = "shop", description = "Catalog and purchases"),
        (name = "cards", description = "Daily fate-card draws"),
        (name = "leaderboard", description = "Ranked snapshot of all users"),
        (name = "oracle", description = "Generative-text oracle"),
        (name = "chat", description = "Shared message wall"),
    )
)]
pub struct ApiDoc;

/// Daily fate-card draws.
pub mod card_service;
/// Shared chat wall.
pub mod chat_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Focus timer transitions and XP payouts.
pub mod focus_service;
/// Health check service.
pub mod health_service;
/// Cached, ranked view of all users.
pub mod leaderboard_service;
/// Generative-text oracle calls.
pub mod oracle_service;
/// Login, record flushing, and session lifecycle.
pub mod session_service;
/// Shop purchases: cosmetics and buffs.
pub mod shop_service;
/// Storage connection supervision and degraded mode.
pub mod storage_supervisor;

/// Daily fate-card payloads.
pub mod cards;
/// Shared wall payloads.
pub mod chat;
/// Focus timer payloads.
pub mod focus;
/// Health check payloads.
pub mod health;
/// Leaderboard payloads.
pub mod leaderboard;
/// Oracle payloads.
pub mod oracle;
/// Login and profile payloads.
pub mod session;
/// Shop payloads.
pub mod shop;
/// Validation helpers shared by request DTOs.
pub mod validation;

//! Library crate for study-os-back, exposing modules for the binary and integration tests.

/// Runtime configuration: XP rates, shop catalog, fate deck, rank ladder.
pub mod config;
/// Storage backends and the persistence abstraction.
pub mod dao;
/// Request and response payloads.
pub mod dto;
/// Service and HTTP error taxonomies.
pub mod error;
/// Generative-text oracle backends.
pub mod oracle;
/// HTTP route handlers.
pub mod routes;
/// Business logic services.
pub mod services;
/// Shared application state and per-session state.
pub mod state;

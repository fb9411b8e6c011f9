/// Database model definitions.
pub mod models;
/// Named retry policy applied to storage calls.
pub mod retry;
/// Storage abstraction layer for backend operations.
pub mod storage;
/// User record storage and retrieval operations.
pub mod user_store;

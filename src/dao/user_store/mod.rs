/// In-memory backend for tests and local runs.
pub mod memory;
/// Spreadsheet-backed production backend.
pub mod sheets;

use futures::future::BoxFuture;

use crate::dao::models::{ChatMessageEntity, UserEntity};
use crate::dao::storage::StorageResult;

/// Abstraction over the persistence layer for user records and the chat wall.
///
/// `find_user` and `update_user` take the normalized nickname key (trimmed,
/// lower-cased); backends are responsible for matching it against stored
/// usernames case-insensitively. `update_user` overwrites the mutable fields
/// whole, not incrementally, and fails with `RecordNotFound` when no row
/// matches; the last writer wins across concurrent processes.
pub trait UserStore: Send + Sync {
    /// Fetch every stored user record.
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    /// Find one record by its normalized nickname key.
    fn find_user(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<UserEntity>>>;
    /// Append a new record; the caller guarantees the key is not taken.
    fn append_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Overwrite the mutable fields of an existing record.
    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>>;
    /// Most recent chat messages, oldest first, at most `limit` of them.
    fn list_messages(&self, limit: usize)
    -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>>;
    /// Append one chat message to the wall.
    fn append_message(&self, message: ChatMessageEntity)
    -> BoxFuture<'static, StorageResult<()>>;
    /// Cheap reachability probe used by the storage supervisor.
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
    /// Attempt to re-establish the backend connection after a failed probe.
    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>>;
}

//! In-memory [`UserStore`] backend for tests and single-process local runs.

use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;

use crate::dao::{
    models::{ChatMessageEntity, UserEntity},
    storage::{StorageError, StorageResult},
    user_store::UserStore,
};

#[derive(Debug, Default)]
struct MemoryInner {
    users: Vec<UserEntity>,
    messages: Vec<ChatMessageEntity>,
}

/// Process-local store keeping rows in insertion order, mirroring the
/// append-only row semantics of the tabular backend.
#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryUserStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored user rows.
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        // Lock poisoning only happens if a holder panicked; propagate the data anyway.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl UserStore for MemoryUserStore {
    fn list_users(&self) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { Ok(store.lock().users.clone()) })
    }

    fn find_user(&self, key: &str) -> BoxFuture<'static, StorageResult<Option<UserEntity>>> {
        let store = self.clone();
        let key = key.to_string();
        Box::pin(async move {
            let inner = store.lock();
            Ok(inner
                .users
                .iter()
                .find(|user| user.normalized_key() == key)
                .cloned())
        })
    }

    fn append_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.lock().users.push(user);
            Ok(())
        })
    }

    fn update_user(&self, user: UserEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            let key = user.normalized_key();
            let mut inner = store.lock();
            match inner
                .users
                .iter_mut()
                .find(|stored| stored.normalized_key() == key)
            {
                Some(stored) => {
                    *stored = user;
                    Ok(())
                }
                None => Err(StorageError::RecordNotFound { username: key }),
            }
        })
    }

    fn list_messages(
        &self,
        limit: usize,
    ) -> BoxFuture<'static, StorageResult<Vec<ChatMessageEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            let inner = store.lock();
            let skip = inner.messages.len().saturating_sub(limit);
            Ok(inner.messages[skip..].to_vec())
        })
    }

    fn append_message(
        &self,
        message: ChatMessageEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move {
            store.lock().messages.push(message);
            Ok(())
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }

    fn try_reconnect(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn find_matches_normalized_key_only() {
        let store = MemoryUserStore::new();
        store.append_user(UserEntity::new("Ada")).await.unwrap();

        let found = store.find_user("ada").await.unwrap();
        assert_eq!(found.unwrap().username, "Ada");
        assert!(store.find_user("grace").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_requires_existing_row() {
        let store = MemoryUserStore::new();
        let err = store.update_user(UserEntity::new("Ada")).await.unwrap_err();
        assert!(matches!(err, StorageError::RecordNotFound { username } if username == "ada"));
    }

    #[tokio::test]
    async fn message_listing_returns_most_recent_page() {
        let store = MemoryUserStore::new();
        for i in 0..5 {
            store
                .append_message(ChatMessageEntity {
                    sent_at: "2026-08-23 10:00".into(),
                    username: "Ada".into(),
                    body: format!("message {i}"),
                })
                .await
                .unwrap();
        }

        let page = store.list_messages(2).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].body, "message 3");
        assert_eq!(page[1].body, "message 4");
    }
}

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
    dao::{
        models::{UserEntity, normalize_username},
        storage::{StorageError, StorageResult},
        user_store::UserStore,
    },
    dto::session::{LoginRequest, SessionResponse, UserProfile},
    error::ServiceError,
    services::leaderboard_service,
    state::{SharedState, session::SessionState},
};

/// Notice attached to logins served from memory while the store is down.
const DEGRADED_NOTICE: &str =
    "The archive is unreachable; progress in this session will not be saved.";

/// Log in under a nickname, creating the record on first visit.
///
/// Lookups are case- and whitespace-insensitive. When the store cannot be
/// reached the login still succeeds with a synthetic, non-persisted guest
/// record so the rest of the system keeps working for this session.
pub async fn login(
    state: &SharedState,
    request: LoginRequest,
) -> Result<SessionResponse, ServiceError> {
    let nickname = request.nickname.trim().to_string();
    if nickname.is_empty() {
        return Err(ServiceError::InvalidInput("nickname must not be blank".into()));
    }

    let (record, persisted, notice) = match state.user_store().await {
        Some(store) => match find_or_create(&store, &nickname).await {
            Ok(record) => (record, true, None),
            Err(err) => {
                warn!(error = %err, "login falling back to a guest record");
                (guest_record(state, &nickname), false, Some(DEGRADED_NOTICE))
            }
        },
        None => {
            warn!("storage unavailable (degraded mode); serving a guest record");
            (guest_record(state, &nickname), false, Some(DEGRADED_NOTICE))
        }
    };

    let profile = UserProfile::from_record(&record, state.config());
    let session_id = state.register_session(SessionState::new(record, persisted));
    info!(%session_id, nickname, persisted, "session opened");

    Ok(SessionResponse {
        session_id,
        persisted,
        notice: notice.map(str::to_string),
        profile,
    })
}

/// Current profile of a live session.
pub async fn profile(state: &SharedState, session_id: Uuid) -> Result<UserProfile, ServiceError> {
    let session = state.session(session_id)?;
    let guard = session.lock().await;
    Ok(UserProfile::from_record(&guard.record, state.config()))
}

/// Discard a session at logout.
pub fn logout(state: &SharedState, session_id: Uuid) -> Result<(), ServiceError> {
    if state.remove_session(session_id) {
        info!(%session_id, "session closed");
        Ok(())
    } else {
        Err(ServiceError::NotFound(format!("session `{session_id}` not found")))
    }
}

/// Flush the session's record to storage, best effort.
///
/// Writes for the same nickname are serialized through a per-nickname gate.
/// A missing row or an unreachable store is logged and swallowed: the
/// in-memory record stays correct for the session and the write is lost,
/// which is the documented durability contract.
pub async fn persist(state: &SharedState, session: &SessionState) {
    if !session.persisted {
        debug!(
            username = session.record.username,
            "skipping flush for non-persisted guest record"
        );
        return;
    }

    let Some(store) = state.user_store().await else {
        warn!(
            username = session.record.username,
            "skipping flush; storage unavailable (degraded mode)"
        );
        return;
    };

    let key = session.record.normalized_key();
    let gate = state.write_gate(&key);
    let _guard = gate.lock().await;

    match store.update_user(session.record.clone()).await {
        Ok(()) => {
            leaderboard_service::invalidate(state).await;
        }
        Err(StorageError::RecordNotFound { username }) => {
            warn!(%username, "flush dropped; no stored row for this nickname");
        }
        Err(err) => {
            warn!(error = %err, username = session.record.username, "failed to flush record");
        }
    }
}

/// Case-insensitively look a nickname up, appending a fresh row on a miss.
async fn find_or_create(store: &Arc<dyn UserStore>, nickname: &str) -> StorageResult<UserEntity> {
    let key = normalize_username(nickname);
    if let Some(existing) = store.find_user(&key).await? {
        return Ok(existing);
    }

    let record = UserEntity::new(nickname);
    store.append_user(record.clone()).await?;
    info!(nickname, "registered a new user row");
    Ok(record)
}

/// Synthetic in-memory record handed out while the store is unreachable.
fn guest_record(state: &SharedState, nickname: &str) -> UserEntity {
    let mut record = UserEntity::new(nickname);
    record.xp = state.config().guest_xp();
    record.level = state.config().level(record.xp);
    record
}

#[cfg(test)]
mod tests {
    use crate::{
        config::AppConfig,
        dao::user_store::memory::MemoryUserStore,
        state::AppState,
    };

    use super::*;

    async fn state_with_store() -> (SharedState, MemoryUserStore) {
        let state = AppState::new(AppConfig::default(), None);
        let store = MemoryUserStore::new();
        state.install_user_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn login_request(nickname: &str) -> LoginRequest {
        LoginRequest {
            nickname: nickname.to_string(),
        }
    }

    #[tokio::test]
    async fn first_login_appends_exactly_one_row_with_defaults() {
        let (state, store) = state_with_store().await;

        let response = login(&state, login_request("Ada")).await.unwrap();
        assert!(response.persisted);
        assert!(response.notice.is_none());
        assert_eq!(response.profile.username, "Ada");
        assert_eq!(response.profile.xp, 0);
        assert!(response.profile.history.is_empty());
        assert!(response.profile.inventory.is_empty());
        assert!(response.profile.active_buffs.is_empty());
        assert_eq!(response.profile.last_reward_date, "");
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn login_is_case_and_whitespace_insensitive() {
        let (state, store) = state_with_store().await;

        login(&state, login_request("Ada")).await.unwrap();
        let second = login(&state, login_request("  aDa ")).await.unwrap();

        assert_eq!(second.profile.username, "Ada");
        assert_eq!(store.user_count(), 1);
    }

    #[tokio::test]
    async fn degraded_login_yields_guest_record_and_notice() {
        let state = AppState::new(AppConfig::default(), None);

        let response = login(&state, login_request("Ada")).await.unwrap();
        assert!(!response.persisted);
        assert!(response.notice.is_some());
        assert_eq!(response.profile.xp, state.config().guest_xp());

        // Flushing a guest record is a no-op and must not panic or error.
        let session = state.session(response.session_id).unwrap();
        let guard = session.lock().await;
        persist(&state, &guard).await;
    }

    #[tokio::test]
    async fn persist_overwrites_the_stored_row() {
        let (state, store) = state_with_store().await;
        let response = login(&state, login_request("Ada")).await.unwrap();
        let session = state.session(response.session_id).unwrap();

        {
            let mut guard = session.lock().await;
            guard.record.xp = 250;
            persist(&state, &guard).await;
        }

        let stored = store.find_user("ada").await.unwrap().unwrap();
        assert_eq!(stored.xp, 250);
    }

    #[tokio::test]
    async fn persist_swallows_missing_rows() {
        let (state, _store) = state_with_store().await;
        let session = SessionState::new(UserEntity::new("Ghost"), true);
        // No row was ever appended for this record; the flush is dropped.
        persist(&state, &session).await;
    }

    #[tokio::test]
    async fn logout_discards_the_session() {
        let (state, _store) = state_with_store().await;
        let response = login(&state, login_request("Ada")).await.unwrap();

        logout(&state, response.session_id).unwrap();
        assert!(matches!(
            logout(&state, response.session_id),
            Err(ServiceError::NotFound(_))
        ));
    }
}

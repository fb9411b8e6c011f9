use rand::seq::IndexedRandom;
use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::today,
    dto::{cards::CardDrawResponse, session::UserProfile},
    error::ServiceError,
    services::session_service,
    state::SharedState,
};

/// Draw the daily fate card for the session's user.
///
/// One draw per calendar day, keyed on the stored reward date, so the gate
/// survives logouts and restarts for persisted users.
pub async fn draw(state: &SharedState, session_id: Uuid) -> Result<CardDrawResponse, ServiceError> {
    let session = state.session(session_id)?;
    let mut guard = session.lock().await;

    let drawn_on = today();
    if guard.record.last_reward_date == drawn_on {
        return Err(ServiceError::InvalidInput(
            "today's card has already been drawn".into(),
        ));
    }

    let card = state
        .config()
        .cards()
        .choose(&mut rand::rng())
        .ok_or_else(|| ServiceError::InvalidState("the fate deck is empty".into()))?
        .clone();

    guard.record.xp += card.xp;
    guard.record.level = state.config().level(guard.record.xp);
    guard.record.last_reward_date = drawn_on.clone();
    info!(
        username = guard.record.username,
        card = card.name,
        xp = card.xp,
        "fate card drawn"
    );

    session_service::persist(state, &guard).await;

    Ok(CardDrawResponse {
        card: card.name,
        xp_awarded: card.xp,
        drawn_on,
        profile: UserProfile::from_record(&guard.record, state.config()),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::user_store::{UserStore, memory::MemoryUserStore},
        dto::session::LoginRequest,
        state::AppState,
    };

    use super::*;

    async fn logged_in_session() -> (SharedState, MemoryUserStore, Uuid) {
        let state = AppState::new(AppConfig::default(), None);
        let store = MemoryUserStore::new();
        state.install_user_store(Arc::new(store.clone())).await;
        let response = session_service::login(
            &state,
            LoginRequest {
                nickname: "Ada".to_string(),
            },
        )
        .await
        .unwrap();
        (state, store, response.session_id)
    }

    #[tokio::test]
    async fn draw_awards_xp_and_records_the_date() {
        let (state, store, id) = logged_in_session().await;

        let response = draw(&state, id).await.unwrap();
        assert!(response.xp_awarded > 0);
        assert_eq!(response.profile.xp, response.xp_awarded);
        assert_eq!(response.drawn_on, today());

        let stored = store.find_user("ada").await.unwrap().unwrap();
        assert_eq!(stored.last_reward_date, today());
        assert_eq!(stored.xp, response.xp_awarded);
    }

    #[tokio::test]
    async fn second_draw_on_the_same_day_is_rejected() {
        let (state, _store, id) = logged_in_session().await;

        draw(&state, id).await.unwrap();
        let err = draw(&state, id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn stored_date_gates_a_fresh_session() {
        let (state, _store, id) = logged_in_session().await;
        draw(&state, id).await.unwrap();
        session_service::logout(&state, id).unwrap();

        // A new login reloads the record; the stored date still gates the draw.
        let response = session_service::login(
            &state,
            LoginRequest {
                nickname: "ada".to_string(),
            },
        )
        .await
        .unwrap();
        let err = draw(&state, response.session_id).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

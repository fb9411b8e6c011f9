use tracing::info;
use uuid::Uuid;

use crate::{
    dao::models::{ChatMessageEntity, minute_stamp},
    dto::chat::{ChatMessage, ChatPageResponse, ChatPostRequest},
    error::ServiceError,
    state::SharedState,
};

/// Page size when the caller does not ask for one.
const DEFAULT_PAGE: usize = 50;
/// Hard ceiling on a requested page size.
const MAX_PAGE: usize = 200;

/// Post one message to the shared wall under the session's nickname.
///
/// Unlike record flushes the wall requires the store: a message that cannot
/// be appended is an error, not a silent drop.
pub async fn post(
    state: &SharedState,
    session_id: Uuid,
    request: ChatPostRequest,
) -> Result<ChatMessage, ServiceError> {
    let body = request.body.trim();
    if body.is_empty() {
        return Err(ServiceError::InvalidInput("the message must not be blank".into()));
    }

    let username = {
        let session = state.session(session_id)?;
        let guard = session.lock().await;
        guard.record.username.clone()
    };

    let store = state.require_user_store().await?;
    let message = ChatMessageEntity {
        sent_at: minute_stamp(),
        username,
        body: body.to_string(),
    };
    store.append_message(message.clone()).await?;
    info!(username = message.username, "wall message posted");

    Ok(message.into())
}

/// The most recent page of the wall, oldest first.
pub async fn recent(
    state: &SharedState,
    limit: Option<usize>,
) -> Result<ChatPageResponse, ServiceError> {
    let limit = limit.unwrap_or(DEFAULT_PAGE).min(MAX_PAGE);
    let store = state.require_user_store().await?;
    let messages = store.list_messages(limit).await?;

    Ok(ChatPageResponse {
        messages: messages.into_iter().map(Into::into).collect(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::user_store::memory::MemoryUserStore,
        dto::session::LoginRequest,
        services::session_service,
        state::AppState,
    };

    use super::*;

    async fn logged_in_session() -> (SharedState, Uuid) {
        let state = AppState::new(AppConfig::default(), None);
        state
            .install_user_store(Arc::new(MemoryUserStore::new()))
            .await;
        let response = session_service::login(
            &state,
            LoginRequest {
                nickname: "Ada".to_string(),
            },
        )
        .await
        .unwrap();
        (state, response.session_id)
    }

    fn post_request(body: &str) -> ChatPostRequest {
        ChatPostRequest {
            body: body.to_string(),
        }
    }

    #[tokio::test]
    async fn posted_messages_come_back_in_order() {
        let (state, id) = logged_in_session().await;

        post(&state, id, post_request("hello")).await.unwrap();
        post(&state, id, post_request("world")).await.unwrap();

        let page = recent(&state, None).await.unwrap();
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.messages[0].body, "hello");
        assert_eq!(page.messages[1].body, "world");
        assert_eq!(page.messages[0].username, "Ada");
    }

    #[tokio::test]
    async fn page_size_is_capped() {
        let (state, id) = logged_in_session().await;
        for i in 0..3 {
            post(&state, id, post_request(&format!("message {i}")))
                .await
                .unwrap();
        }

        let page = recent(&state, Some(2)).await.unwrap();
        assert_eq!(page.messages.len(), 2);
        assert_eq!(page.messages[0].body, "message 1");
    }

    #[tokio::test]
    async fn posting_requires_the_store() {
        let state = AppState::new(AppConfig::default(), None);
        let response_err = recent(&state, None).await.unwrap_err();
        assert!(matches!(response_err, ServiceError::Degraded));
    }

    #[tokio::test]
    async fn blank_messages_are_rejected() {
        let (state, id) = logged_in_session().await;
        let err = post(&state, id, post_request("  ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dao::models::ChatMessageEntity;

/// Request to post one message to the shared wall.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct ChatPostRequest {
    /// Message body.
    #[validate(length(min = 1, max = 500))]
    pub body: String,
}

/// One message on the wall.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ChatMessage {
    /// Timestamp with minute precision.
    pub sent_at: String,
    /// Author display name.
    pub username: String,
    /// Message body.
    pub body: String,
}

impl From<ChatMessageEntity> for ChatMessage {
    fn from(message: ChatMessageEntity) -> Self {
        Self {
            sent_at: message.sent_at,
            username: message.username,
            body: message.body,
        }
    }
}

/// Most recent page of the wall, oldest first.
#[derive(Debug, Serialize, ToSchema)]
pub struct ChatPageResponse {
    /// The messages.
    pub messages: Vec<ChatMessage>,
}

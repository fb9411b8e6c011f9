use serde::Serialize;
use utoipa::ToSchema;

use crate::dto::session::UserProfile;

/// Result of a daily fate-card draw.
#[derive(Debug, Serialize, ToSchema)]
pub struct CardDrawResponse {
    /// Title of the drawn card.
    pub card: String,
    /// XP granted by the card.
    pub xp_awarded: u64,
    /// Date the draw was recorded under ("YYYY-MM-DD").
    pub drawn_on: String,
    /// Profile after the draw.
    pub profile: UserProfile,
}

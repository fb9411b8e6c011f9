use serde::Serialize;
use utoipa::ToSchema;

use crate::state::LeaderboardRow;

/// One ranked row of the leaderboard.
#[derive(Debug, Serialize, ToSchema, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// 1-based position after the descending XP sort.
    pub rank: u32,
    /// Display name with original casing.
    pub username: String,
    /// Accumulated experience points.
    pub xp: u64,
    /// "gold", "silver", or "bronze" for the top three ranks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medal: Option<String>,
    /// Badge-qualifying inventory item ids.
    pub badges: Vec<String>,
}

impl LeaderboardEntry {
    /// Build an entry from its 1-based rank and a cached row.
    pub fn from_row(rank: u32, row: &LeaderboardRow) -> Self {
        let medal = match rank {
            1 => Some("gold"),
            2 => Some("silver"),
            3 => Some("bronze"),
            _ => None,
        };
        Self {
            rank,
            username: row.username.clone(),
            xp: row.xp,
            medal: medal.map(str::to_string),
            badges: row.badges.clone(),
        }
    }
}

/// Ranked snapshot of all users.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaderboardResponse {
    /// Rows sorted by XP descending.
    pub entries: Vec<LeaderboardEntry>,
}

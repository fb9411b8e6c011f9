use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::AppConfig,
    dao::models::{BuffEntity, HistoryEntryEntity, UserEntity},
    dto::validation::validate_nickname,
};

/// Login request; the nickname is the only form of identity in this system.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct LoginRequest {
    /// Nickname to log in or register with.
    #[validate(custom(function = validate_nickname))]
    pub nickname: String,
}

/// One completed focus session in a profile's history.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct HistoryEntry {
    /// Completion timestamp with minute precision.
    pub date: String,
    /// Study topic.
    pub topic: String,
    /// Focused minutes credited.
    pub duration_minutes: u32,
    /// XP granted after buffs.
    pub xp_awarded: u64,
}

impl From<&HistoryEntryEntity> for HistoryEntry {
    fn from(entry: &HistoryEntryEntity) -> Self {
        Self {
            date: entry.date.clone(),
            topic: entry.topic.clone(),
            duration_minutes: entry.duration_minutes,
            xp_awarded: entry.xp_awarded,
        }
    }
}

/// A pending XP multiplier.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct ActiveBuff {
    /// Display name of the buff.
    pub name: String,
    /// Multiplier applied to the next completed session.
    pub multiplier: f64,
}

impl From<&BuffEntity> for ActiveBuff {
    fn from(buff: &BuffEntity) -> Self {
        Self {
            name: buff.name.clone(),
            multiplier: buff.multiplier,
        }
    }
}

/// Full profile projection of a user record.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct UserProfile {
    /// Display name with original casing.
    pub username: String,
    /// Accumulated experience points.
    pub xp: u64,
    /// Numeric level derived from the rank ladder.
    pub level: u32,
    /// Rank title earned at the current XP.
    pub rank_title: String,
    /// Completed focus sessions, newest first.
    pub history: Vec<HistoryEntry>,
    /// Owned cosmetic item identifiers.
    pub inventory: Vec<String>,
    /// Pending buffs.
    pub active_buffs: Vec<ActiveBuff>,
    /// Date of the last daily card draw, empty if never drawn.
    pub last_reward_date: String,
}

impl UserProfile {
    /// Project a stored record into its profile view.
    pub fn from_record(record: &UserEntity, config: &AppConfig) -> Self {
        Self {
            username: record.username.clone(),
            xp: record.xp,
            level: record.level,
            rank_title: config.rank_title(record.xp).to_string(),
            history: record.history.iter().map(Into::into).collect(),
            inventory: record.inventory.clone(),
            active_buffs: record.active_buffs.iter().map(Into::into).collect(),
            last_reward_date: record.last_reward_date.clone(),
        }
    }
}

/// Response to a successful login.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    /// Identifier to pass on subsequent session-scoped requests.
    pub session_id: Uuid,
    /// False when the store was unreachable and the record lives only in memory.
    pub persisted: bool,
    /// Non-fatal notice shown to the user, e.g. the degraded-mode warning.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    /// The logged-in profile.
    pub profile: UserProfile,
}

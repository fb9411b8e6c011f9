use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, macros::format_description};

/// One completed focus session, newest first in the history list.
///
/// Serde renames keep the JSON cell layout compatible with rows written by
/// earlier iterations of the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntryEntity {
    /// Completion timestamp with minute precision ("YYYY-MM-DD HH:MM").
    pub date: String,
    /// Free-text study topic supplied when the session started.
    #[serde(rename = "course")]
    pub topic: String,
    /// Focused minutes credited for the session.
    #[serde(rename = "duration")]
    pub duration_minutes: u32,
    /// XP granted for the session after buffs.
    #[serde(rename = "xp")]
    pub xp_awarded: u64,
}

/// Single-use XP multiplier consumed by the next completed session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BuffEntity {
    /// Display name of the buff.
    pub name: String,
    /// Multiplier applied to the payout.
    pub multiplier: f64,
}

/// One user row as persisted by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserEntity {
    /// Display name with original casing preserved.
    pub username: String,
    /// Accumulated experience points.
    pub xp: u64,
    /// Derived rank level, kept as its own column for sheet compatibility.
    pub level: u32,
    /// Completed focus sessions, newest first.
    pub history: Vec<HistoryEntryEntity>,
    /// Legacy task list cell; preserved round-trip but unused by this core.
    pub tasks: Vec<serde_json::Value>,
    /// Legacy card list cell; preserved round-trip but unused by this core.
    pub cards: Vec<serde_json::Value>,
    /// Date of the first login under this nickname ("YYYY-MM-DD").
    pub last_login: String,
    /// Owned cosmetic item identifiers, each purchasable once.
    pub inventory: Vec<String>,
    /// Pending buffs; cleared by the next completed session.
    pub active_buffs: Vec<BuffEntity>,
    /// Date of the last daily card draw ("YYYY-MM-DD"), empty if never drawn.
    pub last_reward_date: String,
}

impl UserEntity {
    /// Construct a fresh record for a first-time login.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            xp: 0,
            level: 1,
            history: Vec::new(),
            tasks: Vec::new(),
            cards: Vec::new(),
            last_login: today(),
            inventory: Vec::new(),
            active_buffs: Vec::new(),
            last_reward_date: String::new(),
        }
    }

    /// Identity key for case- and whitespace-insensitive lookups.
    pub fn normalized_key(&self) -> String {
        normalize_username(&self.username)
    }
}

/// One message on the shared chat wall.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatMessageEntity {
    /// Timestamp with minute precision ("YYYY-MM-DD HH:MM").
    pub sent_at: String,
    /// Display name of the author.
    pub username: String,
    /// Message body.
    pub body: String,
}

/// Normalize a nickname into its identity key (trimmed, lower-cased).
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Current UTC date as "YYYY-MM-DD".
pub fn today() -> String {
    let format = format_description!("[year]-[month]-[day]");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "invalid-date".into())
}

/// Current UTC timestamp with minute precision as "YYYY-MM-DD HH:MM".
pub fn minute_stamp() -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    OffsetDateTime::now_utc()
        .format(&format)
        .unwrap_or_else(|_| "invalid-date".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        assert_eq!(normalize_username("  Ada "), "ada");
        assert_eq!(normalize_username("ADA"), "ada");
        assert_eq!(
            UserEntity::new(" Ada ").normalized_key(),
            normalize_username("ada")
        );
    }

    #[test]
    fn new_records_start_with_defaults() {
        let user = UserEntity::new("Ada");
        assert_eq!(user.xp, 0);
        assert_eq!(user.level, 1);
        assert!(user.history.is_empty());
        assert!(user.inventory.is_empty());
        assert!(user.active_buffs.is_empty());
        assert_eq!(user.last_reward_date, "");
        assert_eq!(user.last_login, today());
    }

    #[test]
    fn history_entry_uses_legacy_json_keys() {
        let entry = HistoryEntryEntity {
            date: "2026-08-23 10:15".into(),
            topic: "Mathematics".into(),
            duration_minutes: 25,
            xp_awarded: 50,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["course"], "Mathematics");
        assert_eq!(json["duration"], 25);
        assert_eq!(json["xp"], 50);
    }
}

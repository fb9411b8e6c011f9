//! Row codec translating between entities and spreadsheet cell rows.
//!
//! List and record fields are JSON-encoded into single cells. Decoding is
//! tolerant: missing trailing columns and unparsable cells fall back to
//! defaults so rows written by older iterations keep loading.

use serde::de::DeserializeOwned;

use crate::dao::models::{ChatMessageEntity, UserEntity};

/// Header row of the users worksheet, one cell per column, fixed order.
pub const USER_HEADER: [&str; 10] = [
    "Username",
    "XP",
    "Level",
    "History",
    "Tasks",
    "Cards",
    "Last_Login",
    "Inventory",
    "Active_Buffs",
    "Last_Oracle",
];

/// Header row of the chat worksheet.
pub const CHAT_HEADER: [&str; 3] = ["Sent_At", "Username", "Message"];

/// Serialize a user record into its cell row.
pub fn encode_user_row(user: &UserEntity) -> Result<Vec<String>, serde_json::Error> {
    Ok(vec![
        user.username.clone(),
        user.xp.to_string(),
        user.level.to_string(),
        serde_json::to_string(&user.history)?,
        serde_json::to_string(&user.tasks)?,
        serde_json::to_string(&user.cards)?,
        user.last_login.clone(),
        serde_json::to_string(&user.inventory)?,
        serde_json::to_string(&user.active_buffs)?,
        user.last_reward_date.clone(),
    ])
}

/// Decode a cell row back into a user record, backfilling absent fields.
pub fn decode_user_row(cells: &[String]) -> UserEntity {
    UserEntity {
        username: cell(cells, 0).to_string(),
        xp: cell(cells, 1).parse().unwrap_or(0),
        level: cell(cells, 2).parse().unwrap_or(1),
        history: json_cell(cells, 3),
        tasks: json_cell(cells, 4),
        cards: json_cell(cells, 5),
        last_login: cell(cells, 6).to_string(),
        inventory: json_cell(cells, 7),
        active_buffs: json_cell(cells, 8),
        last_reward_date: cell(cells, 9).to_string(),
    }
}

/// Serialize a chat message into its cell row.
pub fn encode_chat_row(message: &ChatMessageEntity) -> Vec<String> {
    vec![
        message.sent_at.clone(),
        message.username.clone(),
        message.body.clone(),
    ]
}

/// Decode a cell row back into a chat message.
pub fn decode_chat_row(cells: &[String]) -> ChatMessageEntity {
    ChatMessageEntity {
        sent_at: cell(cells, 0).to_string(),
        username: cell(cells, 1).to_string(),
        body: cell(cells, 2).to_string(),
    }
}

fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(String::as_str).unwrap_or("")
}

fn json_cell<T>(cells: &[String], index: usize) -> Vec<T>
where
    T: DeserializeOwned,
{
    let raw = cell(cells, index);
    if raw.is_empty() {
        return Vec::new();
    }
    serde_json::from_str(raw).unwrap_or_default()
}

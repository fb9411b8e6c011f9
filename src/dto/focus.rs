use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::dto::session::UserProfile;

/// Time mode requested for a focus session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FocusModeInput {
    /// Countdown toward `target_minutes`.
    Fixed,
    /// Open-ended stopwatch.
    Open,
}

/// Request to start a focus session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct StartFocusRequest {
    /// Countdown or stopwatch.
    pub mode: FocusModeInput,
    /// Study topic; mandatory, blank values are rejected.
    #[validate(length(max = 100))]
    pub topic: String,
    /// Countdown length; required for fixed mode, ignored otherwise.
    #[validate(range(min = 1, max = 480))]
    pub target_minutes: Option<u32>,
}

/// Payout granted for a completed session.
#[derive(Debug, Serialize, ToSchema, Clone)]
pub struct PayoutSummary {
    /// Topic the session was started with.
    pub topic: String,
    /// Whole minutes credited.
    pub minutes: u32,
    /// Multiplier that was applied (1.0 when no buff was active).
    pub multiplier: f64,
    /// XP granted after the multiplier.
    pub xp_awarded: u64,
    /// Total XP after the payout.
    pub new_xp: u64,
    /// Level after the payout.
    pub new_level: u32,
}

/// Current state of the focus timer, refreshed on every status poll.
#[derive(Debug, Serialize, ToSchema)]
pub struct FocusStatusResponse {
    /// Whether a session is running.
    pub running: bool,
    /// Topic of the running session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    /// Mode of the running session.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<FocusModeInput>,
    /// Seconds elapsed since start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_seconds: Option<u64>,
    /// Seconds left on a fixed-duration countdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remaining_seconds: Option<u64>,
    /// Present when this poll observed the countdown elapsing and paid out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<PayoutSummary>,
}

/// Response to an explicit stop request.
#[derive(Debug, Serialize, ToSchema)]
pub struct StopFocusResponse {
    /// "cancelled", "discarded", or "completed".
    pub outcome: String,
    /// Present when the stop qualified for a payout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payout: Option<PayoutSummary>,
    /// Profile after the stop.
    pub profile: UserProfile,
}

use std::time::Instant;

use tracing::info;
use uuid::Uuid;

use crate::{
    config::AppConfig,
    dao::models::{HistoryEntryEntity, UserEntity, minute_stamp},
    dto::focus::{
        FocusModeInput, FocusStatusResponse, PayoutSummary, StartFocusRequest, StopFocusResponse,
    },
    dto::session::UserProfile,
    error::ServiceError,
    services::session_service,
    state::{
        SharedState,
        session::{CompletedFocus, FocusMode, FocusPhase, FocusTimer, StopOutcome},
    },
};

/// Start the session's focus timer.
pub async fn start(
    state: &SharedState,
    session_id: Uuid,
    request: StartFocusRequest,
) -> Result<FocusStatusResponse, ServiceError> {
    let mode = match request.mode {
        FocusModeInput::Fixed => {
            let target_minutes = request.target_minutes.ok_or_else(|| {
                ServiceError::InvalidInput(
                    "fixed-duration focus requires `target_minutes`".into(),
                )
            })?;
            FocusMode::FixedDuration { target_minutes }
        }
        FocusModeInput::Open => FocusMode::OpenEnded,
    };

    let session = state.session(session_id)?;
    let mut guard = session.lock().await;
    guard.timer.start(mode, &request.topic, Instant::now())?;
    info!(%session_id, topic = request.topic, ?mode, "focus started");

    Ok(status_of(&guard.timer, None))
}

/// Report the timer's current phase.
///
/// A fixed-duration timer that has reached its target completes here: the
/// payout is applied and flushed, and the response carries the summary.
pub async fn status(
    state: &SharedState,
    session_id: Uuid,
) -> Result<FocusStatusResponse, ServiceError> {
    let session = state.session(session_id)?;
    let mut guard = session.lock().await;

    let payout = match guard.timer.try_complete(Instant::now()) {
        Some(completed) => {
            let summary = apply_payout(state.config(), &mut guard.record, &completed);
            session_service::persist(state, &guard).await;
            Some(summary)
        }
        None => None,
    };

    Ok(status_of(&guard.timer, payout))
}

/// Stop the timer early.
///
/// A fixed-duration timer stops as a cancellation with no payout. An
/// open-ended timer pays out the elapsed whole minutes, or is discarded when
/// less than one minute has passed.
pub async fn stop(
    state: &SharedState,
    session_id: Uuid,
) -> Result<StopFocusResponse, ServiceError> {
    let session = state.session(session_id)?;
    let mut guard = session.lock().await;
    let now = Instant::now();

    // A fixed timer past its target completes rather than cancels.
    let outcome = match guard.timer.try_complete(now) {
        Some(completed) => StopOutcome::Completed(completed),
        None => guard.timer.stop(now)?,
    };

    let payout = match &outcome {
        StopOutcome::Completed(completed) => {
            let summary = apply_payout(state.config(), &mut guard.record, completed);
            session_service::persist(state, &guard).await;
            Some(summary)
        }
        StopOutcome::Cancelled | StopOutcome::Discarded => None,
    };

    let outcome_name = match &outcome {
        StopOutcome::Cancelled => "cancelled",
        StopOutcome::Discarded => "discarded",
        StopOutcome::Completed(_) => "completed",
    };
    info!(%session_id, outcome = outcome_name, "focus stopped");

    Ok(StopFocusResponse {
        outcome: outcome_name.to_string(),
        payout,
        profile: UserProfile::from_record(&guard.record, state.config()),
    })
}

/// Apply a completed focus block to the record and return the summary.
///
/// The strongest active buff multiplies the base payout, fractions floored.
/// All active buffs are consumed by the payout, whatever their strength.
pub fn apply_payout(
    config: &AppConfig,
    record: &mut UserEntity,
    completed: &CompletedFocus,
) -> PayoutSummary {
    let multiplier = record
        .active_buffs
        .iter()
        .map(|buff| buff.multiplier)
        .fold(1.0_f64, f64::max);

    let base = config.xp_per_minute() * u64::from(completed.minutes);
    let xp_awarded = ((base as f64) * multiplier).floor() as u64;

    record.history.insert(
        0,
        HistoryEntryEntity {
            date: minute_stamp(),
            topic: completed.topic.clone(),
            duration_minutes: completed.minutes,
            xp_awarded,
        },
    );
    record.xp += xp_awarded;
    record.active_buffs.clear();
    record.level = config.level(record.xp);

    info!(
        username = record.username,
        topic = completed.topic,
        minutes = completed.minutes,
        multiplier,
        xp_awarded,
        "focus payout applied"
    );

    PayoutSummary {
        topic: completed.topic.clone(),
        minutes: completed.minutes,
        multiplier,
        xp_awarded,
        new_xp: record.xp,
        new_level: record.level,
    }
}

fn status_of(timer: &FocusTimer, payout: Option<PayoutSummary>) -> FocusStatusResponse {
    let now = Instant::now();
    match timer.phase() {
        FocusPhase::Running { mode, topic, .. } => FocusStatusResponse {
            running: true,
            topic: Some(topic.clone()),
            mode: Some(match mode {
                FocusMode::FixedDuration { .. } => FocusModeInput::Fixed,
                FocusMode::OpenEnded => FocusModeInput::Open,
            }),
            elapsed_seconds: timer.elapsed(now).map(|d| d.as_secs()),
            remaining_seconds: timer.remaining(now).map(|d| d.as_secs()),
            payout,
        },
        FocusPhase::Idle => FocusStatusResponse {
            running: false,
            topic: None,
            mode: None,
            elapsed_seconds: None,
            remaining_seconds: None,
            payout,
        },
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use crate::{
        config::AppConfig,
        dao::models::BuffEntity,
        dao::user_store::{UserStore, memory::MemoryUserStore},
        dto::session::LoginRequest,
        state::AppState,
    };

    use super::*;

    async fn logged_in_session(nickname: &str) -> (SharedState, MemoryUserStore, Uuid) {
        let state = AppState::new(AppConfig::default(), None);
        let store = MemoryUserStore::new();
        state.install_user_store(Arc::new(store.clone())).await;
        let response = session_service::login(
            &state,
            LoginRequest {
                nickname: nickname.to_string(),
            },
        )
        .await
        .unwrap();
        (state, store, response.session_id)
    }

    fn start_request(mode: FocusModeInput, target_minutes: Option<u32>) -> StartFocusRequest {
        StartFocusRequest {
            mode,
            topic: "algebra".to_string(),
            target_minutes,
        }
    }

    #[tokio::test]
    async fn fixed_mode_requires_a_target() {
        let (state, _store, id) = logged_in_session("Ada").await;
        let err = start(&state, id, start_request(FocusModeInput::Fixed, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn starting_twice_is_rejected() {
        let (state, _store, id) = logged_in_session("Ada").await;
        start(&state, id, start_request(FocusModeInput::Open, None))
            .await
            .unwrap();
        let err = start(&state, id, start_request(FocusModeInput::Open, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidState(_)));
    }

    #[tokio::test]
    async fn elapsed_fixed_timer_pays_out_on_status() {
        let (state, store, id) = logged_in_session("Ada").await;
        start(&state, id, start_request(FocusModeInput::Fixed, Some(25)))
            .await
            .unwrap();

        {
            let session = state.session(id).unwrap();
            let mut guard = session.lock().await;
            guard.timer.backdate(Duration::from_secs(25 * 60));
        }

        let response = status(&state, id).await.unwrap();
        assert!(!response.running);
        let payout = response.payout.unwrap();
        assert_eq!(payout.minutes, 25);
        assert_eq!(payout.xp_awarded, 50);
        assert_eq!(payout.new_xp, 50);

        let stored = store.find_user("ada").await.unwrap().unwrap();
        assert_eq!(stored.xp, 50);
        assert_eq!(stored.history.len(), 1);
        assert_eq!(stored.history[0].topic, "algebra");
    }

    #[tokio::test]
    async fn stopping_a_fixed_timer_early_cancels_without_payout() {
        let (state, store, id) = logged_in_session("Ada").await;
        start(&state, id, start_request(FocusModeInput::Fixed, Some(25)))
            .await
            .unwrap();

        let response = stop(&state, id).await.unwrap();
        assert_eq!(response.outcome, "cancelled");
        assert!(response.payout.is_none());
        assert_eq!(response.profile.xp, 0);
        assert!(store.find_user("ada").await.unwrap().unwrap().history.is_empty());
    }

    #[tokio::test]
    async fn open_ended_stop_pays_whole_minutes() {
        let (state, _store, id) = logged_in_session("Ada").await;
        start(&state, id, start_request(FocusModeInput::Open, None))
            .await
            .unwrap();

        {
            let session = state.session(id).unwrap();
            let mut guard = session.lock().await;
            guard.timer.backdate(Duration::from_secs(13 * 60 + 42));
        }

        let response = stop(&state, id).await.unwrap();
        assert_eq!(response.outcome, "completed");
        let payout = response.payout.unwrap();
        assert_eq!(payout.minutes, 13);
        assert_eq!(payout.xp_awarded, 26);
    }

    #[tokio::test]
    async fn sub_minute_open_ended_stop_is_discarded() {
        let (state, _store, id) = logged_in_session("Ada").await;
        start(&state, id, start_request(FocusModeInput::Open, None))
            .await
            .unwrap();

        {
            let session = state.session(id).unwrap();
            let mut guard = session.lock().await;
            guard.timer.backdate(Duration::from_secs(40));
        }

        let response = stop(&state, id).await.unwrap();
        assert_eq!(response.outcome, "discarded");
        assert!(response.payout.is_none());
        assert_eq!(response.profile.xp, 0);
        assert!(response.profile.history.is_empty());
    }

    #[tokio::test]
    async fn strongest_buff_multiplies_and_all_buffs_are_consumed() {
        let config = AppConfig::default();
        let mut record = UserEntity::new("Ada");
        record.active_buffs = vec![
            BuffEntity {
                name: "Focus Elixir".into(),
                multiplier: 1.5,
            },
            BuffEntity {
                name: "Weak Tea".into(),
                multiplier: 1.1,
            },
        ];

        let summary = apply_payout(
            &config,
            &mut record,
            &CompletedFocus {
                topic: "algebra".into(),
                minutes: 25,
            },
        );

        // 25 min * 2 XP/min * 1.5 = 75
        assert_eq!(summary.xp_awarded, 75);
        assert!((summary.multiplier - 1.5).abs() < f64::EPSILON);
        assert!(record.active_buffs.is_empty());
    }

    #[tokio::test]
    async fn fractional_payouts_floor() {
        let config = AppConfig::default();
        let mut record = UserEntity::new("Ada");
        record.active_buffs = vec![BuffEntity {
            name: "Focus Elixir".into(),
            multiplier: 1.5,
        }];

        let summary = apply_payout(
            &config,
            &mut record,
            &CompletedFocus {
                topic: "algebra".into(),
                minutes: 3,
            },
        );

        // 3 min * 2 XP/min * 1.5 = 9, no fraction.
        assert_eq!(summary.xp_awarded, 9);

        let mut record = UserEntity::new("Ada");
        record.active_buffs = vec![BuffEntity {
            name: "Odd Brew".into(),
            multiplier: 1.25,
        }];
        let summary = apply_payout(
            &config,
            &mut record,
            &CompletedFocus {
                topic: "algebra".into(),
                minutes: 1,
            },
        );
        // 2 * 1.25 = 2.5, floored to 2.
        assert_eq!(summary.xp_awarded, 2);
    }
}

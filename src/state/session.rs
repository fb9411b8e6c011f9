//! Per-user session state and the focus-timer state machine.
//!
//! A [`SessionState`] is created at login and discarded at logout; it owns the
//! in-memory user record and the timer. The timer takes explicit `now`
//! instants so transitions stay deterministic under test.

use std::time::{Duration, Instant};

use thiserror::Error;

use crate::dao::models::UserEntity;

/// How a focus session measures time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusMode {
    /// Countdown toward a fixed target; completing it pays out the full target.
    FixedDuration {
        /// Countdown length in minutes.
        target_minutes: u32,
    },
    /// Open-ended stopwatch; stopping it pays out elapsed whole minutes.
    OpenEnded,
}

/// Phase of the focus timer.
#[derive(Debug, Clone)]
pub enum FocusPhase {
    /// No session is running.
    Idle,
    /// A session is in progress.
    Running {
        /// Time mode chosen at start.
        mode: FocusMode,
        /// Study topic supplied at start.
        topic: String,
        /// Instant the session began.
        started_at: Instant,
    },
}

/// Error returned when a timer transition is not allowed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// Starting without a topic is rejected with no state change.
    #[error("a topic is required to start a focus session")]
    MissingTopic,
    /// At most one focus session may run per session.
    #[error("a focus session is already running")]
    AlreadyRunning,
    /// Stop requested while idle.
    #[error("no focus session is running")]
    NotRunning,
}

/// A session that finished and qualifies for a payout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedFocus {
    /// Topic the session was started with.
    pub topic: String,
    /// Whole minutes credited.
    pub minutes: u32,
}

/// Result of an explicit stop request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    /// Fixed-duration session stopped early; no payout, nothing recorded.
    Cancelled,
    /// Open-ended session stopped before one full minute; no payout.
    Discarded,
    /// Open-ended session stopped with at least one full minute elapsed.
    Completed(CompletedFocus),
}

/// Focus-timer state machine: `Idle` ⇄ `Running`.
#[derive(Debug, Clone, Default)]
pub struct FocusTimer {
    phase: FocusPhase,
}

impl Default for FocusPhase {
    fn default() -> Self {
        FocusPhase::Idle
    }
}

impl FocusTimer {
    /// Create a timer in the idle state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> &FocusPhase {
        &self.phase
    }

    /// Whether a session is currently running.
    pub fn is_running(&self) -> bool {
        matches!(self.phase, FocusPhase::Running { .. })
    }

    /// Start a session. The topic is mandatory; a blank topic is rejected
    /// without any state change.
    pub fn start(&mut self, mode: FocusMode, topic: &str, now: Instant) -> Result<(), TimerError> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(TimerError::MissingTopic);
        }
        if self.is_running() {
            return Err(TimerError::AlreadyRunning);
        }

        self.phase = FocusPhase::Running {
            mode,
            topic: topic.to_string(),
            started_at: now,
        };
        Ok(())
    }

    /// Time elapsed since start, `None` while idle.
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        match &self.phase {
            FocusPhase::Running { started_at, .. } => {
                Some(now.saturating_duration_since(*started_at))
            }
            FocusPhase::Idle => None,
        }
    }

    /// Time left until a fixed-duration session completes; `None` while idle
    /// or open-ended.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        match &self.phase {
            FocusPhase::Running {
                mode: FocusMode::FixedDuration { target_minutes },
                started_at,
                ..
            } => {
                let target = Duration::from_secs(u64::from(*target_minutes) * 60);
                Some(target.saturating_sub(now.saturating_duration_since(*started_at)))
            }
            _ => None,
        }
    }

    /// Complete a fixed-duration session whose countdown has elapsed.
    ///
    /// Returns the payout-qualifying completion and resets to idle; `None`
    /// when idle, open-ended, or still counting down. This is the display
    /// refresh hook: callers invoke it on every status poll.
    pub fn try_complete(&mut self, now: Instant) -> Option<CompletedFocus> {
        let FocusPhase::Running {
            mode: FocusMode::FixedDuration { target_minutes },
            topic,
            started_at,
        } = &self.phase
        else {
            return None;
        };

        let target = Duration::from_secs(u64::from(*target_minutes) * 60);
        if now.saturating_duration_since(*started_at) < target {
            return None;
        }

        let completed = CompletedFocus {
            topic: topic.clone(),
            minutes: *target_minutes,
        };
        self.phase = FocusPhase::Idle;
        Some(completed)
    }

    /// Stop the running session.
    ///
    /// Fixed-duration sessions are cancelled outright. Open-ended sessions
    /// pay out elapsed whole minutes when at least one has passed, and are
    /// discarded otherwise.
    pub fn stop(&mut self, now: Instant) -> Result<StopOutcome, TimerError> {
        let FocusPhase::Running {
            mode,
            topic,
            started_at,
        } = &self.phase
        else {
            return Err(TimerError::NotRunning);
        };

        let outcome = match mode {
            FocusMode::FixedDuration { .. } => StopOutcome::Cancelled,
            FocusMode::OpenEnded => {
                let minutes = now.saturating_duration_since(*started_at).as_secs() / 60;
                if minutes >= 1 {
                    StopOutcome::Completed(CompletedFocus {
                        topic: topic.clone(),
                        minutes: minutes as u32,
                    })
                } else {
                    StopOutcome::Discarded
                }
            }
        };

        self.phase = FocusPhase::Idle;
        Ok(outcome)
    }

    /// Shift the running session's start back in time to simulate elapsed time.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        if let FocusPhase::Running { started_at, .. } = &mut self.phase {
            *started_at -= by;
        }
    }
}

/// Session-scoped state created at login and discarded at logout.
#[derive(Debug)]
pub struct SessionState {
    /// In-memory user record, flushed to storage after mutating actions.
    pub record: UserEntity,
    /// False for synthetic guest records created while the store was down;
    /// flushes are skipped for those.
    pub persisted: bool,
    /// The focus timer.
    pub timer: FocusTimer,
}

impl SessionState {
    /// Wrap a user record loaded (or synthesized) at login.
    pub fn new(record: UserEntity, persisted: bool) -> Self {
        Self {
            record,
            persisted,
            timer: FocusTimer::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start_open(timer: &mut FocusTimer, now: Instant) {
        timer.start(FocusMode::OpenEnded, "algebra", now).unwrap();
    }

    #[test]
    fn initial_phase_is_idle() {
        let timer = FocusTimer::new();
        assert!(!timer.is_running());
        assert!(timer.elapsed(Instant::now()).is_none());
    }

    #[test]
    fn blank_topic_is_rejected_without_state_change() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        assert_eq!(
            timer.start(FocusMode::OpenEnded, "   ", now),
            Err(TimerError::MissingTopic)
        );
        assert!(!timer.is_running());
    }

    #[test]
    fn second_start_is_rejected_while_running() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        start_open(&mut timer, now);
        assert_eq!(
            timer.start(FocusMode::OpenEnded, "history", now),
            Err(TimerError::AlreadyRunning)
        );
    }

    #[test]
    fn topic_is_trimmed_on_start() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        timer
            .start(FocusMode::OpenEnded, "  algebra  ", now)
            .unwrap();
        match timer.stop(now + Duration::from_secs(90)).unwrap() {
            StopOutcome::Completed(completed) => assert_eq!(completed.topic, "algebra"),
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[test]
    fn open_ended_stop_before_one_minute_is_discarded() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        start_open(&mut timer, now);
        let outcome = timer.stop(now + Duration::from_secs(59)).unwrap();
        assert_eq!(outcome, StopOutcome::Discarded);
        assert!(!timer.is_running());
    }

    #[test]
    fn open_ended_stop_pays_whole_minutes() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        start_open(&mut timer, now);
        let outcome = timer.stop(now + Duration::from_secs(150)).unwrap();
        assert_eq!(
            outcome,
            StopOutcome::Completed(CompletedFocus {
                topic: "algebra".into(),
                minutes: 2,
            })
        );
    }

    #[test]
    fn fixed_duration_stop_is_a_cancel() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        timer
            .start(
                FocusMode::FixedDuration { target_minutes: 25 },
                "algebra",
                now,
            )
            .unwrap();
        let outcome = timer.stop(now + Duration::from_secs(20 * 60)).unwrap();
        assert_eq!(outcome, StopOutcome::Cancelled);
    }

    #[test]
    fn fixed_duration_completes_when_countdown_elapses() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        timer
            .start(
                FocusMode::FixedDuration { target_minutes: 25 },
                "algebra",
                now,
            )
            .unwrap();

        assert!(timer.try_complete(now + Duration::from_secs(24 * 60)).is_none());
        assert!(timer.is_running());

        let completed = timer.try_complete(now + Duration::from_secs(25 * 60)).unwrap();
        assert_eq!(completed.minutes, 25);
        assert_eq!(completed.topic, "algebra");
        assert!(!timer.is_running());
    }

    #[test]
    fn remaining_counts_down_and_saturates() {
        let mut timer = FocusTimer::new();
        let now = Instant::now();
        timer
            .start(
                FocusMode::FixedDuration { target_minutes: 1 },
                "algebra",
                now,
            )
            .unwrap();
        assert_eq!(
            timer.remaining(now + Duration::from_secs(40)),
            Some(Duration::from_secs(20))
        );
        assert_eq!(
            timer.remaining(now + Duration::from_secs(90)),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn stop_while_idle_is_an_error() {
        let mut timer = FocusTimer::new();
        assert_eq!(timer.stop(Instant::now()), Err(TimerError::NotRunning));
    }
}

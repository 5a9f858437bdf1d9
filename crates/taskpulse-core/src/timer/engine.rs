//! Per-task work timer and time accounting.
//!
//! The timer is a wall-clock state machine with no internal thread. Running
//! time is never ticked into storage; it is derived on every read from the
//! session start instant and the caller-supplied `now`.
//!
//! ## State Transitions
//!
//! ```text
//! Idle --start--> Running --pause--> Idle
//! ```
//!
//! Pausing folds the in-flight session into `accumulated_ms`. Both
//! transitions are idempotent: starting a running timer or pausing an idle
//! one returns the record unchanged.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Whether a work session is in flight.
///
/// Persisted as a nullable timestamp: `null` is `Idle`, an instant is the
/// start of the running session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<DateTime<Utc>>", into = "Option<DateTime<Utc>>")]
pub enum TimerState {
    #[default]
    Idle,
    Running { started_at: DateTime<Utc> },
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, TimerState::Running { .. })
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        match self {
            TimerState::Idle => None,
            TimerState::Running { started_at } => Some(*started_at),
        }
    }
}

impl From<Option<DateTime<Utc>>> for TimerState {
    fn from(started_at: Option<DateTime<Utc>>) -> Self {
        match started_at {
            Some(started_at) => TimerState::Running { started_at },
            None => TimerState::Idle,
        }
    }
}

impl From<TimerState> for Option<DateTime<Utc>> {
    fn from(state: TimerState) -> Self {
        state.started_at()
    }
}

/// Banked work time plus the timer that may be adding to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeTracking {
    /// Total of all finished sessions, in milliseconds.
    #[serde(default)]
    pub accumulated_ms: u64,
    #[serde(default, rename = "timerStartedAt")]
    pub timer: TimerState,
}

impl TimeTracking {
    pub fn new(accumulated_ms: u64) -> Self {
        Self {
            accumulated_ms,
            timer: TimerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// True if any work has been logged, banked or in flight.
    pub fn has_recorded_time(&self) -> bool {
        self.accumulated_ms > 0 || self.timer.is_running()
    }

    /// Length of the running session at `now`; zero when idle.
    ///
    /// A start instant later than `now` counts as zero.
    pub fn session_ms<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        match self.timer {
            TimerState::Idle => 0,
            TimerState::Running { started_at } => {
                let delta = now.timestamp_millis() - started_at.timestamp_millis();
                u64::try_from(delta).unwrap_or(0)
            }
        }
    }

    /// Actual elapsed work time at `now`: banked time plus the running
    /// session, if any.
    pub fn elapsed_ms<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> u64 {
        self.accumulated_ms.saturating_add(self.session_ms(now))
    }

    /// Idle -> Running. No-op when already running.
    #[must_use]
    pub fn start<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Self {
        if self.is_running() {
            tracing::debug!("timer already running; start ignored");
            return self;
        }
        Self {
            timer: TimerState::Running {
                started_at: now.with_timezone(&Utc),
            },
            ..self
        }
    }

    /// Running -> Idle, banking the session. No-op when idle.
    #[must_use]
    pub fn pause<Tz: TimeZone>(self, now: &DateTime<Tz>) -> Self {
        if !self.is_running() {
            return self;
        }
        Self {
            accumulated_ms: self.elapsed_ms(now),
            timer: TimerState::Idle,
        }
    }
}

//! Per-participant timer state machine.
//!
//! # Responsibility
//! - Apply start/stop/reset transitions to exactly one participant.
//! - Derive elapsed time from recorded timestamps.
//!
//! # Invariants
//! - Failed transitions leave the participant unchanged.
//! - `stop` never produces a negative elapsed time.
//! - Transitions never read or write other participants.

use crate::model::participant::{ElapsedTime, Participant, ParticipantNumber, Timestamp};
use log::warn;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Timer state derived from participant fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No start or stop recorded.
    Idle,
    /// Started and not yet stopped.
    Running,
    /// Stopped with an elapsed result.
    Stopped,
}

impl TimerState {
    pub fn of(participant: &Participant) -> Self {
        if participant.timer_running {
            Self::Running
        } else if participant.stop_time.is_some() {
            Self::Stopped
        } else {
            Self::Idle
        }
    }
}

/// Rejected timer transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Starting requires a non-blank name.
    MissingName(ParticipantNumber),
    /// `start` called while the timer is running.
    AlreadyRunning(ParticipantNumber),
    /// `stop` called while the timer is not running.
    NotRunning(ParticipantNumber),
}

impl Display for TimerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingName(number) => {
                write!(f, "participant #{number} needs a name before starting")
            }
            Self::AlreadyRunning(number) => {
                write!(f, "participant #{number} timer is already running")
            }
            Self::NotRunning(number) => write!(f, "participant #{number} timer is not running"),
        }
    }
}

impl Error for TimerError {}

/// Starts the timer at `now`.
///
/// Allowed from `Idle` and `Stopped`; a previous result is discarded.
///
/// # Errors
/// - `MissingName` when the name is blank.
/// - `AlreadyRunning` when the timer is running.
pub fn start(participant: &mut Participant, now: Timestamp) -> Result<(), TimerError> {
    if !participant.has_name() {
        return Err(TimerError::MissingName(participant.participant_number));
    }
    if TimerState::of(participant) == TimerState::Running {
        return Err(TimerError::AlreadyRunning(participant.participant_number));
    }

    participant.start_time = Some(now);
    participant.stop_time = None;
    participant.elapsed = None;
    participant.timer_running = true;
    Ok(())
}

/// Stops a running timer at `now` and records the elapsed time.
///
/// A `now` earlier than the start (clock stepped back) is clamped to the
/// start instant, giving an elapsed time of zero.
///
/// # Errors
/// - `NotRunning` when the timer is idle or already stopped.
pub fn stop(participant: &mut Participant, now: Timestamp) -> Result<ElapsedTime, TimerError> {
    let start = match (participant.timer_running, participant.start_time) {
        (true, Some(start)) => start,
        _ => return Err(TimerError::NotRunning(participant.participant_number)),
    };

    let stop_at = if now < start {
        warn!(
            "event=timer_stop module=timer status=clamped number={} skew_ms={}",
            participant.participant_number,
            start.millis_since(now)
        );
        start
    } else {
        now
    };
    let elapsed = ElapsedTime::between(start, stop_at).unwrap_or(ElapsedTime::ZERO);

    participant.stop_time = Some(stop_at);
    participant.elapsed = Some(elapsed);
    participant.timer_running = false;
    Ok(elapsed)
}

/// Clears every timer field, from any state.
pub fn reset(participant: &mut Participant) {
    participant.start_time = None;
    participant.stop_time = None;
    participant.elapsed = None;
    participant.timer_running = false;
}

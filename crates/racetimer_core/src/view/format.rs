//! Display labels for roster views.
//!
//! Formatting is kept apart from the model so a zero elapsed time and a
//! missing one can be shown differently without touching stored data.

use crate::model::participant::{ElapsedTime, Participant, Timestamp};
use crate::model::timer::TimerState;
use chrono::{DateTime, Utc};

/// Placeholder for a field with no value.
pub const EMPTY_LABEL: &str = "-";

/// `"5.5 s"` for a result, `"0 s"` for an instantaneous stop, `"-"` for none.
pub fn elapsed_label(elapsed: Option<ElapsedTime>) -> String {
    match elapsed {
        Some(elapsed) => format!("{} s", elapsed.as_seconds()),
        None => EMPTY_LABEL.to_string(),
    }
}

/// Start time of day as `HH:MM:SS` (UTC), or `"-"`.
///
/// Timestamps outside the calendar range chrono can represent also render
/// as `"-"`.
pub fn start_time_label(start_time: Option<Timestamp>) -> String {
    start_time
        .and_then(|at| DateTime::<Utc>::from_timestamp_millis(at.as_millis()))
        .map(|at| at.format("%H:%M:%S").to_string())
        .unwrap_or_else(|| EMPTY_LABEL.to_string())
}

pub fn status_label(participant: &Participant) -> &'static str {
    match TimerState::of(participant) {
        TimerState::Running => "running",
        TimerState::Stopped => "stopped",
        TimerState::Idle => "idle",
    }
}

#[cfg(test)]
mod tests {
    use super::{elapsed_label, start_time_label, status_label};
    use crate::model::participant::{ElapsedTime, Participant, Timestamp};

    #[test]
    fn zero_elapsed_is_not_rendered_as_missing() {
        assert_eq!(elapsed_label(Some(ElapsedTime::ZERO)), "0 s");
        assert_eq!(elapsed_label(None), "-");
        assert_eq!(elapsed_label(Some(ElapsedTime::from_millis(5_500))), "5.5 s");
    }

    #[test]
    fn start_time_renders_time_of_day() {
        // 2024-01-01T13:05:09.250Z
        let at = Timestamp::from_millis(1_704_114_309_250);
        assert_eq!(start_time_label(Some(at)), "13:05:09");
        assert_eq!(start_time_label(None), "-");
    }

    #[test]
    fn pre_epoch_and_out_of_range_start_times() {
        // 1969-12-31T23:59:59Z
        assert_eq!(
            start_time_label(Some(Timestamp::from_millis(-1_000))),
            "23:59:59"
        );
        assert_eq!(start_time_label(Some(Timestamp::from_millis(i64::MAX))), "-");
    }

    #[test]
    fn status_follows_timer_state() {
        let mut participant = Participant::new(1);
        assert_eq!(status_label(&participant), "idle");
        participant.start_time = Some(Timestamp::from_millis(0));
        participant.timer_running = true;
        assert_eq!(status_label(&participant), "running");
    }
}

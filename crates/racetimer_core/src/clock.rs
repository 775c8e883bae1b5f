//! Time source abstraction for timer transitions.
//!
//! # Responsibility
//! - Provide the current wall-clock timestamp on demand.
//! - Allow deterministic clocks in tests and replays.
//!
//! # Invariants
//! - Timestamps are Unix epoch milliseconds.
//! - A clock holds no participant state.

use crate::model::participant::Timestamp;
use std::cell::Cell;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Returns the current timestamp on demand.
pub trait TimeSource {
    fn now(&self) -> Timestamp;
}

/// Wall-clock time source backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn now(&self) -> Timestamp {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(duration) => Timestamp::from_millis(clamp_millis(duration)),
            // Pre-epoch system clocks are reported as negative offsets.
            Err(err) => Timestamp::from_millis(-clamp_millis(err.duration())),
        }
    }
}

fn clamp_millis(duration: Duration) -> i64 {
    i64::try_from(duration.as_millis()).unwrap_or(i64::MAX)
}

/// Settable clock for tests and deterministic replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    current: Cell<i64>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Cell::new(start.as_millis()),
        }
    }

    /// Sets the clock to an absolute timestamp.
    pub fn set(&self, at: Timestamp) {
        self.current.set(at.as_millis());
    }

    /// Sets the clock to `seconds` after the epoch, fractional allowed.
    pub fn set_seconds(&self, seconds: f64) {
        self.current.set((seconds * 1000.0).round() as i64);
    }

    /// Moves the clock forward (or backward for negative values), saturating
    /// at the `i64` range.
    pub fn advance_millis(&self, millis: i64) {
        self.current.set(self.current.get().saturating_add(millis));
    }
}

impl TimeSource for ManualClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_millis(self.current.get())
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::rc::Rc<T> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{clamp_millis, ManualClock, SystemClock, TimeSource};
    use crate::model::participant::Timestamp;
    use std::time::Duration;

    #[test]
    fn system_clock_is_after_2020() {
        assert!(SystemClock.now().as_millis() > 1_577_836_800_000);
    }

    #[test]
    fn manual_clock_moves_only_when_told() {
        let clock = ManualClock::new(Timestamp::from_millis(1_000));
        assert_eq!(clock.now().as_millis(), 1_000);

        clock.advance_millis(250);
        assert_eq!(clock.now().as_millis(), 1_250);

        clock.set_seconds(15.5);
        assert_eq!(clock.now().as_millis(), 15_500);
    }

    #[test]
    fn manual_clock_saturates_instead_of_overflowing() {
        let clock = ManualClock::new(Timestamp::from_millis(i64::MAX - 10));
        clock.advance_millis(1_000);
        assert_eq!(clock.now().as_millis(), i64::MAX);

        clock.set(Timestamp::from_millis(i64::MIN + 10));
        clock.advance_millis(-1_000);
        assert_eq!(clock.now().as_millis(), i64::MIN);
    }

    #[test]
    fn oversized_durations_clamp_to_max_millis() {
        assert_eq!(clamp_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(clamp_millis(Duration::MAX), i64::MAX);
    }
}

//! Participant domain model.
//!
//! # Responsibility
//! - Define the single timed entity tracked by the registry.
//! - Validate timer field consistency for write and load paths.
//!
//! # Invariants
//! - `id` and `participant_number` never change after creation.
//! - `timer_running` implies `start_time` set and `stop_time` unset.
//! - `elapsed` set implies both timestamps set and
//!   `elapsed == stop_time - start_time >= 0`.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable participant identifier.
pub type ParticipantId = Uuid;

/// Sequential, never-reused participant number.
pub type ParticipantNumber = u64;

/// Wall-clock instant as Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(i64);

impl Timestamp {
    pub const fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`; negative when `self` is earlier.
    pub fn millis_since(self, earlier: Timestamp) -> i64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Non-negative duration between a start and a stop, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElapsedTime(u64);

impl ElapsedTime {
    pub const ZERO: ElapsedTime = ElapsedTime(0);

    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Elapsed time between two instants, `None` when `stop` precedes `start`.
    pub fn between(start: Timestamp, stop: Timestamp) -> Option<Self> {
        u64::try_from(stop.millis_since(start)).ok().map(Self)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Fractional seconds, the unit shown to operators.
    pub fn as_seconds(self) -> f64 {
        self.0 as f64 / 1000.0
    }
}

/// Field-consistency violations for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParticipantValidationError {
    /// Participant number `0` is never assigned.
    ZeroNumber(ParticipantId),
    /// `timer_running` without a start time, or with a stop time.
    RunningWithoutStart(ParticipantId),
    RunningWithStop(ParticipantId),
    /// Stop time recorded without a start time.
    StopWithoutStart(ParticipantId),
    /// Stop time earlier than start time.
    StopBeforeStart(ParticipantId),
    /// Elapsed time present without a stop time.
    ElapsedWithoutStop(ParticipantId),
    /// Elapsed time disagrees with `stop_time - start_time`.
    ElapsedMismatch {
        id: ParticipantId,
        stored_ms: u64,
        expected_ms: u64,
    },
}

impl Display for ParticipantValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroNumber(id) => write!(f, "participant {id} has number 0"),
            Self::RunningWithoutStart(id) => {
                write!(f, "participant {id} is running without start_time")
            }
            Self::RunningWithStop(id) => {
                write!(f, "participant {id} is running but has stop_time")
            }
            Self::StopWithoutStart(id) => {
                write!(f, "participant {id} has stop_time without start_time")
            }
            Self::StopBeforeStart(id) => {
                write!(f, "participant {id} has stop_time earlier than start_time")
            }
            Self::ElapsedWithoutStop(id) => {
                write!(f, "participant {id} has elapsed time without stop_time")
            }
            Self::ElapsedMismatch {
                id,
                stored_ms,
                expected_ms,
            } => write!(
                f,
                "participant {id} elapsed {stored_ms}ms does not match stop-start {expected_ms}ms"
            ),
        }
    }
}

impl Error for ParticipantValidationError {}

/// A registered entity with its own independent timer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub participant_number: ParticipantNumber,
    /// May be empty while the operator is still typing; blocks `start`.
    pub name: String,
    pub start_time: Option<Timestamp>,
    pub stop_time: Option<Timestamp>,
    /// Serialized as `elapsedMs` to keep the unit explicit in storage.
    #[serde(rename = "elapsedMs")]
    pub elapsed: Option<ElapsedTime>,
    pub timer_running: bool,
}

impl Participant {
    /// Creates an unnamed, idle participant with a generated id.
    pub fn new(participant_number: ParticipantNumber) -> Self {
        Self::with_id(Uuid::new_v4(), participant_number)
    }

    /// Creates an idle participant with a caller-provided id.
    pub fn with_id(id: ParticipantId, participant_number: ParticipantNumber) -> Self {
        Self {
            id,
            participant_number,
            name: String::new(),
            start_time: None,
            stop_time: None,
            elapsed: None,
            timer_running: false,
        }
    }

    /// Whether the name is usable for starting a timer.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }

    /// A stopped result is required before a certificate can be issued.
    pub fn certificate_eligible(&self) -> bool {
        self.stop_time.is_some()
    }

    /// Checks timer field consistency.
    ///
    /// # Errors
    /// - Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ParticipantValidationError> {
        if self.participant_number == 0 {
            return Err(ParticipantValidationError::ZeroNumber(self.id));
        }

        if self.timer_running {
            if self.start_time.is_none() {
                return Err(ParticipantValidationError::RunningWithoutStart(self.id));
            }
            if self.stop_time.is_some() {
                return Err(ParticipantValidationError::RunningWithStop(self.id));
            }
        }

        if let Some(stop) = self.stop_time {
            let Some(start) = self.start_time else {
                return Err(ParticipantValidationError::StopWithoutStart(self.id));
            };
            if stop < start {
                return Err(ParticipantValidationError::StopBeforeStart(self.id));
            }
        }

        if let Some(elapsed) = self.elapsed {
            let (Some(start), Some(stop)) = (self.start_time, self.stop_time) else {
                return Err(ParticipantValidationError::ElapsedWithoutStop(self.id));
            };
            let expected = ElapsedTime::between(start, stop).unwrap_or(ElapsedTime::ZERO);
            if expected != elapsed {
                return Err(ParticipantValidationError::ElapsedMismatch {
                    id: self.id,
                    stored_ms: elapsed.as_millis(),
                    expected_ms: expected.as_millis(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ElapsedTime, Participant, ParticipantValidationError, Timestamp};

    #[test]
    fn new_participant_is_idle_and_valid() {
        let participant = Participant::new(7);
        assert_eq!(participant.participant_number, 7);
        assert!(participant.name.is_empty());
        assert!(!participant.timer_running);
        assert!(participant.validate().is_ok());
    }

    #[test]
    fn whitespace_name_does_not_count_as_named() {
        let mut participant = Participant::new(1);
        participant.name = "   ".to_string();
        assert!(!participant.has_name());
        participant.name = " Ana ".to_string();
        assert!(participant.has_name());
    }

    #[test]
    fn elapsed_between_rejects_reversed_instants() {
        let start = Timestamp::from_millis(2_000);
        let stop = Timestamp::from_millis(1_000);
        assert_eq!(ElapsedTime::between(start, stop), None);
        assert_eq!(
            ElapsedTime::between(stop, start),
            Some(ElapsedTime::from_millis(1_000))
        );
    }

    #[test]
    fn validate_rejects_elapsed_mismatch() {
        let mut participant = Participant::new(1);
        participant.start_time = Some(Timestamp::from_millis(10_000));
        participant.stop_time = Some(Timestamp::from_millis(15_500));
        participant.elapsed = Some(ElapsedTime::from_millis(5_000));

        let err = participant.validate().unwrap_err();
        assert!(matches!(
            err,
            ParticipantValidationError::ElapsedMismatch {
                stored_ms: 5_000,
                expected_ms: 5_500,
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_running_with_stop_time() {
        let mut participant = Participant::new(1);
        participant.start_time = Some(Timestamp::from_millis(1));
        participant.stop_time = Some(Timestamp::from_millis(2));
        participant.timer_running = true;
        assert!(matches!(
            participant.validate(),
            Err(ParticipantValidationError::RunningWithStop(_))
        ));
    }

    #[test]
    fn serializes_with_camel_case_keys_and_nulls() {
        let participant = Participant::new(3);
        let value = serde_json::to_value(&participant).unwrap();
        assert_eq!(value["participantNumber"], 3);
        assert!(value["startTime"].is_null());
        assert!(value["elapsedMs"].is_null());
        assert_eq!(value["timerRunning"], false);
    }
}

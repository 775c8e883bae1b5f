//! Roster snapshot persistence over a key-value store.
//!
//! # Responsibility
//! - Encode the participant collection and counter into two store keys.
//! - Rebuild and validate roster state on startup.
//!
//! # Invariants
//! - Both keys are written in one `save_all` call.
//! - A load followed by nothing else reproduces what the last persist wrote,
//!   field for field, including `None` timestamps.
//! - Loaded counters always exceed every loaded participant number.

use crate::model::participant::{Participant, ParticipantNumber, ParticipantValidationError};
use crate::registry::FIRST_PARTICIPANT_NUMBER;
use crate::repo::kv_store::{PersistentStore, StoreError};
use log::{debug, warn};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store key holding the JSON participant array.
pub const PARTICIPANTS_KEY: &str = "participants";
/// Store key holding the next participant number as decimal text.
pub const NEXT_NUMBER_KEY: &str = "nextParticipantNumber";

pub type PersistResult<T> = Result<T, PersistError>;

/// Errors from snapshot load/persist.
#[derive(Debug)]
pub enum PersistError {
    Store(StoreError),
    Encode(serde_json::Error),
    /// Stored payload cannot be decoded into roster state.
    InvalidData(String),
    /// Stored participant violates a timer invariant.
    Validation(ParticipantValidationError),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode roster: {err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted roster data: {message}"),
            Self::Validation(err) => write!(f, "invalid persisted participant: {err}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::Validation(err) => Some(err),
        }
    }
}

impl From<StoreError> for PersistError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<ParticipantValidationError> for PersistError {
    fn from(value: ParticipantValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Roster state read back on startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedState {
    pub participants: Vec<Participant>,
    pub next_number: ParticipantNumber,
}

impl Default for LoadedState {
    fn default() -> Self {
        Self {
            participants: Vec::new(),
            next_number: FIRST_PARTICIPANT_NUMBER,
        }
    }
}

/// Reads and writes roster snapshots through a `PersistentStore`.
pub struct SnapshotRepository<S: PersistentStore> {
    store: S,
}

impl<S: PersistentStore> SnapshotRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads roster state; absent keys yield an empty roster and counter `1`.
    ///
    /// # Errors
    /// - `Store` on read failures.
    /// - `InvalidData` / `Validation` when stored state is malformed.
    pub fn load_on_startup(&self) -> PersistResult<LoadedState> {
        let participants = match self.store.load(PARTICIPANTS_KEY)? {
            Some(raw) => decode_participants(&raw)?,
            None => Vec::new(),
        };
        let stored_next = match self.store.load(NEXT_NUMBER_KEY)? {
            Some(raw) => decode_next_number(&raw)?,
            None => FIRST_PARTICIPANT_NUMBER,
        };

        let highest = participants
            .iter()
            .map(|participant| participant.participant_number)
            .max();
        let next_number = match highest {
            Some(highest) if stored_next <= highest => {
                let raised = highest.checked_add(1).ok_or_else(|| {
                    PersistError::InvalidData(format!(
                        "participant number {highest} leaves no room for the counter"
                    ))
                })?;
                warn!(
                    "event=roster_load module=persistence status=counter_raised stored={} raised_to={}",
                    stored_next, raised
                );
                raised
            }
            _ => stored_next,
        };

        debug!(
            "event=roster_load module=persistence status=ok participants={} next_number={}",
            participants.len(),
            next_number
        );
        Ok(LoadedState {
            participants,
            next_number,
        })
    }

    /// Writes the roster and counter as one atomic store update.
    ///
    /// # Errors
    /// - `Encode` when serialization fails, `Store` when the write fails.
    pub fn persist(
        &self,
        participants: &[Participant],
        next_number: ParticipantNumber,
    ) -> PersistResult<()> {
        let encoded = serde_json::to_string(participants).map_err(PersistError::Encode)?;
        let counter = next_number.to_string();
        self.store.save_all(&[
            (PARTICIPANTS_KEY, encoded.as_str()),
            (NEXT_NUMBER_KEY, counter.as_str()),
        ])?;
        Ok(())
    }
}

fn decode_participants(raw: &str) -> PersistResult<Vec<Participant>> {
    let participants: Vec<Participant> = serde_json::from_str(raw)
        .map_err(|err| PersistError::InvalidData(format!("`{PARTICIPANTS_KEY}`: {err}")))?;

    let mut seen_ids = HashSet::with_capacity(participants.len());
    let mut seen_numbers = HashSet::with_capacity(participants.len());
    for participant in &participants {
        participant.validate()?;
        if !seen_ids.insert(participant.id) {
            return Err(PersistError::InvalidData(format!(
                "duplicate participant id {}",
                participant.id
            )));
        }
        if !seen_numbers.insert(participant.participant_number) {
            return Err(PersistError::InvalidData(format!(
                "duplicate participant number {}",
                participant.participant_number
            )));
        }
    }

    Ok(participants)
}

fn decode_next_number(raw: &str) -> PersistResult<ParticipantNumber> {
    let trimmed = raw.trim();
    let value = trimmed.parse::<ParticipantNumber>().map_err(|_| {
        PersistError::InvalidData(format!("invalid `{NEXT_NUMBER_KEY}` value `{trimmed}`"))
    })?;
    Ok(value.max(FIRST_PARTICIPANT_NUMBER))
}

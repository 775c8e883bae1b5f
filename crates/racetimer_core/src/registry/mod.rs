//! Participant registry: the authoritative roster plus numbering counter.
//!
//! # Responsibility
//! - Own the ordered participant collection and the monotonic counter.
//! - Create, look up, rename and remove participants.
//! - Route timer transitions to one participant by number or id.
//!
//! # Invariants
//! - Participant numbers are assigned from `next_number` and never reused.
//! - `next_number` only grows; removal never touches it.
//! - The collection is replaced copy-on-write, so a `Snapshot` taken earlier
//!   is never observed half-updated.
//! - Failed operations leave the registry unchanged.

use crate::model::participant::{
    ElapsedTime, Participant, ParticipantId, ParticipantNumber, Timestamp,
};
use crate::model::timer::{self, TimerError};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// First number handed out by a fresh registry.
pub const FIRST_PARTICIPANT_NUMBER: ParticipantNumber = 1;

/// Largest batch a single `create_batch` call accepts.
pub const MAX_BATCH_SIZE: i64 = 10_000;

/// Immutable view of the roster at one point in time.
pub type Snapshot = Arc<Vec<Participant>>;

/// Registry-level failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Batch size must be a positive count that keeps the counter in range.
    InvalidCount(i64),
    /// No participant with this id.
    NotFound(ParticipantId),
    /// No participant with this number.
    NumberNotFound(ParticipantNumber),
    /// Timer transition rejected.
    Timer(TimerError),
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidCount(count) => write!(f, "invalid participant count: {count}"),
            Self::NotFound(id) => write!(f, "participant not found: {id}"),
            Self::NumberNotFound(number) => write!(f, "participant #{number} not found"),
            Self::Timer(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
            _ => None,
        }
    }
}

impl From<TimerError> for RegistryError {
    fn from(value: TimerError) -> Self {
        Self::Timer(value)
    }
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// In-memory roster with embedded number assignment.
#[derive(Debug, Clone)]
pub struct ParticipantRegistry {
    participants: Snapshot,
    next_number: ParticipantNumber,
    by_number: HashMap<ParticipantNumber, usize>,
}

impl Default for ParticipantRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ParticipantRegistry {
    /// Creates an empty registry whose counter starts at `1`.
    pub fn new() -> Self {
        Self {
            participants: Arc::new(Vec::new()),
            next_number: FIRST_PARTICIPANT_NUMBER,
            by_number: HashMap::new(),
        }
    }

    /// Rebuilds a registry from persisted state.
    ///
    /// The caller is responsible for `next_number` exceeding every stored
    /// number; see `repo::snapshot_repo`.
    pub fn from_parts(participants: Vec<Participant>, next_number: ParticipantNumber) -> Self {
        let mut registry = Self {
            participants: Arc::new(participants),
            next_number: next_number.max(FIRST_PARTICIPANT_NUMBER),
            by_number: HashMap::new(),
        };
        registry.rebuild_index();
        registry
    }

    pub fn participants(&self) -> &[Participant] {
        &self.participants
    }

    /// Returns a cheap immutable view of the current roster.
    pub fn snapshot(&self) -> Snapshot {
        Arc::clone(&self.participants)
    }

    pub fn next_number(&self) -> ParticipantNumber {
        self.next_number
    }

    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Creates `count` unnamed participants numbered
    /// `[next_number, next_number + count)` and appends them.
    ///
    /// # Errors
    /// - `InvalidCount` when `count <= 0`, `count > MAX_BATCH_SIZE`, the
    ///   counter would overflow, or the roster cannot grow.
    pub fn create_batch(&mut self, count: i64) -> RegistryResult<Vec<Participant>> {
        if !(1..=MAX_BATCH_SIZE).contains(&count) {
            return Err(RegistryError::InvalidCount(count));
        }
        let batch = u64::try_from(count).map_err(|_| RegistryError::InvalidCount(count))?;
        let capacity = usize::try_from(batch).map_err(|_| RegistryError::InvalidCount(count))?;
        let end = self
            .next_number
            .checked_add(batch)
            .ok_or(RegistryError::InvalidCount(count))?;

        let created: Vec<Participant> = (self.next_number..end).map(Participant::new).collect();

        let roster = Arc::make_mut(&mut self.participants);
        roster
            .try_reserve(capacity)
            .map_err(|_| RegistryError::InvalidCount(count))?;
        let first_index = roster.len();
        roster.extend(created.iter().cloned());
        for (offset, participant) in created.iter().enumerate() {
            self.by_number
                .insert(participant.participant_number, first_index + offset);
        }
        self.next_number = end;

        Ok(created)
    }

    /// Appends one participant; same as `create_batch(1)`.
    pub fn add_single(&mut self) -> RegistryResult<Participant> {
        let mut created = self.create_batch(1)?;
        created.pop().ok_or(RegistryError::InvalidCount(1))
    }

    pub fn find_by_id(&self, id: ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|participant| participant.id == id)
    }

    /// Looks up a participant through the number index.
    ///
    /// # Errors
    /// - `NumberNotFound` for unknown or removed numbers.
    pub fn lookup_by_number(&self, number: ParticipantNumber) -> RegistryResult<&Participant> {
        self.by_number
            .get(&number)
            .and_then(|index| self.participants.get(*index))
            .ok_or(RegistryError::NumberNotFound(number))
    }

    /// Replaces a participant's name.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    pub fn rename_by_id(
        &mut self,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> RegistryResult<&Participant> {
        let index = self.position_of(id).ok_or(RegistryError::NotFound(id))?;
        let roster = Arc::make_mut(&mut self.participants);
        roster[index].name = name.into();
        Ok(&roster[index])
    }

    /// Removes a participant. Unknown ids are a no-op returning `false`.
    ///
    /// The counter is left untouched so the number stays retired.
    pub fn remove_by_id(&mut self, id: ParticipantId) -> bool {
        let Some(index) = self.position_of(id) else {
            return false;
        };
        Arc::make_mut(&mut self.participants).remove(index);
        self.rebuild_index();
        true
    }

    /// Starts the timer of the participant with `number`.
    ///
    /// # Errors
    /// - `NumberNotFound`, or the rejected `TimerError`.
    pub fn start_by_number(
        &mut self,
        number: ParticipantNumber,
        now: Timestamp,
    ) -> RegistryResult<&Participant> {
        let index = self.index_of_number(number)?;
        self.apply_at(index, |participant| timer::start(participant, now))?;
        Ok(&self.participants[index])
    }

    /// Stops the timer of the participant with `number`.
    ///
    /// # Errors
    /// - `NumberNotFound`, or `TimerError::NotRunning`.
    pub fn stop_by_number(
        &mut self,
        number: ParticipantNumber,
        now: Timestamp,
    ) -> RegistryResult<(&Participant, ElapsedTime)> {
        let index = self.index_of_number(number)?;
        let elapsed = self.apply_at(index, |participant| timer::stop(participant, now))?;
        Ok((&self.participants[index], elapsed))
    }

    /// Clears the timer of the participant with `id`.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    pub fn reset_by_id(&mut self, id: ParticipantId) -> RegistryResult<&Participant> {
        let index = self.position_of(id).ok_or(RegistryError::NotFound(id))?;
        let roster = Arc::make_mut(&mut self.participants);
        timer::reset(&mut roster[index]);
        Ok(&roster[index])
    }

    // Runs the transition on a scratch copy so a rejected transition never
    // forces a copy-on-write of the shared roster.
    fn apply_at<T>(
        &mut self,
        index: usize,
        transition: impl FnOnce(&mut Participant) -> Result<T, TimerError>,
    ) -> RegistryResult<T> {
        let mut updated = self.participants[index].clone();
        let outcome = transition(&mut updated)?;
        Arc::make_mut(&mut self.participants)[index] = updated;
        Ok(outcome)
    }

    fn index_of_number(&self, number: ParticipantNumber) -> RegistryResult<usize> {
        self.by_number
            .get(&number)
            .copied()
            .ok_or(RegistryError::NumberNotFound(number))
    }

    fn position_of(&self, id: ParticipantId) -> Option<usize> {
        self.participants
            .iter()
            .position(|participant| participant.id == id)
    }

    fn rebuild_index(&mut self) {
        self.by_number = self
            .participants
            .iter()
            .enumerate()
            .map(|(index, participant)| (participant.participant_number, index))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::{ParticipantRegistry, RegistryError, MAX_BATCH_SIZE};
    use crate::model::participant::Timestamp;
    use crate::model::timer::TimerError;
    use uuid::Uuid;

    #[test]
    fn create_batch_assigns_sequential_numbers() {
        let mut registry = ParticipantRegistry::new();
        let created = registry.create_batch(3).unwrap();

        let numbers: Vec<u64> = created.iter().map(|p| p.participant_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
        assert_eq!(registry.next_number(), 4);
        assert_eq!(registry.len(), 3);

        let more = registry.create_batch(2).unwrap();
        let numbers: Vec<u64> = more.iter().map(|p| p.participant_number).collect();
        assert_eq!(numbers, vec![4, 5]);
        assert_eq!(registry.next_number(), 6);
    }

    #[test]
    fn create_batch_rejects_non_positive_counts() {
        let mut registry = ParticipantRegistry::new();
        registry.create_batch(1).unwrap();

        for count in [0, -1, i64::MIN] {
            assert_eq!(
                registry.create_batch(count).unwrap_err(),
                RegistryError::InvalidCount(count)
            );
        }
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.next_number(), 2);
    }

    #[test]
    fn create_batch_rejects_oversized_counts_without_growing() {
        let mut registry = ParticipantRegistry::new();
        registry.create_batch(2).unwrap();

        for count in [MAX_BATCH_SIZE + 1, i64::MAX] {
            assert_eq!(
                registry.create_batch(count).unwrap_err(),
                RegistryError::InvalidCount(count)
            );
        }
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.next_number(), 3);

        let created = registry.create_batch(MAX_BATCH_SIZE).unwrap();
        assert_eq!(created.len(), 10_000);
        assert_eq!(registry.next_number(), 3 + 10_000);
    }

    #[test]
    fn create_batch_rejects_counter_overflow() {
        let mut registry = ParticipantRegistry::from_parts(Vec::new(), u64::MAX - 1);
        assert_eq!(
            registry.create_batch(5).unwrap_err(),
            RegistryError::InvalidCount(5)
        );
        assert_eq!(registry.next_number(), u64::MAX - 1);
    }

    #[test]
    fn removal_never_reuses_numbers() {
        let mut registry = ParticipantRegistry::new();
        let created = registry.create_batch(2).unwrap();

        assert!(registry.remove_by_id(created[1].id));
        let added = registry.add_single().unwrap();
        assert_eq!(added.participant_number, 3);
        assert_eq!(registry.next_number(), 4);
        assert!(registry.lookup_by_number(2).is_err());
    }

    #[test]
    fn remove_unknown_id_is_a_noop() {
        let mut registry = ParticipantRegistry::new();
        registry.create_batch(2).unwrap();

        assert!(!registry.remove_by_id(Uuid::new_v4()));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn lookup_index_tracks_removals() {
        let mut registry = ParticipantRegistry::new();
        let created = registry.create_batch(4).unwrap();
        registry.remove_by_id(created[0].id);

        let third = registry.lookup_by_number(3).unwrap();
        assert_eq!(third.id, created[2].id);
        assert_eq!(
            registry.lookup_by_number(1).unwrap_err(),
            RegistryError::NumberNotFound(1)
        );
    }

    #[test]
    fn rename_unknown_id_fails_with_not_found() {
        let mut registry = ParticipantRegistry::new();
        let missing = Uuid::new_v4();
        assert_eq!(
            registry.rename_by_id(missing, "Ana").unwrap_err(),
            RegistryError::NotFound(missing)
        );
    }

    #[test]
    fn timers_are_independent_per_participant() {
        let mut registry = ParticipantRegistry::new();
        let created = registry.create_batch(2).unwrap();
        registry.rename_by_id(created[0].id, "Ana").unwrap();
        registry.rename_by_id(created[1].id, "Boris").unwrap();

        registry
            .start_by_number(1, Timestamp::from_millis(1_000))
            .unwrap();
        registry
            .start_by_number(2, Timestamp::from_millis(2_000))
            .unwrap();
        let (_, elapsed) = registry
            .stop_by_number(1, Timestamp::from_millis(4_000))
            .unwrap();

        assert_eq!(elapsed.as_millis(), 3_000);
        let second = registry.lookup_by_number(2).unwrap();
        assert!(second.timer_running);
        assert!(second.elapsed.is_none());
    }

    #[test]
    fn rejected_start_keeps_snapshot_shared() {
        let mut registry = ParticipantRegistry::new();
        registry.create_batch(1).unwrap();
        let before = registry.snapshot();

        let err = registry
            .start_by_number(1, Timestamp::from_millis(1_000))
            .unwrap_err();
        assert_eq!(err, RegistryError::Timer(TimerError::MissingName(1)));
        assert!(std::sync::Arc::ptr_eq(&before, &registry.snapshot()));
    }

    #[test]
    fn earlier_snapshot_is_not_affected_by_later_mutation() {
        let mut registry = ParticipantRegistry::new();
        let created = registry.create_batch(1).unwrap();
        let before = registry.snapshot();

        registry.rename_by_id(created[0].id, "Ana").unwrap();
        assert_eq!(before[0].name, "");
        assert_eq!(registry.participants()[0].name, "Ana");
    }
}

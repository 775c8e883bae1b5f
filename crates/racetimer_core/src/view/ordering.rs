//! Elapsed-time ordering for roster views.
//!
//! # Responsibility
//! - Order a roster view by elapsed time in a toggling direction.
//!
//! # Invariants
//! - Participants without an elapsed time keep their exact slots.
//! - Timed participants are reordered only among the timed slots, stably.
//! - Ordering never mutates the registry; it returns a new view.

use crate::model::participant::Participant;

/// Sort direction over elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

/// Returns `participants` ordered by elapsed time in `direction`.
pub fn sort_by_elapsed(participants: &[Participant], direction: SortDirection) -> Vec<Participant> {
    let mut timed: Vec<&Participant> = participants
        .iter()
        .filter(|participant| participant.elapsed.is_some())
        .collect();
    match direction {
        SortDirection::Ascending => timed.sort_by(|a, b| a.elapsed.cmp(&b.elapsed)),
        SortDirection::Descending => timed.sort_by(|a, b| b.elapsed.cmp(&a.elapsed)),
    }

    let mut timed = timed.into_iter();
    participants
        .iter()
        .map(|participant| {
            if participant.elapsed.is_some() {
                // Same count of timed slots as timed entries.
                timed.next().unwrap_or(participant).clone()
            } else {
                participant.clone()
            }
        })
        .collect()
}

/// Stateful sorter that flips direction after every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElapsedSorter {
    direction: SortDirection,
}

impl ElapsedSorter {
    pub fn new(direction: SortDirection) -> Self {
        Self { direction }
    }

    /// Direction the next call will use.
    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    /// Sorts in the current direction, then toggles it for the next call.
    pub fn sort_by_elapsed(&mut self, participants: &[Participant]) -> Vec<Participant> {
        let ordered = sort_by_elapsed(participants, self.direction);
        self.direction = self.direction.toggled();
        ordered
    }
}

#[cfg(test)]
mod tests {
    use super::{sort_by_elapsed, ElapsedSorter, SortDirection};
    use crate::model::participant::{ElapsedTime, Participant, Timestamp};

    fn timed(number: u64, elapsed_ms: Option<u64>) -> Participant {
        let mut participant = Participant::new(number);
        if let Some(ms) = elapsed_ms {
            participant.start_time = Some(Timestamp::from_millis(0));
            participant.stop_time = Some(Timestamp::from_millis(ms as i64));
            participant.elapsed = Some(ElapsedTime::from_millis(ms));
        }
        participant
    }

    fn numbers(participants: &[Participant]) -> Vec<u64> {
        participants.iter().map(|p| p.participant_number).collect()
    }

    #[test]
    fn untimed_entries_keep_their_slots() {
        let roster = vec![
            timed(1, Some(3_000)),
            timed(2, None),
            timed(3, Some(1_000)),
            timed(4, None),
            timed(5, Some(2_000)),
        ];

        let ascending = sort_by_elapsed(&roster, SortDirection::Ascending);
        assert_eq!(numbers(&ascending), vec![3, 2, 5, 4, 1]);

        let descending = sort_by_elapsed(&roster, SortDirection::Descending);
        assert_eq!(numbers(&descending), vec![1, 2, 5, 4, 3]);
    }

    #[test]
    fn sorter_toggles_direction_between_calls() {
        let roster = vec![
            timed(1, Some(2_000)),
            timed(2, None),
            timed(3, Some(5_500)),
            timed(4, Some(0)),
        ];
        let mut sorter = ElapsedSorter::default();
        assert_eq!(sorter.direction(), SortDirection::Ascending);

        let first = sorter.sort_by_elapsed(&roster);
        let second = sorter.sort_by_elapsed(&first);
        assert_eq!(numbers(&first), vec![4, 2, 1, 3]);
        assert_eq!(numbers(&second), vec![3, 2, 1, 4]);
        assert_eq!(sorter.direction(), SortDirection::Ascending);
    }

    #[test]
    fn equal_elapsed_keeps_input_order() {
        let roster = vec![timed(1, Some(1_000)), timed(2, Some(1_000))];
        assert_eq!(
            numbers(&sort_by_elapsed(&roster, SortDirection::Descending)),
            vec![1, 2]
        );
    }

    #[test]
    fn all_untimed_roster_is_unchanged() {
        let roster = vec![timed(1, None), timed(2, None)];
        assert_eq!(
            sort_by_elapsed(&roster, SortDirection::Descending),
            roster
        );
    }
}

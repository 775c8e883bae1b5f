//! Registry session: the owned roster handle held by the UI layer.
//!
//! # Responsibility
//! - Expose UI-facing roster and timer operations.
//! - Persist the new snapshot explicitly after every successful mutation.
//! - Forward start/stop/save-all notifications to the configured notifier.
//!
//! # Invariants
//! - Validation failures leave roster and store untouched.
//! - Persistence and notification failures are logged and never undo or
//!   fail the in-memory mutation.
//! - Removal has no in-band confirmation; callers confirm before calling.

use crate::clock::{SystemClock, TimeSource};
use crate::model::participant::{Participant, ParticipantId, ParticipantNumber};
use crate::registry::{ParticipantRegistry, RegistryError, Snapshot};
use crate::repo::kv_store::PersistentStore;
use crate::repo::snapshot_repo::{PersistError, SnapshotRepository};
use crate::sync::notifier::{NoopNotifier, TimingNotifier};
use crate::view::ordering::{ElapsedSorter, SortDirection};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Session-level failures surfaced to the UI.
#[derive(Debug)]
pub enum SessionError {
    /// Rejected roster or timer operation.
    Registry(RegistryError),
    /// `save_all` called with no participants.
    EmptyRoster,
    /// Stored roster could not be loaded at startup.
    Load(PersistError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::EmptyRoster => write!(f, "no participants to save"),
            Self::Load(err) => write!(f, "failed to load roster: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::EmptyRoster => None,
            Self::Load(err) => Some(err),
        }
    }
}

impl From<RegistryError> for SessionError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Owned roster session wiring registry, clock, store and notifier.
pub struct RegistrySession<S: PersistentStore> {
    registry: ParticipantRegistry,
    repo: SnapshotRepository<S>,
    clock: Box<dyn TimeSource>,
    notifier: Box<dyn TimingNotifier>,
    sorter: ElapsedSorter,
    persist_failures: u64,
}

impl<S: PersistentStore> RegistrySession<S> {
    /// Loads roster state from `store` and opens a session over it.
    ///
    /// Uses the system clock and no remote notifier.
    ///
    /// # Errors
    /// - `Load` when the store cannot be read or holds invalid state. The
    ///   store is left untouched so the data can be inspected.
    pub fn open(store: S) -> SessionResult<Self> {
        let repo = SnapshotRepository::new(store);
        let loaded = repo.load_on_startup().map_err(|err| {
            error!("event=session_open module=session status=error error={err}");
            SessionError::Load(err)
        })?;
        info!(
            "event=session_open module=session status=ok participants={} next_number={}",
            loaded.participants.len(),
            loaded.next_number
        );

        Ok(Self {
            registry: ParticipantRegistry::from_parts(loaded.participants, loaded.next_number),
            repo,
            clock: Box::new(SystemClock),
            notifier: Box::new(NoopNotifier),
            sorter: ElapsedSorter::default(),
            persist_failures: 0,
        })
    }

    pub fn with_clock(mut self, clock: impl TimeSource + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_notifier(mut self, notifier: impl TimingNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    pub fn participants(&self) -> &[Participant] {
        self.registry.participants()
    }

    pub fn snapshot(&self) -> Snapshot {
        self.registry.snapshot()
    }

    pub fn next_number(&self) -> ParticipantNumber {
        self.registry.next_number()
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    pub fn store(&self) -> &S {
        self.repo.store()
    }

    /// Direction the next `toggle_sort` will apply.
    pub fn sort_direction(&self) -> SortDirection {
        self.sorter.direction()
    }

    /// Count of persist attempts that failed since the session opened.
    pub fn persist_failures(&self) -> u64 {
        self.persist_failures
    }

    /// Creates `count` participants and persists.
    ///
    /// # Errors
    /// - `InvalidCount` when `count <= 0`.
    pub fn create(&mut self, count: i64) -> SessionResult<Vec<Participant>> {
        let created = self.registry.create_batch(count).map_err(|err| {
            warn!("event=participants_create module=session status=rejected count={count}");
            err
        })?;
        info!(
            "event=participants_create module=session status=ok count={} first_number={} next_number={}",
            created.len(),
            created.first().map_or(0, |p| p.participant_number),
            self.registry.next_number()
        );
        self.persist();
        Ok(created)
    }

    /// Appends one participant to an existing roster and persists.
    pub fn add_single(&mut self) -> SessionResult<Participant> {
        let created = self.registry.add_single()?;
        info!(
            "event=participant_add module=session status=ok number={}",
            created.participant_number
        );
        self.persist();
        Ok(created)
    }

    /// Renames a participant and persists.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    pub fn rename(
        &mut self,
        id: ParticipantId,
        name: impl Into<String>,
    ) -> SessionResult<Participant> {
        let renamed = self.registry.rename_by_id(id, name)?.clone();
        debug!(
            "event=participant_rename module=session status=ok number={} named={}",
            renamed.participant_number,
            renamed.has_name()
        );
        self.persist();
        Ok(renamed)
    }

    /// Starts the timer of participant `number`, persists and notifies.
    ///
    /// # Errors
    /// - `NumberNotFound`, `MissingName` or `AlreadyRunning`.
    pub fn start(&mut self, number: ParticipantNumber) -> SessionResult<Participant> {
        let now = self.clock.now();
        let started = self
            .registry
            .start_by_number(number, now)
            .map_err(|err| log_rejected("timer_start", number, err))?
            .clone();
        info!(
            "event=timer_start module=session status=ok number={} start_ms={}",
            number,
            now.as_millis()
        );
        self.persist();

        if let Err(err) = self.notifier.notify_start(started.id, now) {
            warn!(
                "event=notify_start module=session status=error notifier={} number={} error={}",
                self.notifier.notifier_id(),
                number,
                err
            );
        }
        Ok(started)
    }

    /// Stops the timer of participant `number`, persists and notifies.
    ///
    /// # Errors
    /// - `NumberNotFound` or `NotRunning`.
    pub fn stop(&mut self, number: ParticipantNumber) -> SessionResult<Participant> {
        let now = self.clock.now();
        let (stopped, elapsed) = self
            .registry
            .stop_by_number(number, now)
            .map_err(|err| log_rejected("timer_stop", number, err))?;
        let stopped = stopped.clone();
        info!(
            "event=timer_stop module=session status=ok number={} elapsed_ms={}",
            number,
            elapsed.as_millis()
        );
        self.persist();

        let stop_time = stopped.stop_time.unwrap_or(now);
        if let Err(err) = self.notifier.notify_stop(stopped.id, stop_time) {
            warn!(
                "event=notify_stop module=session status=error notifier={} number={} error={}",
                self.notifier.notifier_id(),
                number,
                err
            );
        }
        Ok(stopped)
    }

    /// Clears the timer of participant `id` and persists.
    ///
    /// # Errors
    /// - `NotFound` for an unknown id.
    pub fn reset(&mut self, id: ParticipantId) -> SessionResult<Participant> {
        let reset = self.registry.reset_by_id(id)?.clone();
        info!(
            "event=timer_reset module=session status=ok number={}",
            reset.participant_number
        );
        self.persist();
        Ok(reset)
    }

    /// Removes participant `id` after the caller has confirmed it.
    ///
    /// Returns `false` (and writes nothing) when the id is unknown.
    pub fn remove(&mut self, id: ParticipantId) -> bool {
        if !self.registry.remove_by_id(id) {
            debug!("event=participant_remove module=session status=noop id={id}");
            return false;
        }
        info!("event=participant_remove module=session status=ok id={id}");
        self.persist();
        true
    }

    /// Returns the roster ordered by elapsed time, flipping the direction
    /// for the next call. The registry order itself is not changed.
    pub fn toggle_sort(&mut self) -> Vec<Participant> {
        let direction = self.sorter.direction();
        let ordered = self.sorter.sort_by_elapsed(self.registry.participants());
        debug!("event=roster_sort module=session status=ok direction={direction:?}");
        ordered
    }

    /// Persists and pushes the whole roster to the notifier.
    ///
    /// # Errors
    /// - `EmptyRoster` when there is nothing to save.
    pub fn save_all(&mut self) -> SessionResult<usize> {
        if self.registry.is_empty() {
            return Err(SessionError::EmptyRoster);
        }
        self.persist();

        let participants = self.registry.snapshot();
        if let Err(err) = self.notifier.notify_save_all(&participants) {
            warn!(
                "event=notify_save_all module=session status=error notifier={} participants={} error={}",
                self.notifier.notifier_id(),
                participants.len(),
                err
            );
        }
        Ok(participants.len())
    }

    /// Writes the current snapshot through the store.
    ///
    /// Best-effort: failures are logged and counted, never retried.
    /// Returns whether the write succeeded.
    pub fn persist(&mut self) -> bool {
        match self
            .repo
            .persist(self.registry.participants(), self.registry.next_number())
        {
            Ok(()) => {
                debug!(
                    "event=persist module=session status=ok participants={} next_number={}",
                    self.registry.len(),
                    self.registry.next_number()
                );
                true
            }
            Err(err) => {
                self.persist_failures += 1;
                error!(
                    "event=persist module=session status=error failures={} error={}",
                    self.persist_failures, err
                );
                false
            }
        }
    }
}

fn log_rejected(
    event: &'static str,
    number: ParticipantNumber,
    err: RegistryError,
) -> RegistryError {
    warn!("event={event} module=session status=rejected number={number} reason={err}");
    err
}

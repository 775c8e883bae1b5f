//! Core domain logic for RaceTimer.
//! This crate is the single source of truth for roster and timer invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod sync;
pub mod view;

pub use clock::{ManualClock, SystemClock, TimeSource};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::participant::{
    ElapsedTime, Participant, ParticipantId, ParticipantNumber, ParticipantValidationError,
    Timestamp,
};
pub use model::timer::{TimerError, TimerState};
pub use registry::{
    ParticipantRegistry, RegistryError, RegistryResult, Snapshot, MAX_BATCH_SIZE,
};
pub use repo::kv_store::{MemoryKvStore, PersistentStore, SqliteKvStore, StoreError, StoreResult};
pub use repo::snapshot_repo::{LoadedState, PersistError, PersistResult, SnapshotRepository};
pub use service::session::{RegistrySession, SessionError, SessionResult};
pub use sync::notifier::{NoopNotifier, NotifyError, TimingNotifier};
pub use view::ordering::{sort_by_elapsed, ElapsedSorter, SortDirection};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

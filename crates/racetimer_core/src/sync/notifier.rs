//! One-way notifications to an external system of record.
//!
//! # Responsibility
//! - Define the outbound contract for start/stop/save-all notifications.
//! - Provide a no-op default so local behavior never depends on a backend.
//!
//! # Invariants
//! - Notifications are fire-and-forget: callers log failures and move on.
//! - Implementations never receive mutable access to roster state.

use crate::model::participant::{Participant, ParticipantId, Timestamp};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Notification delivery failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    /// Backend could not be reached.
    Transport(String),
    /// Backend answered with a rejection.
    Rejected { status: u16, message: String },
}

impl Display for NotifyError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(message) => write!(f, "notification transport failed: {message}"),
            Self::Rejected { status, message } => {
                write!(f, "notification rejected with status {status}: {message}")
            }
        }
    }
}

impl Error for NotifyError {}

/// Outbound notification contract.
pub trait TimingNotifier {
    /// Stable adapter name used in log lines.
    fn notifier_id(&self) -> &str;

    fn notify_start(&self, id: ParticipantId, start_time: Timestamp) -> Result<(), NotifyError>;

    fn notify_stop(&self, id: ParticipantId, stop_time: Timestamp) -> Result<(), NotifyError>;

    fn notify_save_all(&self, participants: &[Participant]) -> Result<(), NotifyError>;
}

/// Default notifier for sessions without a backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl TimingNotifier for NoopNotifier {
    fn notifier_id(&self) -> &str {
        "noop"
    }

    fn notify_start(&self, _id: ParticipantId, _start_time: Timestamp) -> Result<(), NotifyError> {
        Ok(())
    }

    fn notify_stop(&self, _id: ParticipantId, _stop_time: Timestamp) -> Result<(), NotifyError> {
        Ok(())
    }

    fn notify_save_all(&self, _participants: &[Participant]) -> Result<(), NotifyError> {
        Ok(())
    }
}

impl<N: TimingNotifier + ?Sized> TimingNotifier for std::rc::Rc<N> {
    fn notifier_id(&self) -> &str {
        (**self).notifier_id()
    }

    fn notify_start(&self, id: ParticipantId, start_time: Timestamp) -> Result<(), NotifyError> {
        (**self).notify_start(id, start_time)
    }

    fn notify_stop(&self, id: ParticipantId, stop_time: Timestamp) -> Result<(), NotifyError> {
        (**self).notify_stop(id, stop_time)
    }

    fn notify_save_all(&self, participants: &[Participant]) -> Result<(), NotifyError> {
        (**self).notify_save_all(participants)
    }
}

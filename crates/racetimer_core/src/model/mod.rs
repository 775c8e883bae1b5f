//! Participant domain model and timer transitions.
//!
//! # Responsibility
//! - Define the participant record shared by registry, persistence and views.
//! - Keep timer transitions as pure functions over one participant.
//!
//! # Invariants
//! - Every participant is identified by a stable `ParticipantId`.
//! - Removal is a hard delete; numbers of removed participants stay retired.

pub mod participant;
pub mod timer;

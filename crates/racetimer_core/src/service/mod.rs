//! Core use-case services.
//!
//! # Responsibility
//! - Combine registry, timer, persistence and notification into UI-facing
//!   operations.
//! - Keep presentation layers decoupled from storage details.

pub mod session;

//! Outbound integration with an external system of record.

pub mod notifier;

//! Persistence layer for roster state.
//!
//! # Responsibility
//! - Define the key-value storage contract and its backends.
//! - Encode/decode roster snapshots on top of that contract.
//!
//! # Invariants
//! - Snapshot writes go through one atomic `save_all` call.
//! - Load paths reject invalid persisted state instead of masking it.

pub mod kv_store;
pub mod snapshot_repo;

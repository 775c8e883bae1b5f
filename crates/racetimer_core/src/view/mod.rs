//! Read-only projections of the roster for presentation layers.
//!
//! # Responsibility
//! - Reorder roster views by elapsed time.
//! - Produce display labels without changing the stored model.

pub mod format;
pub mod ordering;

//! tdmerge library crate.
//!
//! Writes the actual output of failing tests back into their expected-data
//! files. Several failing tests can target the same file; their outputs are
//! folded through a line-based three-way merge so that every change that
//! can be combined is kept, and overlapping changes show up as conflict
//! markers instead of being lost.
//!
//! The `tdmerge` binary is a thin CLI over [`merge::apply_diffs_with`].

pub mod config;
pub mod error;
pub mod merge;
pub mod model;
pub mod store;
pub mod telemetry;

pub use error::{ApplyError, StoreError};
pub use merge::{ApplyResult, apply_diffs};
pub use model::record::DiffRecord;

//! Diff merge engine.
//!
//! Implements the partition → resolve → apply pipeline that turns a batch of
//! diff records into one write per file:
//!
//! - **partition**: Group records by file, drop detached and duplicate ones.
//! - **diff3**: Align two texts against a common base as [`MergeFragment`]s.
//! - **resolve**: Three-way merge over fragments, and the per-file fold.
//! - **apply**: Normalize line separators, fold each file, write the batch
//!   atomically through a [`TextStore`](crate::store::TextStore).
//!
//! # Determinism
//!
//! The same records in the same order always produce the same files:
//!
//! - Files are processed in lexicographic path order.
//! - Records within a file keep their encounter order; the first one anchors
//!   the fold.
//! - The line diff is deterministic given the same inputs and algorithm.
//!
//! [`MergeFragment`]: diff3::MergeFragment

pub mod apply;
pub mod diff3;
pub mod partition;
pub mod resolve;

pub use apply::{ApplyPlan, ApplyResult, apply_diffs, apply_diffs_with, plan_diffs};
pub use resolve::{MergeOutcome, fold_group, merge, merge_with};

#[cfg(test)]
mod proptests;

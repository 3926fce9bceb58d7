//! APPLY: the entry point that writes actual test output back.
//!
//! Runs the pipeline for one batch of diff records:
//!
//! 1. **partition**: resolve every path through the store so that all
//!    spellings of one file land together, then group by file and drop
//!    detached and duplicate records.
//! 2. **plan**: per file, read it, detect its separator, normalize every
//!    record to that separator and fold the records into one text.
//! 3. **commit**: hand every planned write to the store as one atomic batch.
//!
//! Planning is pure apart from reading the targets, so [`plan_diffs`] doubles
//! as a dry run.

use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, info_span, warn};

use super::partition::{FileDiffGroup, partition_by_file};
use super::resolve::{MergeOutcome, fold_group};
use crate::config::{Config, MissingFilePolicy};
use crate::error::ApplyError;
use crate::model::record::DiffRecord;
use crate::model::text::{LineSeparator, convert_line_separators};
use crate::store::{PendingWrite, TextStore};

// ---------------------------------------------------------------------------
// ApplyResult
// ---------------------------------------------------------------------------

/// Aggregate outcome of applying a batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ApplyResult {
    /// At least one file was written and none needed conflict markers.
    Success,
    /// At least one file was written with conflict markers.
    HasConflict,
    /// Nothing to write.
    NoDiffs,
}

impl std::fmt::Display for ApplyResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::HasConflict => write!(f, "has-conflict"),
            Self::NoDiffs => write!(f, "no-diffs"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// What happened to one file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    /// Written without conflicts.
    Updated,
    /// Written with conflict markers.
    Conflicted,
    /// Not written because it does not exist.
    Skipped,
}

/// Per-file summary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub status: FileStatus,
    /// Records folded into the file after deduplication.
    pub records: usize,
    /// Separator the file was written with.
    pub line_separator: Option<LineSeparator>,
}

/// The planned (or performed) writes of one batch.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ApplyPlan {
    pub files: Vec<FileReport>,
    /// Records dropped because they were not file-backed.
    pub detached: usize,
    /// Records dropped as duplicates of an earlier record's actual text.
    pub duplicates: usize,
    #[serde(skip)]
    pub writes: Vec<PendingWrite>,
}

impl ApplyPlan {
    /// The aggregate result. Conflicts dominate success.
    #[must_use]
    pub fn result(&self) -> ApplyResult {
        if self
            .files
            .iter()
            .any(|f| f.status == FileStatus::Conflicted)
        {
            ApplyResult::HasConflict
        } else if self.writes.is_empty() {
            ApplyResult::NoDiffs
        } else {
            ApplyResult::Success
        }
    }
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Apply `records` to the files in `store` with default settings.
///
/// # Errors
/// Returns [`ApplyError`] if a target cannot be read or the batch cannot be
/// written. No file is written in either case, except as reported by
/// [`StoreError::Commit`](crate::error::StoreError::Commit).
pub fn apply_diffs<S: TextStore>(
    records: impl IntoIterator<Item = DiffRecord>,
    store: &mut S,
) -> Result<ApplyResult, ApplyError> {
    apply_diffs_with(records, store, &Config::default()).map(|plan| plan.result())
}

/// Apply `records` to the files in `store` and return the full report.
///
/// # Errors
/// See [`apply_diffs`].
pub fn apply_diffs_with<S: TextStore>(
    records: impl IntoIterator<Item = DiffRecord>,
    store: &mut S,
    config: &Config,
) -> Result<ApplyPlan, ApplyError> {
    let span = info_span!("apply");
    let _enter = span.enter();

    let plan = plan_diffs(records, store, config)?;
    if !plan.writes.is_empty() {
        store.write_atomically(&plan.writes)?;
    }

    info!(
        result = %plan.result(),
        files = plan.writes.len(),
        "applied diffs"
    );
    Ok(plan)
}

/// Compute every write without performing it.
///
/// # Errors
/// Returns [`ApplyError`] if a target cannot be read, or is missing while
/// [`MissingFilePolicy::Error`] is configured.
pub fn plan_diffs<S: TextStore>(
    records: impl IntoIterator<Item = DiffRecord>,
    store: &S,
    config: &Config,
) -> Result<ApplyPlan, ApplyError> {
    // Group by the file each path names, not by how the collector spelled it.
    let partition = partition_by_file(records.into_iter().map(|mut record| {
        record.file_path = record.file_path.map(|p| store.resolve(&p));
        record
    }));
    let mut plan = ApplyPlan {
        detached: partition.detached,
        duplicates: partition.duplicates,
        ..ApplyPlan::default()
    };

    for group in partition.groups {
        let path = group.path().to_owned();
        let records = group.len();

        let fallback = config.apply.fallback_line_separator;
        let Some(separator) = store.detect_separator(&path, fallback)? else {
            match config.apply.missing_files {
                MissingFilePolicy::Skip => {
                    warn!(path = %path.display(), "target file does not exist; skipping");
                    plan.files.push(FileReport {
                        path,
                        status: FileStatus::Skipped,
                        records,
                        line_separator: None,
                    });
                    continue;
                }
                MissingFilePolicy::Error => return Err(ApplyError::MissingFile { path }),
            }
        };

        let outcome = fold_file(group, separator, config);
        let status = if outcome.has_conflict() {
            FileStatus::Conflicted
        } else {
            FileStatus::Updated
        };

        plan.writes.push(PendingWrite {
            path: path.clone(),
            text: convert_line_separators(outcome.text(), separator),
        });
        plan.files.push(FileReport {
            path,
            status,
            records,
            line_separator: Some(separator),
        });
    }

    Ok(plan)
}

/// Normalize a group to `separator` and fold it.
fn fold_file(group: FileDiffGroup, separator: LineSeparator, config: &Config) -> MergeOutcome {
    let span = info_span!("fold", path = %group.path().display(), records = group.len());
    let _enter = span.enter();

    let group = group.map_texts(|text| convert_line_separators(text, separator));
    let outcome = fold_group(&group, config.merge.algorithm.to_similar());
    if outcome.has_conflict() {
        warn!("file needs manual conflict resolution");
    }
    outcome
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

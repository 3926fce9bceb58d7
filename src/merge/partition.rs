//! PARTITION step: group diff records by target file.
//!
//! Builds an index from file path → records, dropping records that are not
//! file-backed, then removes records whose actual text repeats an earlier
//! record's for the same file.
//!
//! # Example
//!
//! ```text
//! Records (encounter order):
//!   1. a.txt  actual=X
//!   2. (none) actual=Y
//!   3. b.txt  actual=Z
//!   4. a.txt  actual=W
//!   5. a.txt  actual=X
//!
//! Groups:
//!   a.txt → [1, 4]     (5 duplicates 1)
//!   b.txt → [3]
//!   detached: 1, duplicates: 1
//! ```
//!
//! Files are ordered by path for determinism. Records inside a group keep
//! their encounter order: the fold treats the first record as the anchor.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::model::record::DiffRecord;

// ---------------------------------------------------------------------------
// FileDiffGroup
// ---------------------------------------------------------------------------

/// All surviving records for one file, in encounter order.
///
/// Never empty, and every record targets `path`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDiffGroup {
    path: PathBuf,
    records: Vec<DiffRecord>,
}

impl FileDiffGroup {
    /// Build a group, checking its invariants.
    ///
    /// Returns `None` if `records` is empty or any record targets a different
    /// path.
    #[must_use]
    pub fn new(path: PathBuf, records: Vec<DiffRecord>) -> Option<Self> {
        if records.is_empty()
            || records
                .iter()
                .any(|r| r.file_path.as_deref() != Some(path.as_path()))
        {
            return None;
        }
        Some(Self { path, records })
    }

    /// The target file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The records, in encounter order.
    #[must_use]
    pub fn records(&self) -> &[DiffRecord] {
        &self.records
    }

    /// Number of records (one merge step per record after the first).
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Always `false`; provided for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The anchor record and the records folded into it.
    ///
    /// # Panics
    ///
    /// Never, as groups are non-empty by construction.
    #[must_use]
    pub fn split_first(&self) -> (&DiffRecord, &[DiffRecord]) {
        self.records
            .split_first()
            .unwrap_or_else(|| unreachable!("FileDiffGroup is never empty"))
    }

    /// Rewrite every record's texts with `f`, keeping order and path.
    #[must_use]
    pub fn map_texts(self, mut f: impl FnMut(&str) -> String) -> Self {
        let records = self
            .records
            .into_iter()
            .map(|r| DiffRecord {
                expected: f(&r.expected),
                actual: f(&r.actual),
                file_path: r.file_path,
            })
            .collect();
        Self {
            path: self.path,
            records,
        }
    }
}

// ---------------------------------------------------------------------------
// PartitionResult
// ---------------------------------------------------------------------------

/// The result of grouping a record sequence by file.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PartitionResult {
    /// One group per file, sorted by path.
    pub groups: Vec<FileDiffGroup>,
    /// Records dropped because they had no file path.
    pub detached: usize,
    /// Records dropped because an earlier record for the same file had the
    /// same actual text.
    pub duplicates: usize,
}

impl PartitionResult {
    /// Returns `true` if nothing survived grouping.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of records that will be folded.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.groups.iter().map(FileDiffGroup::len).sum()
    }
}

// ---------------------------------------------------------------------------
// partition_by_file
// ---------------------------------------------------------------------------

/// Group records by file path and drop duplicates within each file.
pub fn partition_by_file(records: impl IntoIterator<Item = DiffRecord>) -> PartitionResult {
    let mut index: BTreeMap<PathBuf, Vec<DiffRecord>> = BTreeMap::new();
    let mut detached = 0;
    let mut duplicates = 0;

    for record in records {
        let Some(path) = record.file_path.clone() else {
            detached += 1;
            continue;
        };
        let kept = index.entry(path).or_default();
        if kept.iter().any(|k| k.actual == record.actual) {
            duplicates += 1;
            continue;
        }
        kept.push(record);
    }

    let groups = index
        .into_iter()
        .filter_map(|(path, records)| FileDiffGroup::new(path, records))
        .collect();

    PartitionResult {
        groups,
        detached,
        duplicates,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_by_path_and_drops_detached() {
        let result = partition_by_file(vec![
            DiffRecord::new("b.txt", "e", "1"),
            DiffRecord::detached("e", "2"),
            DiffRecord::new("a.txt", "e", "3"),
            DiffRecord::new("b.txt", "e", "4"),
        ]);

        assert_eq!(result.detached, 1);
        assert_eq!(result.duplicates, 0);
        let paths: Vec<_> = result.groups.iter().map(FileDiffGroup::path).collect();
        assert_eq!(paths, vec![Path::new("a.txt"), Path::new("b.txt")]);

        let b_actuals: Vec<_> = result.groups[1]
            .records()
            .iter()
            .map(|r| r.actual.as_str())
            .collect();
        assert_eq!(b_actuals, vec!["1", "4"]);
    }

    #[test]
    fn duplicates_keep_first_seen_order() {
        let result = partition_by_file(vec![
            DiffRecord::new("a.txt", "e1", "X"),
            DiffRecord::new("a.txt", "e2", "W"),
            DiffRecord::new("a.txt", "e3", "X"),
            DiffRecord::new("a.txt", "e4", "W"),
            DiffRecord::new("a.txt", "e5", "V"),
        ]);

        assert_eq!(result.duplicates, 2);
        let group = &result.groups[0];
        let kept: Vec<_> = group
            .records()
            .iter()
            .map(|r| (r.expected.as_str(), r.actual.as_str()))
            .collect();
        assert_eq!(kept, vec![("e1", "X"), ("e2", "W"), ("e5", "V")]);
    }

    #[test]
    fn same_actual_in_different_files_is_not_a_duplicate() {
        let result = partition_by_file(vec![
            DiffRecord::new("a.txt", "e", "X"),
            DiffRecord::new("b.txt", "e", "X"),
        ]);
        assert_eq!(result.duplicates, 0);
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.record_count(), 2);
    }

    #[test]
    fn only_detached_records_yield_empty_result() {
        let result = partition_by_file(vec![DiffRecord::detached("a", "b")]);
        assert!(result.is_empty());
        assert_eq!(result.detached, 1);
    }

    #[test]
    fn empty_input_yields_empty_result() {
        assert!(partition_by_file(Vec::<DiffRecord>::new()).is_empty());
    }

    #[test]
    fn group_rejects_empty_and_foreign_records() {
        assert!(FileDiffGroup::new("a.txt".into(), vec![]).is_none());
        assert!(
            FileDiffGroup::new("a.txt".into(), vec![DiffRecord::new("b.txt", "x", "y")]).is_none()
        );
        assert!(FileDiffGroup::new("a.txt".into(), vec![DiffRecord::detached("x", "y")]).is_none());
    }

    #[test]
    fn map_texts_rewrites_both_sides() {
        let group = FileDiffGroup::new(
            "a.txt".into(),
            vec![DiffRecord::new("a.txt", "old", "new")],
        )
        .unwrap()
        .map_texts(str::to_uppercase);
        assert_eq!(group.records()[0].expected, "OLD");
        assert_eq!(group.records()[0].actual, "NEW");
        assert_eq!(group.path(), Path::new("a.txt"));
    }
}

//! Diff records handed over by the test result collector.
//!
//! A failing test that compares an expected text artifact with the actual
//! output produces one [`DiffRecord`]. The collector can hand records over
//! either as a flat list or as the test-result tree it walked, in which case
//! [`collect_diffs`] flattens the tree the same way the host does: leaf tests
//! contribute their records, inner nodes contribute their children's records
//! in order.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// DiffRecord
// ---------------------------------------------------------------------------

/// One discrepancy observed by one failing test.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DiffRecord {
    /// The expected-data file the test compared against. Records without a
    /// path are not file-backed and never reach the merge.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
    /// What the test expected, i.e. what the file contained when it ran.
    #[serde(alias = "left")]
    pub expected: String,
    /// What the test actually produced and wants written back.
    #[serde(alias = "right")]
    pub actual: String,
}

impl DiffRecord {
    /// Create a file-backed record.
    pub fn new(
        file_path: impl Into<PathBuf>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self {
            file_path: Some(file_path.into()),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a record that is not backed by a file.
    pub fn detached(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self {
            file_path: None,
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TestNode
// ---------------------------------------------------------------------------

/// A node of the test-result tree.
///
/// Unknown keys are rejected so that a mistyped record never passes for an
/// empty node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestNode {
    /// Display name of the test or suite.
    #[serde(default)]
    pub name: String,
    /// Child tests. Empty for leaf tests.
    #[serde(default)]
    pub children: Vec<Self>,
    /// Diffs reported by this test. Only consulted on leaves.
    #[serde(default)]
    pub diffs: Vec<DiffRecord>,
}

impl TestNode {
    /// Returns `true` if this node has no children.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    fn collect_into(&self, out: &mut Vec<DiffRecord>) {
        if self.is_leaf() {
            out.extend(self.diffs.iter().cloned());
        } else {
            for child in &self.children {
                child.collect_into(out);
            }
        }
    }
}

/// Flatten test-result trees into diff records, depth first, in order.
#[must_use]
pub fn collect_diffs(nodes: &[TestNode]) -> Vec<DiffRecord> {
    let mut out = Vec::new();
    for node in nodes {
        node.collect_into(&mut out);
    }
    out
}

// ---------------------------------------------------------------------------
// DiffInput
// ---------------------------------------------------------------------------

/// What the collector hands over on the wire: a flat record list or a tree.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DiffInput {
    /// `[{"file_path": ..., "expected": ..., "actual": ...}, ...]`
    Records(Vec<DiffRecord>),
    /// `[{"name": ..., "children": [...], "diffs": [...]}, ...]`
    Tests(Vec<TestNode>),
}

impl DiffInput {
    /// Flatten into the record sequence the merge engine consumes.
    #[must_use]
    pub fn into_records(self) -> Vec<DiffRecord> {
        match self {
            Self::Records(records) => records,
            Self::Tests(nodes) => collect_diffs(&nodes),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

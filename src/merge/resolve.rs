//! RESOLVE step: three-way merge and the per-file fold.
//!
//! [`merge`] reconciles one `left`/`right` pair against a `base`:
//!
//! - a fragment where both sides agree takes that text,
//! - a fragment changed on exactly one side takes the changed side,
//! - a fragment changed differently on both sides becomes a conflict block.
//!
//! [`fold_group`] reduces every record of one file to a single text by
//! folding `merge` left to right. The base stays pinned to the first record's
//! expected text for the whole fold: the left side of each step already
//! carries every earlier change, and the pinned base is the only stable
//! reference for "untouched content".

use similar::Algorithm;
use tracing::debug;

use super::diff3::{MergeFragment, merge_fragments};
use super::partition::FileDiffGroup;
use crate::model::text::split_lines;

/// Opens a conflict block; followed by the left lines.
pub const CONFLICT_START: &str = "<<<<<<< LEFT";
/// Separates the left lines from the right lines of a conflict block.
pub const CONFLICT_SEPARATOR: &str = "=======";
/// Closes a conflict block.
pub const CONFLICT_END: &str = ">>>>>>> RIGHT";

// ---------------------------------------------------------------------------
// MergeOutcome
// ---------------------------------------------------------------------------

/// The text produced by a merge or a fold.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// Every fragment was resolved automatically.
    Resolved(String),
    /// At least one fragment needed conflict markers.
    Conflicting(String),
}

impl MergeOutcome {
    fn new(text: String, conflicted: bool) -> Self {
        if conflicted {
            Self::Conflicting(text)
        } else {
            Self::Resolved(text)
        }
    }

    /// The merged text, with markers if conflicting.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Resolved(text) | Self::Conflicting(text) => text,
        }
    }

    /// Consume the outcome and return its text.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Resolved(text) | Self::Conflicting(text) => text,
        }
    }

    /// Returns `true` if the text contains conflict markers.
    #[must_use]
    pub const fn has_conflict(&self) -> bool {
        matches!(self, Self::Conflicting(_))
    }
}

// ---------------------------------------------------------------------------
// Fragment resolution
// ---------------------------------------------------------------------------

/// How one fragment resolves.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FragmentResolution<'a> {
    /// Take these lines.
    Take(&'a [&'a str]),
    /// Both sides changed the fragment differently.
    Conflict {
        left: &'a [&'a str],
        right: &'a [&'a str],
    },
}

/// Resolve one fragment from its three chunks.
#[must_use]
pub fn resolve_chunks<'a>(
    left: &'a [&'a str],
    base: &[&str],
    right: &'a [&'a str],
) -> FragmentResolution<'a> {
    if left == right {
        FragmentResolution::Take(left)
    } else if left == base {
        FragmentResolution::Take(right)
    } else if right == base {
        FragmentResolution::Take(left)
    } else {
        FragmentResolution::Conflict { left, right }
    }
}

// ---------------------------------------------------------------------------
// merge
// ---------------------------------------------------------------------------

/// Three-way merge of `left` and `right` against `base` using Myers diffs.
#[must_use]
pub fn merge(left: &str, base: &str, right: &str) -> MergeOutcome {
    merge_with(left, base, right, Algorithm::Myers)
}

/// Three-way merge with an explicit line diff algorithm.
///
/// The output joins lines with `"\n"`; callers convert it to the target
/// separator.
///
/// # Panics
///
/// Panics if the fragment computation yields out-of-order or out-of-bounds
/// ranges. That is a bug in the line diff, not a property of the input.
#[must_use]
pub fn merge_with(left: &str, base: &str, right: &str, algorithm: Algorithm) -> MergeOutcome {
    let left_lines = split_lines(left);
    let base_lines = split_lines(base);
    let right_lines = split_lines(right);

    let fragments = merge_fragments(&left_lines, &base_lines, &right_lines, algorithm);
    let (lines, conflicts) = apply_fragments(&left_lines, &base_lines, &right_lines, &fragments);
    if conflicts > 0 {
        debug!(conflicts, fragments = fragments.len(), "merge produced conflicts");
    }
    MergeOutcome::new(lines.join("\n"), conflicts > 0)
}

/// Walk the fragments with a cursor into `base`, copying stable base lines
/// and resolving each fragment. Returns the output lines and the number of
/// conflicting fragments.
fn apply_fragments<'a>(
    left: &'a [&'a str],
    base: &'a [&'a str],
    right: &'a [&'a str],
    fragments: &[MergeFragment],
) -> (Vec<&'a str>, usize) {
    let mut out: Vec<&str> = Vec::with_capacity(base.len().max(left.len()));
    let mut conflicts = 0;
    let mut cursor = 0;

    for fragment in fragments {
        assert!(
            fragment.base.start >= cursor && fragment.base.end <= base.len(),
            "malformed merge fragment {fragment:?} (cursor {cursor}, base has {} lines)",
            base.len()
        );
        out.extend_from_slice(&base[cursor..fragment.base.start]);

        let left_chunk = &left[fragment.left.clone()];
        let base_chunk = &base[fragment.base.clone()];
        let right_chunk = &right[fragment.right.clone()];

        match resolve_chunks(left_chunk, base_chunk, right_chunk) {
            FragmentResolution::Take(lines) => out.extend_from_slice(lines),
            FragmentResolution::Conflict { left, right } => {
                conflicts += 1;
                out.push(CONFLICT_START);
                out.extend_from_slice(left);
                out.push(CONFLICT_SEPARATOR);
                out.extend_from_slice(right);
                out.push(CONFLICT_END);
            }
        }

        cursor = fragment.base.end;
    }

    out.extend_from_slice(&base[cursor..]);
    (out, conflicts)
}

// ---------------------------------------------------------------------------
// fold_group
// ---------------------------------------------------------------------------

/// Reduce all records of one file to a single output text.
///
/// One record yields its actual text verbatim. Several records are folded
/// left to right: the accumulator starts as the first actual text and each
/// later actual text is merged into it against the first record's expected
/// text. A conflict in any step marks the whole outcome as conflicting; the
/// fold still runs to the end.
#[must_use]
pub fn fold_group(group: &FileDiffGroup, algorithm: Algorithm) -> MergeOutcome {
    let (first, rest) = group.split_first();
    let base = first.expected.as_str();

    rest.iter().fold(
        MergeOutcome::Resolved(first.actual.clone()),
        |acc, record| {
            let conflicted = acc.has_conflict();
            let step = merge_with(acc.text(), base, &record.actual, algorithm);
            let conflicted = conflicted || step.has_conflict();
            MergeOutcome::new(step.into_text(), conflicted)
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

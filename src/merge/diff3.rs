//! Three-way line diff.
//!
//! Aligns `left` and `right` against a common `base` and reports the regions
//! where at least one side departs from the base as [`MergeFragment`]s.
//!
//! # Algorithm
//!
//! 1. Two-way line diffs `base → left` and `base → right` (via `similar`)
//!    give the matching blocks of each side.
//! 2. Intersecting the two lists of matching blocks yields the *stable*
//!    regions: base lines that survive unchanged on both sides, together with
//!    their positions in `left` and `right`.
//! 3. Everything between two consecutive stable regions is a fragment.
//!
//! ```text
//! base:   a b c d e
//! left:   a B c d e        matching blocks: [a] [c d e]
//! right:  a b c d E        matching blocks: [a b c d]
//!
//! stable: [a] [c d]        fragments: b|B|b, e|e|E
//! ```
//!
//! Fragments are ordered by base start and never overlap. Base lines outside
//! every fragment are identical on all three sides.

use std::ops::Range;

use similar::{Algorithm, DiffOp, capture_diff_slices};

// ---------------------------------------------------------------------------
// MergeFragment
// ---------------------------------------------------------------------------

/// A contiguous region where `left` or `right` departs from `base`.
///
/// Each range is a half-open line range into the corresponding text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MergeFragment {
    pub base: Range<usize>,
    pub left: Range<usize>,
    pub right: Range<usize>,
}

impl MergeFragment {
    /// Returns `true` if the fragment spans no line on any side.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.base.start == self.base.end
            && self.left.start == self.left.end
            && self.right.start == self.right.end
    }
}

/// A run of lines present in both texts of a two-way diff.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct MatchingBlock {
    base: usize,
    side: usize,
    len: usize,
}

/// A base range unchanged on both sides, with its left/right positions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct StableRegion {
    base: usize,
    left: usize,
    right: usize,
    len: usize,
}

// ---------------------------------------------------------------------------
// merge_fragments
// ---------------------------------------------------------------------------

/// Compute the fragments of a three-way line diff.
#[must_use]
pub fn merge_fragments(
    left: &[&str],
    base: &[&str],
    right: &[&str],
    algorithm: Algorithm,
) -> Vec<MergeFragment> {
    let left_blocks = matching_blocks(base, left, algorithm);
    let right_blocks = matching_blocks(base, right, algorithm);
    let stable = stable_regions(&left_blocks, &right_blocks);

    let mut fragments = Vec::new();
    let (mut b, mut l, mut r) = (0, 0, 0);

    // Sentinel: the end of all three texts closes the last fragment.
    let sentinel = StableRegion {
        base: base.len(),
        left: left.len(),
        right: right.len(),
        len: 0,
    };

    for region in stable.iter().chain(std::iter::once(&sentinel)) {
        let fragment = MergeFragment {
            base: b..region.base,
            left: l..region.left,
            right: r..region.right,
        };
        if !fragment.is_empty() {
            fragments.push(fragment);
        }
        b = region.base + region.len;
        l = region.left + region.len;
        r = region.right + region.len;
    }

    fragments
}

fn matching_blocks(base: &[&str], side: &[&str], algorithm: Algorithm) -> Vec<MatchingBlock> {
    capture_diff_slices(algorithm, base, side)
        .into_iter()
        .filter_map(|op| match op {
            DiffOp::Equal {
                old_index,
                new_index,
                len,
            } if len > 0 => Some(MatchingBlock {
                base: old_index,
                side: new_index,
                len,
            }),
            _ => None,
        })
        .collect()
}

/// Intersect the base ranges of two sorted lists of matching blocks.
fn stable_regions(left: &[MatchingBlock], right: &[MatchingBlock]) -> Vec<StableRegion> {
    let mut regions = Vec::new();
    let (mut i, mut j) = (0, 0);

    while i < left.len() && j < right.len() {
        let a = left[i];
        let b = right[j];
        let a_end = a.base + a.len;
        let b_end = b.base + b.len;

        let start = a.base.max(b.base);
        let end = a_end.min(b_end);
        if start < end {
            regions.push(StableRegion {
                base: start,
                left: a.side + (start - a.base),
                right: b.side + (start - b.base),
                len: end - start,
            });
        }

        if a_end < b_end {
            i += 1;
        } else {
            j += 1;
        }
    }

    regions
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn frags(left: &[&str], base: &[&str], right: &[&str]) -> Vec<MergeFragment> {
        merge_fragments(left, base, right, Algorithm::Myers)
    }

    fn frag(base: Range<usize>, left: Range<usize>, right: Range<usize>) -> MergeFragment {
        MergeFragment { base, left, right }
    }

    #[test]
    fn identical_texts_have_no_fragments() {
        let text = ["a", "b", "c"];
        assert!(frags(&text, &text, &text).is_empty());
    }

    #[test]
    fn one_sided_edit_is_one_fragment() {
        let base = ["a", "b", "c"];
        let left = ["a", "B", "c"];
        assert_eq!(frags(&left, &base, &base), vec![frag(1..2, 1..2, 1..2)]);
    }

    #[test]
    fn separated_edits_are_separate_fragments() {
        let base = ["a", "b", "c", "d", "e"];
        let left = ["a", "B", "c", "d", "e"];
        let right = ["a", "b", "c", "d", "E"];
        assert_eq!(
            frags(&left, &base, &right),
            vec![frag(1..2, 1..2, 1..2), frag(4..5, 4..5, 4..5)]
        );
    }

    #[test]
    fn adjacent_edits_share_a_fragment() {
        let base = ["a", "b", "c", "d"];
        let left = ["a", "B", "c", "d"];
        let right = ["a", "b", "C", "d"];
        assert_eq!(frags(&left, &base, &right), vec![frag(1..3, 1..3, 1..3)]);
    }

    #[test]
    fn insertion_has_empty_base_range() {
        let base = ["a", "b"];
        let left = ["a", "x", "b"];
        assert_eq!(frags(&left, &base, &base), vec![frag(1..1, 1..2, 1..1)]);
    }

    #[test]
    fn deletion_on_both_sides_is_a_fragment() {
        let base = ["a", "b", "c"];
        let both = ["a", "c"];
        assert_eq!(frags(&both, &base, &both), vec![frag(1..2, 1..1, 1..1)]);
    }

    #[test]
    fn trailing_append_reaches_end_of_texts() {
        let base = ["a"];
        let right = ["a", "b", "c"];
        assert_eq!(frags(&base, &base, &right), vec![frag(1..1, 1..1, 1..3)]);
    }

    #[test]
    fn fragments_are_ordered_and_disjoint() {
        let base = ["1", "2", "3", "4", "5", "6", "7", "8"];
        let left = ["1", "x", "3", "4", "5", "y", "7", "8", "9"];
        let right = ["0", "1", "2", "3", "z", "5", "6", "7"];
        let fragments = frags(&left, &base, &right);
        for pair in fragments.windows(2) {
            assert!(pair[0].base.end <= pair[1].base.start);
            assert!(pair[0].left.end <= pair[1].left.start);
            assert!(pair[0].right.end <= pair[1].right.start);
        }
        let last = fragments.last().unwrap();
        assert!(last.base.end <= base.len());
        assert!(last.left.end <= left.len());
        assert!(last.right.end <= right.len());
    }

    #[test]
    fn empty_fragment_reports_empty() {
        assert!(frag(3..3, 0..0, 7..7).is_empty());
        assert!(!frag(3..3, 0..1, 7..7).is_empty());
    }
}

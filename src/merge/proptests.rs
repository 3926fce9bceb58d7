//! Property tests for the merge engine.

use std::collections::HashSet;

use proptest::prelude::*;

use super::partition::partition_by_file;
use super::resolve::{CONFLICT_START, MergeOutcome, merge};
use crate::model::record::DiffRecord;

// Small alphabet so that random texts share lines and the diff has real
// alignment work to do.
fn arb_text() -> impl Strategy<Value = String> {
    prop::collection::vec("[abc]{0,2}", 0..12).prop_map(|lines| lines.join("\n"))
}

fn arb_records() -> impl Strategy<Value = Vec<DiffRecord>> {
    prop::collection::vec(
        (prop_oneof![Just("a.txt"), Just("b.txt")], arb_text()),
        0..10,
    )
    .prop_map(|items| {
        items
            .into_iter()
            .map(|(path, actual)| DiffRecord::new(path, "", actual))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_unchanged_left_takes_right(base in arb_text(), right in arb_text()) {
        prop_assert_eq!(merge(&base, &base, &right), MergeOutcome::Resolved(right));
    }

    #[test]
    fn prop_unchanged_right_keeps_left(base in arb_text(), left in arb_text()) {
        prop_assert_eq!(merge(&left, &base, &base), MergeOutcome::Resolved(left));
    }

    #[test]
    fn prop_identical_sides_merge_to_that_side(base in arb_text(), side in arb_text()) {
        prop_assert_eq!(merge(&side, &base, &side), MergeOutcome::Resolved(side));
    }

    #[test]
    fn prop_conflict_flag_matches_markers(
        base in arb_text(),
        left in arb_text(),
        right in arb_text()
    ) {
        let out = merge(&left, &base, &right);
        prop_assert_eq!(out.has_conflict(), out.text().contains(CONFLICT_START));
    }

    #[test]
    fn prop_merge_is_deterministic(
        base in arb_text(),
        left in arb_text(),
        right in arb_text()
    ) {
        prop_assert_eq!(merge(&left, &base, &right), merge(&left, &base, &right));
    }

    #[test]
    fn prop_dedup_keeps_one_record_per_actual(records in arb_records()) {
        let mut unique: HashSet<(&str, &str)> = HashSet::new();
        for r in &records {
            let path = r.file_path.as_deref().and_then(|p| p.to_str()).unwrap_or_default();
            unique.insert((path, r.actual.as_str()));
        }
        let partition = partition_by_file(records.clone());
        prop_assert_eq!(partition.record_count(), unique.len());
        prop_assert_eq!(partition.record_count() + partition.duplicates, records.len());
    }
}

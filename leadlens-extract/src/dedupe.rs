use crate::types::BusinessRecord;
use std::collections::HashSet;

/// Drop later records whose normalised name and address repeat an earlier one.
///
/// Runs over the concatenated results of every source, so the same shop seen
/// on two engines collapses to its first sighting. Records with different
/// addresses are kept even when their names match.
pub fn dedupe_businesses(records: Vec<BusinessRecord>) -> Vec<BusinessRecord> {
    let before = records.len();
    let mut seen = HashSet::new();
    let kept: Vec<BusinessRecord> = records
        .into_iter()
        .filter(|record| seen.insert(dedupe_key(record)))
        .collect();

    tracing::debug!(
        target: "extract.dedupe",
        before,
        after = kept.len(),
        "dedupe finished"
    );
    kept
}

fn dedupe_key(record: &BusinessRecord) -> (String, String) {
    (
        normalise(&record.name),
        record.address.as_deref().map(normalise).unwrap_or_default(),
    )
}

fn normalise(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

//! Shared-field mapping — declarative copy of values between the submission
//! of a step being left and the next step's submission.

use std::collections::BTreeMap;

use crate::models::FieldMapping;

/// Compute the writes `rules` produce from `source` into `target`.
///
/// A rule fires only when the source value is non-empty and the target key is
/// absent or empty: a value the user already entered is never overwritten.
/// Returns only the new entries — the caller persists them; `source` and
/// `target` are untouched.
pub fn apply(
    source: &BTreeMap<String, String>,
    target: &BTreeMap<String, String>,
    rules: &[FieldMapping],
) -> BTreeMap<String, String> {
    let mut writes = BTreeMap::new();

    for rule in rules {
        let Some(value) = source.get(&rule.from).filter(|value| !value.is_empty()) else {
            continue;
        };
        let occupied = target.get(&rule.to).is_some_and(|value| !value.is_empty());
        if !occupied && !writes.contains_key(&rule.to) {
            writes.insert(rule.to.clone(), value.clone());
        }
    }

    writes
}

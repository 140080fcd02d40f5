//! Chronological ordering of resolved versions.

use crate::models::Version;

/// Sorts versions by timestamp, oldest first.
///
/// The sort is stable: versions with equal timestamps keep the order in which
/// their stories and branches were visited.
#[must_use]
pub fn merge(mut versions: Vec<Version>) -> Vec<Version> {
    versions.sort_by_key(|version| version.timestamp);
    versions
}

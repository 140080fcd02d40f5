//! Story-to-branch association.
//!
//! A branch belongs to a story when the story id occurs anywhere in the
//! branch name. Ids that are substrings of other ids ("123" in "1234") can
//! match the wrong branch; that is accepted in exchange for not imposing a
//! naming grammar.

use crate::tracker::Story;
use tracing::warn;

/// Returns the first branch whose name contains the story id.
#[must_use]
pub fn match_branch<'a>(story: &Story, branches: &'a [String]) -> Option<&'a String> {
    if story.id.is_empty() {
        return None;
    }
    let mut candidates = branches
        .iter()
        .filter(|branch| branch.contains(story.id.as_str()));
    let first = candidates.next()?;
    let others: Vec<&str> = candidates.map(String::as_str).collect();
    if !others.is_empty() {
        warn!(
            story_id = %story.id,
            branch = %first,
            ignored = ?others,
            "Story id matches several branches, using the first"
        );
    }
    Some(first)
}

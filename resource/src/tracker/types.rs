//! Tracker domain types.

use crate::models::lenient;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A unit of work in the tracker.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Story {
    /// Story id, rendered as text.
    #[serde(deserialize_with = "lenient::story_id")]
    pub id: String,
    /// Story title.
    #[serde(default)]
    pub name: Option<String>,
    /// Lifecycle state.
    #[serde(default)]
    pub current_state: Option<StoryState>,
    /// Web URL of the story.
    #[serde(default)]
    pub url: Option<String>,
}

impl Story {
    /// Creates a story with only an id.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

/// Lifecycle states of a story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoryState {
    /// Accepted by the product owner.
    Accepted,
    /// Delivered for acceptance.
    Delivered,
    /// Finished by the developers.
    Finished,
    /// Work in progress.
    Started,
    /// Rejected on acceptance.
    Rejected,
    /// Planned for an iteration.
    Planned,
    /// In the backlog, not started.
    Unstarted,
    /// In the icebox.
    Unscheduled,
}

impl StoryState {
    /// Query value used by the tracker API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Delivered => "delivered",
            Self::Finished => "finished",
            Self::Started => "started",
            Self::Rejected => "rejected",
            Self::Planned => "planned",
            Self::Unstarted => "unstarted",
            Self::Unscheduled => "unscheduled",
        }
    }
}

impl fmt::Display for StoryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a story's activity feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Activity {
    /// Unique activity id.
    #[serde(default)]
    pub guid: String,
    /// Activity kind, e.g. `story_update_activity`.
    #[serde(default)]
    pub kind: String,
    /// Human readable summary.
    #[serde(default)]
    pub message: String,
    /// Short verb such as "finished".
    #[serde(default)]
    pub highlight: String,
    /// When it happened, in epoch milliseconds.
    #[serde(default)]
    pub occurred_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_decodes_numeric_id() -> anyhow::Result<()> {
        let stories: Vec<Story> = serde_json::from_str(
            r#"[{"kind": "story", "id": 560, "name": "Tractor beam loses power intermittently", "current_state": "delivered", "url": "https://www.pivotaltracker.com/story/show/560"}]"#,
        )?;
        assert_eq!(stories[0].id, "560");
        assert_eq!(stories[0].current_state, Some(StoryState::Delivered));
        assert_eq!(
            stories[0].name.as_deref(),
            Some("Tractor beam loses power intermittently")
        );
        Ok(())
    }

    #[test]
    fn test_activity_decodes() -> anyhow::Result<()> {
        let activities: Vec<Activity> = serde_json::from_str(
            r#"[{"guid": "99_45", "kind": "story_update_activity", "message": "Darth Vader started this feature", "highlight": "started", "occurred_at": 1433829600000}]"#,
        )?;
        assert_eq!(activities[0].guid, "99_45");
        assert_eq!(activities[0].occurred_at, 1_433_829_600_000);
        Ok(())
    }

    #[test]
    fn test_state_query_values() {
        assert_eq!(StoryState::Finished.to_string(), "finished");
        assert_eq!(StoryState::Delivered.as_str(), "delivered");
    }
}

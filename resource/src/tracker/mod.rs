//! Tracker capability: where the stories come from.

pub mod client;
pub mod error;
pub mod types;

pub use client::{TrackerClient, TrackerConfig};
pub use error::TrackerError;
pub use types::{Activity, Story, StoryState};

use async_trait::async_trait;

/// Story queries against a single tracker project.
#[async_trait]
pub trait StoryTracker: Send + Sync {
    /// Lists the stories currently in `state`.
    async fn stories(&self, state: StoryState) -> Result<Vec<Story>, TrackerError>;

    /// Lists activity on a story, optionally only after `occurred_after`
    /// (epoch milliseconds).
    async fn story_activity(
        &self,
        story_id: &str,
        occurred_after: Option<i64>,
    ) -> Result<Vec<Activity>, TrackerError>;
}

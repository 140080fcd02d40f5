//! The `check` command: report new story-branch versions.

use crate::commands::{GitAccess, tracker_client};
use crate::error::ResourceError;
use crate::infrastructure::config::Settings;
use crate::models::{Source, Version};
use crate::repository::{GitRepository, Repository};
use crate::resolver::VersionResolver;
use crate::tracker::{Story, StoryState, StoryTracker, TrackerError};
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// Stories in these states are eligible, queried in this order.
pub const ELIGIBLE_STATES: [StoryState; 2] = [StoryState::Finished, StoryState::Delivered];

/// Request read by `check`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckRequest {
    /// Resource configuration.
    pub source: Source,
    /// Last reported version; absent on the first check.
    #[serde(default)]
    pub version: Option<Version>,
}

/// Runs `check`: clones the repository into a temporary directory, lists
/// the eligible stories and resolves new versions.
///
/// # Errors
///
/// Returns the first configuration, tracker or repository failure.
#[instrument(skip_all)]
pub async fn run(request: CheckRequest, settings: &Settings) -> Result<Vec<Version>, ResourceError> {
    let CheckRequest { source, version } = request;
    let tracker = tracker_client(&source, settings)?;
    let repo_url = source.repo()?;
    let access = GitAccess::prepare(&source, settings)?;

    let workspace = tempfile::Builder::new()
        .prefix("tracker-git-branch-resource-check")
        .tempdir()
        .map_err(|e| {
            ResourceError::io("Could not create clone directory in", std::env::temp_dir(), e)
        })?;
    let repository =
        GitRepository::clone_from(repo_url, workspace.path(), access.config.clone()).await?;

    check(&repository, &tracker, &version.unwrap_or_default()).await
}

/// Resolves new versions for the eligible stories of `tracker`.
///
/// # Errors
///
/// Returns the first tracker or repository failure.
pub async fn check<R: Repository + ?Sized>(
    repository: &R,
    tracker: &dyn StoryTracker,
    starting: &Version,
) -> Result<Vec<Version>, ResourceError> {
    let stories = collect_stories(tracker).await?;
    info!(
        stories = stories.len(),
        bootstrap = starting.is_initial(),
        "Checking story branches"
    );
    Ok(VersionResolver::new(repository)
        .resolve(starting, &stories)
        .await?)
}

/// Lists finished stories followed by delivered ones.
///
/// # Errors
///
/// Returns the first tracker failure.
pub async fn collect_stories(tracker: &dyn StoryTracker) -> Result<Vec<Story>, TrackerError> {
    let mut stories = Vec::new();
    for state in ELIGIBLE_STATES {
        let batch = tracker.stories(state).await?;
        debug!(%state, count = batch.len(), "Fetched stories");
        stories.extend(batch);
    }
    Ok(stories)
}

//! Version resolution over story branches.
//!
//! The resolver fetches once, lists remote branches once, and then runs in
//! one of two modes:
//!
//! - **bootstrap** (no starting version): the single newest story-branch tip
//!   across all stories, ties going to the story seen first;
//! - **incremental**: every commit on every story branch at or after the
//!   starting version, oldest first.
//!
//! Work is strictly sequential; ordering is decided only by [`merge`].

pub mod matcher;
pub mod merge;
pub mod recovery;

pub use matcher::match_branch;
pub use merge::merge;
pub use recovery::{FULL_HISTORY, lower_bound};

use crate::models::Version;
use crate::repository::{Repository, RepositoryError, is_symbolic_ref};
use crate::tracker::Story;
use tracing::{debug, info, instrument};

/// Computes new versions from story branches in a repository.
pub struct VersionResolver<'a, R: Repository + ?Sized> {
    repository: &'a R,
}

impl<'a, R: Repository + ?Sized> VersionResolver<'a, R> {
    /// Creates a resolver over `repository`.
    #[must_use]
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    /// Resolves the versions to report after `starting`.
    ///
    /// # Errors
    ///
    /// Returns the first repository failure; no partial result is produced.
    #[instrument(skip_all, fields(starting_story = %starting.story_id, stories = stories.len()))]
    pub async fn resolve(
        &self,
        starting: &Version,
        stories: &[Story],
    ) -> Result<Vec<Version>, RepositoryError> {
        self.repository.fetch().await?;
        let branches: Vec<String> = self
            .repository
            .remote_branches()
            .await?
            .into_iter()
            .filter(|branch| !is_symbolic_ref(branch))
            .collect();
        debug!(branches = branches.len(), "Listed remote branches");

        let versions = if starting.is_initial() {
            self.bootstrap(stories, &branches).await?
        } else {
            self.incremental(starting, stories, &branches).await?
        };
        info!(versions = versions.len(), "Resolved versions");
        Ok(versions)
    }

    async fn bootstrap(
        &self,
        stories: &[Story],
        branches: &[String],
    ) -> Result<Vec<Version>, RepositoryError> {
        let mut latest: Option<Version> = None;
        for story in stories {
            let Some(branch) = match_branch(story, branches) else {
                continue;
            };
            let timestamp = self.repository.ref_commit_timestamp(branch).await?;
            if latest.as_ref().is_some_and(|best| timestamp <= best.timestamp) {
                continue;
            }
            let reference = self.repository.latest_ref(branch).await?;
            debug!(story_id = %story.id, %branch, %reference, timestamp, "New latest story branch");
            latest = Some(Version::new(story.id.clone(), reference, timestamp));
        }
        Ok(latest.into_iter().collect())
    }

    async fn incremental(
        &self,
        starting: &Version,
        stories: &[Story],
        branches: &[String],
    ) -> Result<Vec<Version>, RepositoryError> {
        let since = lower_bound(self.repository, starting).await?;
        let mut versions = Vec::new();
        for story in stories {
            let Some(branch) = match_branch(story, branches) else {
                continue;
            };
            let refs = self.repository.refs_since_timestamp(branch, since).await?;
            debug!(story_id = %story.id, %branch, since, refs = refs.len(), "Walking story branch");
            for reference in refs {
                let reference = reference.trim();
                if reference.is_empty() || reference == starting.reference {
                    continue;
                }
                let timestamp = self.repository.ref_commit_timestamp(reference).await?;
                versions.push(Version::new(story.id.clone(), reference, timestamp));
            }
        }
        Ok(merge(versions))
    }
}

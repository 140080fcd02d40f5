//! The `in` command: check out a version and describe it.

use crate::commands::GitAccess;
use crate::error::ResourceError;
use crate::infrastructure::config::Settings;
use crate::models::{MetadataPair, Source, Version};
use crate::repository::{GitRepository, Repository};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, instrument};

/// Request read by `in`.
#[derive(Debug, Clone, Deserialize)]
pub struct GetRequest {
    /// Resource configuration.
    pub source: Source,
    /// Version to fetch.
    pub version: Version,
}

/// Response written by `in`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GetResponse {
    /// The fetched version, echoed back.
    pub version: Version,
    /// Commit and story details.
    pub metadata: Vec<MetadataPair>,
}

/// Runs `in`: clones the repository into `target_dir` and checks out the
/// requested ref.
///
/// # Errors
///
/// Returns a configuration error for an empty ref, otherwise the first
/// filesystem or repository failure.
#[instrument(skip(request, settings), fields(target_dir = %target_dir.display()))]
pub async fn run(
    request: GetRequest,
    target_dir: &Path,
    settings: &Settings,
) -> Result<GetResponse, ResourceError> {
    let GetRequest { source, version } = request;
    if version.reference.trim().is_empty() {
        return Err(ResourceError::Config(
            "version.ref must not be empty".to_string(),
        ));
    }
    let tracker_url = source.tracker_url(&settings.tracker)?;
    let repo_url = source.repo()?;
    let access = GitAccess::prepare(&source, settings)?;

    tokio::fs::create_dir_all(target_dir)
        .await
        .map_err(|e| ResourceError::io("Could not create", target_dir, e))?;
    let repository =
        GitRepository::clone_from(repo_url, target_dir, access.config.clone()).await?;

    fetch_version(&repository, version, &tracker_url).await
}

/// Checks out `version` in `repository` and collects its metadata.
///
/// # Errors
///
/// Returns the first repository failure.
pub async fn fetch_version<R: Repository + ?Sized>(
    repository: &R,
    version: Version,
    tracker_url: &Url,
) -> Result<GetResponse, ResourceError> {
    repository.fetch().await?;
    repository.checkout_ref(&version.reference).await?;
    let details = repository.commit_details(&version.reference).await?;
    info!(story_id = %version.story_id, reference = %details.commit, "Checked out version");

    let metadata = vec![
        MetadataPair::new("commit", details.commit),
        MetadataPair::new("author", details.author),
        MetadataPair::new("author_date", details.author_date),
        MetadataPair::new("committer", details.committer),
        MetadataPair::new("committer_date", details.committer_date),
        MetadataPair::new("message", details.message),
        MetadataPair::new("story_url", story_url(tracker_url, &version.story_id)),
    ];
    Ok(GetResponse { version, metadata })
}

/// Link to a story in the tracker's web UI.
#[must_use]
pub fn story_url(tracker_url: &Url, story_id: &str) -> String {
    format!(
        "{}/story/show/{story_id}",
        tracker_url.as_str().trim_end_matches('/')
    )
}

//! Lower bound for incremental resolution.
//!
//! If the last reported commit has disappeared (force-push, deleted branch)
//! its timestamp can no longer be trusted, so the whole history is scanned
//! instead of failing the check.

use crate::models::Version;
use crate::repository::{Repository, RepositoryError};
use tracing::{debug, warn};

/// Lower bound that includes every commit.
pub const FULL_HISTORY: i64 = i64::MIN;

/// Returns the timestamp incremental resolution should start from.
///
/// # Errors
///
/// Returns any repository failure other than "reference not found".
pub async fn lower_bound<R>(repository: &R, starting: &Version) -> Result<i64, RepositoryError>
where
    R: Repository + ?Sized,
{
    if starting.reference.is_empty() {
        return Ok(starting.timestamp);
    }
    match repository.ref_commit_timestamp(&starting.reference).await {
        Ok(_) => {
            debug!(reference = %starting.reference, timestamp = starting.timestamp, "Starting ref resolves");
            Ok(starting.timestamp)
        }
        Err(err) if err.is_not_found() => {
            warn!(
                story_id = %starting.story_id,
                reference = %starting.reference,
                error = %err,
                "Starting ref no longer exists, scanning full history"
            );
            Ok(FULL_HISTORY)
        }
        Err(err) => Err(err),
    }
}

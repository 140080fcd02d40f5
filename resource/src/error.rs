//! Error types for resource commands.
//!
//! Every failure a command can hit is mapped into [`ResourceError`], whose
//! cause chain, joined with `: `, is the single line written to standard
//! error. `Display` of each variant leaves its source out.

use crate::repository::RepositoryError;
use crate::tracker::TrackerError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a resource command.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The request or process settings are invalid.
    #[error("Invalid configuration: {0}")]
    Config(String),
    /// Process settings could not be loaded.
    #[error("Could not load settings")]
    Settings(#[from] config::ConfigError),
    /// The request on standard input could not be decoded.
    #[error("Could not parse input")]
    Decode(#[source] serde_json::Error),
    /// The response could not be written to standard output.
    #[error("Could not print response")]
    Encode(#[source] serde_json::Error),
    /// A repository operation failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// A tracker request failed.
    #[error(transparent)]
    Tracker(#[from] TrackerError),
    /// A local filesystem operation failed.
    #[error("{action} {path}")]
    Io {
        /// What was being attempted.
        action: &'static str,
        /// Path involved.
        path: PathBuf,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
}

impl ResourceError {
    /// Builds a [`ResourceError::Io`] for `path`.
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            action,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::Operation;

    #[test]
    fn test_config_error_display() {
        let err = ResourceError::Config("project_id \"abc\" is not a number".to_string());
        assert_eq!(
            err.to_string(),
            "Invalid configuration: project_id \"abc\" is not a number"
        );
    }

    #[test]
    fn test_repository_error_is_transparent() {
        let err = ResourceError::from(RepositoryError::not_found(
            Operation::LatestRef,
            "origin/feature-1",
            "unknown revision",
        ));
        assert!(err.to_string().starts_with("show tip of origin/feature-1"));
    }

    #[test]
    fn test_io_error_names_path() {
        let err = ResourceError::io(
            "Could not create target directory",
            "/tmp/target",
            std::io::Error::other("denied"),
        );
        assert_eq!(err.to_string(), "Could not create target directory /tmp/target");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "Could not create target directory /tmp/target: denied"
        );
    }

    #[test]
    fn test_error_chain_names_each_cause_once() {
        let decode = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let cause = decode.to_string();
        let err = anyhow::Error::from(ResourceError::Decode(decode));
        assert_eq!(format!("{err:#}"), format!("Could not parse input: {cause}"));

        let err = ResourceError::from(RepositoryError::Spawn {
            operation: Operation::Fetch,
            operand: "origin".to_string(),
            program: "/nonexistent/git".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });
        let line = format!("{:#}", anyhow::Error::from(err));
        assert!(line.starts_with("Could not run /nonexistent/git to fetch origin: "));
        assert_eq!(line.matches("Could not run").count(), 1);
    }
}

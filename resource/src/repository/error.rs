//! Error types for repository operations.
//!
//! Every variant carries the failing [`Operation`] and its operand so a
//! message always says which branch or ref was involved.

use std::fmt;
use thiserror::Error;

/// Repository operation that produced an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `git clone`.
    Clone,
    /// `git fetch origin`.
    Fetch,
    /// `git branch -r`.
    RemoteBranches,
    /// Commit timestamp lookup.
    RefCommitTimestamp,
    /// Branch tip lookup.
    LatestRef,
    /// `git log --since`.
    RefsSinceTimestamp,
    /// `git checkout`.
    CheckoutRef,
    /// Author, committer and message lookup.
    CommitDetails,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clone => "clone",
            Self::Fetch => "fetch",
            Self::RemoteBranches => "list remote branches",
            Self::RefCommitTimestamp => "show commit timestamp of",
            Self::LatestRef => "show tip of",
            Self::RefsSinceTimestamp => "list refs of",
            Self::CheckoutRef => "checkout",
            Self::CommitDetails => "show details of",
        };
        f.write_str(name)
    }
}

/// Errors that can occur while querying a repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The ref or branch does not exist.
    #[error("{operation} {operand}: reference not found: {detail}")]
    NotFound {
        /// Failing operation.
        operation: Operation,
        /// Branch or ref involved.
        operand: String,
        /// Diagnostic from the repository.
        detail: String,
    },
    /// The command ran and exited unsuccessfully.
    #[error("{operation} {operand} failed ({status}): {stderr}")]
    CommandFailed {
        /// Failing operation.
        operation: Operation,
        /// Branch or ref involved.
        operand: String,
        /// Exit status description.
        status: String,
        /// Standard error, folded onto one line.
        stderr: String,
    },
    /// The command could not be started.
    #[error("Could not run {program} to {operation} {operand}")]
    Spawn {
        /// Failing operation.
        operation: Operation,
        /// Branch or ref involved.
        operand: String,
        /// Program that failed to start.
        program: String,
        /// Source error.
        #[source]
        source: std::io::Error,
    },
    /// The command did not finish in time and was killed.
    #[error("{operation} {operand} timed out after {seconds}s")]
    Timeout {
        /// Failing operation.
        operation: Operation,
        /// Branch or ref involved.
        operand: String,
        /// Configured timeout.
        seconds: u64,
    },
    /// The command succeeded but its output was not understood.
    #[error("{operation} {operand}: could not parse output {output:?}")]
    InvalidOutput {
        /// Failing operation.
        operation: Operation,
        /// Branch or ref involved.
        operand: String,
        /// Offending output.
        output: String,
    },
}

impl RepositoryError {
    /// Builds a [`RepositoryError::NotFound`].
    pub fn not_found(
        operation: Operation,
        operand: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self::NotFound {
            operation,
            operand: operand.into(),
            detail: detail.into(),
        }
    }

    /// Returns `true` if the ref or branch does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns the operation that failed.
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            Self::NotFound { operation, .. }
            | Self::CommandFailed { operation, .. }
            | Self::Spawn { operation, .. }
            | Self::Timeout { operation, .. }
            | Self::InvalidOutput { operation, .. } => *operation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_distinguished() {
        let err = RepositoryError::not_found(Operation::RefCommitTimestamp, "deadbeef", "bad object");
        assert!(err.is_not_found());

        let err = RepositoryError::CommandFailed {
            operation: Operation::Fetch,
            operand: "origin".to_string(),
            status: "exit status: 128".to_string(),
            stderr: "Could not read from remote repository.".to_string(),
        };
        assert!(!err.is_not_found());
        assert_eq!(err.operation(), Operation::Fetch);
    }

    #[test]
    fn test_error_display_names_operation_and_operand() {
        let err = RepositoryError::Timeout {
            operation: Operation::RefsSinceTimestamp,
            operand: "origin/feature-1 since 1433800800".to_string(),
            seconds: 300,
        };
        assert_eq!(
            err.to_string(),
            "list refs of origin/feature-1 since 1433800800 timed out after 300s"
        );

        let err = RepositoryError::InvalidOutput {
            operation: Operation::RefCommitTimestamp,
            operand: "abc".to_string(),
            output: "soon".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "show commit timestamp of abc: could not parse output \"soon\""
        );
    }
}

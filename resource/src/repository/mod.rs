//! Repository capability consumed by the version resolver.
//!
//! The resolver only ever talks to a [`Repository`]. [`GitRepository`] shells
//! out to the `git` binary; [`InMemoryRepository`] is a scripted fake.

pub mod error;
pub mod git;
pub mod memory;

pub use error::{Operation, RepositoryError};
pub use git::{GitConfig, GitRepository};
pub use memory::InMemoryRepository;

use async_trait::async_trait;

/// Descriptive fields of a single commit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitDetails {
    /// Full commit identifier.
    pub commit: String,
    /// Author name.
    pub author: String,
    /// Author date, ISO-8601-like (`%ai`).
    pub author_date: String,
    /// Committer name.
    pub committer: String,
    /// Committer date, ISO-8601-like (`%ci`).
    pub committer_date: String,
    /// Raw commit message.
    pub message: String,
}

/// Branch and commit queries against a version-control repository.
#[async_trait]
pub trait Repository: Send + Sync {
    /// Synchronizes remote refs.
    async fn fetch(&self) -> Result<(), RepositoryError>;

    /// Lists remote branch names, without symbolic aliases.
    async fn remote_branches(&self) -> Result<Vec<String>, RepositoryError>;

    /// Returns the commit time of `reference` in epoch seconds.
    async fn ref_commit_timestamp(&self, reference: &str) -> Result<i64, RepositoryError>;

    /// Returns the commit identifier at the tip of `branch`.
    async fn latest_ref(&self, branch: &str) -> Result<String, RepositoryError>;

    /// Lists commits on `branch` made at or after `timestamp`.
    async fn refs_since_timestamp(
        &self,
        branch: &str,
        timestamp: i64,
    ) -> Result<Vec<String>, RepositoryError>;

    /// Checks out `reference` in the working tree.
    async fn checkout_ref(&self, reference: &str) -> Result<(), RepositoryError>;

    /// Reads author, committer and message of `reference`.
    async fn commit_details(&self, reference: &str) -> Result<CommitDetails, RepositoryError>;
}

/// Returns `true` for symbolic entries such as `origin/HEAD -> origin/main`.
#[must_use]
pub fn is_symbolic_ref(name: &str) -> bool {
    // Ref names cannot contain spaces, so only the alias separator matches.
    name.contains(" -> ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_symbolic_ref() {
        assert!(is_symbolic_ref("origin/HEAD -> origin/master"));
        assert!(!is_symbolic_ref("origin/feature-1234"));
        assert!(!is_symbolic_ref("origin/HEAD"));
        assert!(!is_symbolic_ref("origin/1234->fix"));
        assert!(!is_symbolic_ref("origin/feature->1234"));
    }
}

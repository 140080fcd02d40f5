//! In-memory repository for tests and dry runs.
//!
//! Branches keep their insertion order, which stands in for the order
//! `git branch -r` would print them in.

use super::error::{Operation, RepositoryError};
use super::{CommitDetails, Repository, is_symbolic_ref};
use async_trait::async_trait;
use chrono::DateTime;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone)]
struct FakeCommit {
    timestamp: i64,
    details: Option<CommitDetails>,
}

#[derive(Debug, Default)]
struct State {
    /// Branch names in listing order, symbolic entries included.
    branches: Vec<String>,
    /// Commits per branch, oldest first.
    history: HashMap<String, Vec<String>>,
    commits: HashMap<String, FakeCommit>,
    failing_refs: HashSet<String>,
    fetch_error: Option<String>,
    fetch_count: usize,
    checked_out: Option<String>,
}

/// Scripted [`Repository`] that keeps all refs in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<State>,
}

impl InMemoryRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an empty branch.
    #[must_use]
    pub fn with_branch(self, branch: impl Into<String>) -> Self {
        self.add_branch(branch);
        self
    }

    /// Adds a commit as the new tip of `branch`, creating the branch if needed.
    #[must_use]
    pub fn with_commit(
        self,
        branch: impl Into<String>,
        reference: impl Into<String>,
        timestamp: i64,
    ) -> Self {
        self.add_commit(branch, reference, timestamp);
        self
    }

    /// Adds a listing entry that aliases another branch, like `origin/HEAD`.
    #[must_use]
    pub fn with_symbolic_ref(self, name: &str, target: &str) -> Self {
        self.state.write().branches.push(format!("{name} -> {target}"));
        self
    }

    /// Adds a branch, keeping listing order.
    pub fn add_branch(&self, branch: impl Into<String>) {
        let branch = branch.into();
        let mut state = self.state.write();
        if !state.branches.contains(&branch) {
            state.branches.push(branch.clone());
        }
        state.history.entry(branch).or_default();
    }

    /// Adds a commit as the new tip of `branch`.
    pub fn add_commit(
        &self,
        branch: impl Into<String>,
        reference: impl Into<String>,
        timestamp: i64,
    ) {
        let branch = branch.into();
        let reference = reference.into();
        self.add_branch(branch.clone());
        let mut state = self.state.write();
        state.commits.insert(
            reference.clone(),
            FakeCommit {
                timestamp,
                details: None,
            },
        );
        state.history.entry(branch).or_default().push(reference);
    }

    /// Attaches author, committer and message details to an existing commit.
    pub fn set_details(&self, reference: &str, details: CommitDetails) {
        if let Some(commit) = self.state.write().commits.get_mut(reference) {
            commit.details = Some(details);
        }
    }

    /// Removes a branch, as if it had been deleted upstream.
    pub fn delete_branch(&self, branch: &str) {
        let mut state = self.state.write();
        state.branches.retain(|name| name != branch);
        if let Some(refs) = state.history.remove(branch) {
            let still_reachable: HashSet<String> =
                state.history.values().flatten().cloned().collect();
            for reference in refs {
                if !still_reachable.contains(&reference) {
                    state.commits.remove(&reference);
                }
            }
        }
    }

    /// Makes every lookup of `reference` fail with a non-recoverable error.
    pub fn fail_ref(&self, reference: impl Into<String>) {
        self.state.write().failing_refs.insert(reference.into());
    }

    /// Makes `fetch` fail with `message`.
    pub fn fail_fetch(&self, message: impl Into<String>) {
        self.state.write().fetch_error = Some(message.into());
    }

    /// Number of successful fetches.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.state.read().fetch_count
    }

    /// Ref last passed to `checkout_ref`.
    #[must_use]
    pub fn checked_out(&self) -> Option<String> {
        self.state.read().checked_out.clone()
    }

    fn commit(&self, operation: Operation, reference: &str) -> Result<FakeCommit, RepositoryError> {
        let state = self.state.read();
        if state.failing_refs.contains(reference) {
            return Err(RepositoryError::CommandFailed {
                operation,
                operand: reference.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        if let Some(commit) = state.commits.get(reference) {
            return Ok(commit.clone());
        }
        // Branch names resolve to their tip, as in git.
        state
            .history
            .get(reference)
            .and_then(|refs| refs.last())
            .and_then(|tip| state.commits.get(tip))
            .cloned()
            .ok_or_else(|| unknown_revision(operation, reference))
    }

    fn tip(&self, branch: &str) -> Result<String, RepositoryError> {
        let state = self.state.read();
        if state.failing_refs.contains(branch) {
            return Err(RepositoryError::CommandFailed {
                operation: Operation::LatestRef,
                operand: branch.to_string(),
                status: "exit status: 1".to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        if state.commits.contains_key(branch) {
            return Ok(branch.to_string());
        }
        state
            .history
            .get(branch)
            .and_then(|refs| refs.last())
            .cloned()
            .ok_or_else(|| unknown_revision(Operation::LatestRef, branch))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn fetch(&self) -> Result<(), RepositoryError> {
        let mut state = self.state.write();
        if let Some(message) = &state.fetch_error {
            return Err(RepositoryError::CommandFailed {
                operation: Operation::Fetch,
                operand: "origin".to_string(),
                status: "exit status: 128".to_string(),
                stderr: message.clone(),
            });
        }
        state.fetch_count += 1;
        Ok(())
    }

    async fn remote_branches(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self
            .state
            .read()
            .branches
            .iter()
            .filter(|name| !is_symbolic_ref(name))
            .cloned()
            .collect())
    }

    async fn ref_commit_timestamp(&self, reference: &str) -> Result<i64, RepositoryError> {
        self.commit(Operation::RefCommitTimestamp, reference)
            .map(|commit| commit.timestamp)
    }

    async fn latest_ref(&self, branch: &str) -> Result<String, RepositoryError> {
        self.tip(branch)
    }

    async fn refs_since_timestamp(
        &self,
        branch: &str,
        timestamp: i64,
    ) -> Result<Vec<String>, RepositoryError> {
        let state = self.state.read();
        let operand = format!("{branch} since {timestamp}");
        if state.failing_refs.contains(branch) {
            return Err(RepositoryError::CommandFailed {
                operation: Operation::RefsSinceTimestamp,
                operand,
                status: "exit status: 1".to_string(),
                stderr: "injected failure".to_string(),
            });
        }
        let refs = state
            .history
            .get(branch)
            .ok_or_else(|| unknown_revision(Operation::RefsSinceTimestamp, &operand))?;
        // Newest first, like `git log`.
        Ok(refs
            .iter()
            .rev()
            .filter(|reference| {
                state
                    .commits
                    .get(*reference)
                    .is_some_and(|commit| commit.timestamp >= timestamp)
            })
            .cloned()
            .collect())
    }

    async fn checkout_ref(&self, reference: &str) -> Result<(), RepositoryError> {
        let resolved = self.tip(reference).map_err(|err| match err {
            RepositoryError::NotFound { detail, .. } => {
                RepositoryError::not_found(Operation::CheckoutRef, reference, detail)
            }
            other => other,
        })?;
        self.state.write().checked_out = Some(resolved);
        Ok(())
    }

    async fn commit_details(&self, reference: &str) -> Result<CommitDetails, RepositoryError> {
        let commit = self.commit(Operation::CommitDetails, reference)?;
        if let Some(details) = commit.details {
            return Ok(details);
        }
        let date = DateTime::from_timestamp(commit.timestamp, 0)
            .map(|date| date.format("%Y-%m-%d %H:%M:%S %z").to_string())
            .unwrap_or_default();
        Ok(CommitDetails {
            commit: self.tip(reference)?,
            author: String::new(),
            author_date: date.clone(),
            committer: String::new(),
            committer_date: date,
            message: String::new(),
        })
    }
}

fn unknown_revision(operation: Operation, operand: &str) -> RepositoryError {
    RepositoryError::not_found(
        operation,
        operand,
        format!("fatal: bad revision '{operand}'"),
    )
}

//! Repository implementation backed by the `git` command-line tool.
//!
//! Every operation is one `git` subprocess run with `-C <dir>`. Failures keep
//! the operation and operand; git's "unknown revision" diagnostics on exit
//! status 128 are reported as [`RepositoryError::NotFound`].

use super::error::{Operation, RepositoryError};
use super::{CommitDetails, Repository, is_symbolic_ref};
use crate::infrastructure::config::GitSettings;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, instrument};

/// Exit status git uses for fatal errors, including unknown revisions.
const GIT_FATAL_EXIT_CODE: i32 = 128;

/// Diagnostics git prints when a ref or object does not exist.
const MISSING_REFERENCE_MARKERS: &[&str] = &[
    "unknown revision",
    "bad revision",
    "bad object",
    "not a valid object name",
    "invalid object name",
];

/// Separator between fields in `commit_details` output.
const FIELD_SEPARATOR: char = '\u{1f}';

/// Configuration for [`GitRepository`].
#[derive(Debug, Clone)]
pub struct GitConfig {
    /// Git executable.
    pub binary: String,
    /// Timeout applied to every git command.
    pub command_timeout: Option<Duration>,
    /// Value for `GIT_SSH_COMMAND`, set when a private key is in use.
    pub ssh_command: Option<String>,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            binary: "git".to_string(),
            command_timeout: None,
            ssh_command: None,
        }
    }
}

impl GitConfig {
    /// Creates a config that runs `git` from `PATH` without a timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a config from process settings.
    #[must_use]
    pub fn from_settings(settings: &GitSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            command_timeout: settings.command_timeout(),
            ssh_command: None,
        }
    }

    /// Sets the git executable.
    #[must_use]
    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    /// Sets the per-command timeout.
    #[must_use]
    pub fn with_command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = Some(timeout);
        self
    }

    /// Sets `GIT_SSH_COMMAND` for every command.
    #[must_use]
    pub fn with_ssh_command(mut self, ssh_command: impl Into<String>) -> Self {
        self.ssh_command = Some(ssh_command.into());
        self
    }
}

/// A working copy driven through the `git` binary.
#[derive(Debug, Clone)]
pub struct GitRepository {
    dir: PathBuf,
    config: GitConfig,
}

impl GitRepository {
    /// Opens an existing working copy.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>, config: GitConfig) -> Self {
        Self {
            dir: dir.into(),
            config,
        }
    }

    /// Clones `url` into `dir` and opens the result.
    ///
    /// # Errors
    ///
    /// Returns an error if git cannot be started or the clone fails.
    #[instrument(skip(config, dir), fields(dir = %dir.display()))]
    pub async fn clone_from(
        url: &str,
        dir: &Path,
        config: GitConfig,
    ) -> Result<Self, RepositoryError> {
        let mut command = base_command(&config);
        command.arg("clone").arg("--").arg(url).arg(dir);
        let output = run(command, &config, Operation::Clone, url).await?;
        ensure_success(&output, Operation::Clone, url)?;
        debug!(url, "Cloned repository");
        Ok(Self::open(dir, config))
    }

    /// Working copy directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn git(
        &self,
        operation: Operation,
        operand: &str,
        args: &[&str],
    ) -> Result<String, RepositoryError> {
        let mut command = base_command(&self.config);
        command.arg("-C").arg(&self.dir).args(args);
        let output = run(command, &self.config, operation, operand).await?;
        ensure_success(&output, operation, operand)?;
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn show(
        &self,
        operation: Operation,
        reference: &str,
        format: &str,
    ) -> Result<String, RepositoryError> {
        reject_option_like(operation, reference)?;
        let format = format!("--format={format}");
        self.git(operation, reference, &["show", "-s", &format, reference, "--"])
            .await
    }
}

#[async_trait]
impl Repository for GitRepository {
    async fn fetch(&self) -> Result<(), RepositoryError> {
        self.git(Operation::Fetch, "origin", &["fetch", "origin"])
            .await
            .map(|_| ())
    }

    async fn remote_branches(&self) -> Result<Vec<String>, RepositoryError> {
        let output = self
            .git(Operation::RemoteBranches, "origin", &["branch", "-r"])
            .await?;
        Ok(parse_remote_branches(&output))
    }

    async fn ref_commit_timestamp(&self, reference: &str) -> Result<i64, RepositoryError> {
        let output = self
            .show(Operation::RefCommitTimestamp, reference, "%ct")
            .await?;
        let value = output.trim();
        value
            .parse()
            .map_err(|_| RepositoryError::InvalidOutput {
                operation: Operation::RefCommitTimestamp,
                operand: reference.to_string(),
                output: value.to_string(),
            })
    }

    async fn latest_ref(&self, branch: &str) -> Result<String, RepositoryError> {
        let output = self.show(Operation::LatestRef, branch, "%H").await?;
        Ok(output.trim().to_string())
    }

    async fn refs_since_timestamp(
        &self,
        branch: &str,
        timestamp: i64,
    ) -> Result<Vec<String>, RepositoryError> {
        let operand = format!("{branch} since {timestamp}");
        reject_option_like(Operation::RefsSinceTimestamp, branch)?;
        // The bound is applied here: `--since` runs through git's date
        // parser, which misreads small epoch values.
        let output = self
            .git(
                Operation::RefsSinceTimestamp,
                &operand,
                &["log", "--format=%H %ct", branch, "--"],
            )
            .await?;
        let mut refs = Vec::new();
        for (reference, committed) in parse_log_lines(&output) {
            let committed = committed.ok_or_else(|| RepositoryError::InvalidOutput {
                operation: Operation::RefsSinceTimestamp,
                operand: operand.clone(),
                output: reference.to_string(),
            })?;
            if committed >= timestamp {
                refs.push(reference.to_string());
            }
        }
        Ok(refs)
    }

    async fn checkout_ref(&self, reference: &str) -> Result<(), RepositoryError> {
        reject_option_like(Operation::CheckoutRef, reference)?;
        self.git(Operation::CheckoutRef, reference, &["checkout", "--quiet", reference])
            .await
            .map(|_| ())
    }

    async fn commit_details(&self, reference: &str) -> Result<CommitDetails, RepositoryError> {
        let output = self
            .show(
                Operation::CommitDetails,
                reference,
                "%H%x1f%an%x1f%ai%x1f%cn%x1f%ci%x1f%B",
            )
            .await?;
        parse_commit_details(&output).ok_or_else(|| RepositoryError::InvalidOutput {
            operation: Operation::CommitDetails,
            operand: reference.to_string(),
            output: output.trim().to_string(),
        })
    }
}

fn base_command(config: &GitConfig) -> Command {
    let mut command = Command::new(&config.binary);
    command
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(ssh_command) = &config.ssh_command {
        command.env("GIT_SSH_COMMAND", ssh_command);
    }
    command
}

async fn run(
    mut command: Command,
    config: &GitConfig,
    operation: Operation,
    operand: &str,
) -> Result<Output, RepositoryError> {
    debug!(%operation, operand, "Running git");
    let spawn_error = |source| RepositoryError::Spawn {
        operation,
        operand: operand.to_string(),
        program: config.binary.clone(),
        source,
    };
    match config.command_timeout {
        Some(limit) => tokio::time::timeout(limit, command.output())
            .await
            .map_err(|_| RepositoryError::Timeout {
                operation,
                operand: operand.to_string(),
                seconds: limit.as_secs(),
            })?
            .map_err(spawn_error),
        None => command.output().await.map_err(spawn_error),
    }
}

fn ensure_success(
    output: &Output,
    operation: Operation,
    operand: &str,
) -> Result<(), RepositoryError> {
    if output.status.success() {
        return Ok(());
    }
    let stderr = one_line(&String::from_utf8_lossy(&output.stderr));
    if is_missing_reference(output.status.code(), &stderr) {
        return Err(RepositoryError::not_found(operation, operand, stderr));
    }
    Err(RepositoryError::CommandFailed {
        operation,
        operand: operand.to_string(),
        status: output.status.to_string(),
        stderr,
    })
}

fn reject_option_like(operation: Operation, operand: &str) -> Result<(), RepositoryError> {
    if operand.starts_with('-') {
        return Err(RepositoryError::not_found(
            operation,
            operand,
            "refusing to pass an option-like ref to git",
        ));
    }
    Ok(())
}

pub(crate) fn is_missing_reference(code: Option<i32>, stderr: &str) -> bool {
    if code != Some(GIT_FATAL_EXIT_CODE) {
        return false;
    }
    let stderr = stderr.to_ascii_lowercase();
    MISSING_REFERENCE_MARKERS
        .iter()
        .any(|marker| stderr.contains(marker))
}

pub(crate) fn parse_remote_branches(output: &str) -> Vec<String> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !is_symbolic_ref(line))
        .map(str::to_string)
        .collect()
}

/// Splits `%H %ct` log lines into hashes and commit times.
pub(crate) fn parse_log_lines(output: &str) -> impl Iterator<Item = (&str, Option<i64>)> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once(' ') {
            Some((hash, time)) => (hash, time.trim().parse().ok()),
            None => (line, None),
        })
}

pub(crate) fn parse_commit_details(output: &str) -> Option<CommitDetails> {
    let mut fields = output.splitn(6, FIELD_SEPARATOR);
    let commit = fields.next()?.trim().to_string();
    let author = fields.next()?.to_string();
    let author_date = fields.next()?.to_string();
    let committer = fields.next()?.to_string();
    let committer_date = fields.next()?.to_string();
    let message = fields.next()?.trim_end().to_string();
    if commit.is_empty() {
        return None;
    }
    Some(CommitDetails {
        commit,
        author,
        author_date,
        committer,
        committer_date,
        message,
    })
}

fn one_line(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_remote_branches_drops_symbolic_head() {
        let output = "  origin/HEAD -> origin/master\n  origin/feature-9999\n  origin/feature-1234\n\n";
        assert_eq!(
            parse_remote_branches(output),
            vec!["origin/feature-9999", "origin/feature-1234"]
        );
    }

    #[test]
    fn test_missing_reference_requires_fatal_exit_code() {
        let stderr = "fatal: ambiguous argument 'deadbeef': unknown revision or path not in the working tree.";
        assert!(is_missing_reference(Some(128), stderr));
        assert!(!is_missing_reference(Some(1), stderr));
        assert!(!is_missing_reference(None, stderr));
    }

    #[test]
    fn test_transport_failure_is_not_missing_reference() {
        let stderr = "fatal: Could not read from remote repository.";
        assert!(!is_missing_reference(Some(128), stderr));
        assert!(is_missing_reference(Some(128), "fatal: bad object a1b2c3"));
    }

    #[test]
    fn test_parse_commit_details() {
        let output = "42f8090\u{1f}Ada Lovelace\u{1f}2015-06-08 23:00:00 -0700\u{1f}Ada Lovelace\u{1f}2015-06-08 23:00:00 -0700\u{1f}Update\n\n";
        let details = parse_commit_details(output);
        assert_eq!(
            details,
            Some(CommitDetails {
                commit: "42f8090".to_string(),
                author: "Ada Lovelace".to_string(),
                author_date: "2015-06-08 23:00:00 -0700".to_string(),
                committer: "Ada Lovelace".to_string(),
                committer_date: "2015-06-08 23:00:00 -0700".to_string(),
                message: "Update".to_string(),
            })
        );
        assert_eq!(parse_commit_details("42f8090\u{1f}only"), None);
    }

    #[test]
    fn test_parse_log_lines() {
        let output = "9b1f 1433829600\n\na0c2 5000\nbroken\n";
        let lines: Vec<(&str, Option<i64>)> = parse_log_lines(output).collect();
        assert_eq!(
            lines,
            vec![
                ("9b1f", Some(1_433_829_600)),
                ("a0c2", Some(5000)),
                ("broken", None)
            ]
        );
    }

    #[test]
    fn test_one_line_folds_stderr() {
        assert_eq!(
            one_line("fatal: first\n\n  second line \n"),
            "fatal: first; second line"
        );
    }

    #[test]
    fn test_git_config_builders() {
        let config = GitConfig::new()
            .with_binary("/usr/bin/git")
            .with_command_timeout(Duration::from_secs(5))
            .with_ssh_command("ssh -i key");
        assert_eq!(config.binary, "/usr/bin/git");
        assert_eq!(config.command_timeout, Some(Duration::from_secs(5)));
        assert_eq!(config.ssh_command.as_deref(), Some("ssh -i key"));
    }
}

//! Shared test utilities for end-to-end tests.
//!
//! Provides a local git origin built with the git CLI and a mock tracker
//! server, wired together into resource requests.

#![allow(dead_code, missing_docs)]

use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tracker_git_branch_resource::infrastructure::config::Settings;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PROJECT_ID: u64 = 123_456;
pub const TOKEN: &str = "trackerToken";

/// Returns `true` if a usable `git` binary is on `PATH`.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Runs git in `dir` with a fixed identity and dates taken from `timestamp`.
pub fn git_at(dir: &Path, timestamp: i64, args: &[&str]) -> Result<String> {
    let date = format!("@{timestamp} +0000");
    let output = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["-c", "commit.gpgsign=false", "-c", "init.defaultBranch=master"])
        .args(args)
        .env("GIT_AUTHOR_NAME", "Ada Lovelace")
        .env("GIT_AUTHOR_EMAIL", "ada@example.com")
        .env("GIT_COMMITTER_NAME", "Grace Hopper")
        .env("GIT_COMMITTER_EMAIL", "grace@example.com")
        .env("GIT_AUTHOR_DATE", &date)
        .env("GIT_COMMITTER_DATE", &date)
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .output()
        .with_context(|| format!("running git {args:?}"))?;
    if !output.status.success() {
        bail!(
            "git {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// A local repository that plays the remote.
pub struct Origin {
    dir: TempDir,
}

impl Origin {
    /// Creates a repository with one commit on `master`.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new()?;
        git_at(dir.path(), 0, &["init", "--quiet"])?;
        git_at(dir.path(), 0, &["symbolic-ref", "HEAD", "refs/heads/master"])?;
        let origin = Self { dir };
        origin.commit("master", "Initial commit", 1_433_600_000)?;
        Ok(origin)
    }

    /// Location of the repository, usable as a clone URL.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Clone URL as a string.
    pub fn url(&self) -> String {
        self.path().display().to_string()
    }

    /// Commits on `branch` at `timestamp` and returns the commit hash.
    ///
    /// Missing branches are started from `master`.
    pub fn commit(&self, branch: &str, message: &str, timestamp: i64) -> Result<String> {
        let dir = self.path();
        let has_branch = |name: &str| {
            git_at(
                dir,
                0,
                &["rev-parse", "--verify", "--quiet", &format!("refs/heads/{name}")],
            )
            .is_ok()
        };
        if has_branch(branch) {
            git_at(dir, 0, &["checkout", "--quiet", branch])?;
        } else if has_branch("master") {
            git_at(dir, 0, &["checkout", "--quiet", "-b", branch, "master"])?;
        }
        git_at(
            dir,
            timestamp,
            &["commit", "--quiet", "--allow-empty", "-m", message],
        )?;
        self.head()
    }

    /// Hash of the checked-out commit.
    pub fn head(&self) -> Result<String> {
        git_at(self.path(), 0, &["rev-parse", "HEAD"])
    }

    /// Deletes `branch`, switching to `master` first.
    pub fn delete_branch(&self, branch: &str) -> Result<()> {
        git_at(self.path(), 0, &["checkout", "--quiet", "master"])?;
        git_at(self.path(), 0, &["branch", "--quiet", "-D", branch])?;
        Ok(())
    }
}

/// Integration test context: a git origin and a mock tracker.
pub struct TestEnv {
    /// Origin repository
    pub origin: Origin,
    /// Scratch space for `in` targets
    pub scratch: TempDir,
    /// Mock tracker API
    pub tracker: MockServer,
    /// Process settings
    pub settings: Settings,
}

impl TestEnv {
    /// Creates an origin with one commit on `master` and an empty tracker.
    pub async fn new() -> Result<Self> {
        let settings = Settings::builder()?
            .set_override("git.command_timeout_secs", 60)?
            .build()?
            .try_deserialize()?;
        Ok(Self {
            origin: Origin::new()?,
            scratch: TempDir::new()?,
            tracker: MockServer::start().await,
            settings,
        })
    }

    /// Commits on `branch` of the origin and returns the commit hash.
    pub fn commit(&self, branch: &str, message: &str, timestamp: i64) -> Result<String> {
        self.origin.commit(branch, message, timestamp)
    }

    /// Serves `ids` as the stories in `state`.
    pub async fn mount_stories(&self, state: &str, ids: &[u64]) {
        let body: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| serde_json::json!({"kind": "story", "id": id, "current_state": state}))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/services/v5/projects/{PROJECT_ID}/stories")))
            .and(header("X-TrackerToken", TOKEN))
            .and(query_param("with_state", state))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.tracker)
            .await;
    }

    /// Resource `source` pointing at the origin and the mock tracker.
    pub fn source(&self) -> serde_json::Value {
        serde_json::json!({
            "token": TOKEN,
            "project_id": PROJECT_ID.to_string(),
            "tracker_url": self.tracker.uri(),
            "repo": self.origin.url(),
        })
    }
}

//! Git subprocess configuration for the resource process.

use serde::Deserialize;
use std::time::Duration;

/// Git subprocess settings.
#[derive(Debug, Deserialize, Clone)]
pub struct GitSettings {
    /// Git executable.
    pub binary: String,
    /// Command prefix for `GIT_SSH_COMMAND` when a private key is configured.
    pub ssh_command: String,
    /// Per-command timeout in seconds, `0` for none.
    pub command_timeout_secs: u64,
}

impl GitSettings {
    /// Per-command timeout, if any.
    #[must_use]
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }
}

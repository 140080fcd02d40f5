//! Configuration management for the resource process.
//!
//! Process settings are loaded once at startup from defaults and
//! environment variables and then passed explicitly to the commands.
//! Per-pipeline values (token, project, repository) come from the request's
//! `source` object instead.
//!
//! # Example
//!
//! ```
//! use tracker_git_branch_resource::infrastructure::config::Settings;
//!
//! let settings = Settings::new().expect("Failed to load configuration");
//! assert!(!settings.git.binary.is_empty());
//! ```

pub mod git;
pub mod telemetry;
pub mod tracker;

pub use git::GitSettings;
pub use telemetry::TelemetrySettings;
pub use tracker::TrackerSettings;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment};
use serde::Deserialize;

/// Prefix of the environment variables read by [`Settings::new`].
pub const ENV_PREFIX: &str = "TRACKER_GIT_BRANCH";

/// Top-level configuration for the resource process.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    /// Tracker settings.
    pub tracker: TrackerSettings,
    /// Git settings.
    pub git: GitSettings,
    /// Telemetry settings.
    pub telemetry: TelemetrySettings,
}

impl Settings {
    /// Creates a new settings instance from environment variables and defaults.
    ///
    /// Variables use [`ENV_PREFIX`] and `__` as separator, e.g.
    /// `TRACKER_GIT_BRANCH__GIT__COMMAND_TIMEOUT_SECS=60`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be built or deserialized.
    pub fn new() -> Result<Self, ConfigError> {
        Self::builder()?
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// Returns a builder pre-loaded with the default values.
    ///
    /// # Errors
    ///
    /// Returns an error if a default cannot be set.
    pub fn builder() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("tracker.default_url", tracker::DEFAULT_TRACKER_URL)?
            .set_default("tracker.request_timeout_secs", 30)?
            .set_default("git.binary", "git")?
            .set_default("git.ssh_command", "ssh")?
            .set_default("git.command_timeout_secs", 300)?
            .set_default("telemetry.log_level", "warn")?
            .set_default("telemetry.json", true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_defaults() -> anyhow::Result<()> {
        let settings: Settings = Settings::builder()?.build()?.try_deserialize()?;
        assert_eq!(settings.tracker.default_url, "https://www.pivotaltracker.com");
        assert_eq!(
            settings.tracker.request_timeout(),
            Some(Duration::from_secs(30))
        );
        assert_eq!(settings.git.binary, "git");
        assert_eq!(settings.git.ssh_command, "ssh");
        assert_eq!(
            settings.git.command_timeout(),
            Some(Duration::from_secs(300))
        );
        assert_eq!(settings.telemetry.log_level, "warn");
        assert!(settings.telemetry.json);
        Ok(())
    }

    #[test]
    fn test_overrides() -> anyhow::Result<()> {
        let settings: Settings = Settings::builder()?
            .set_override("tracker.default_url", "http://tracker.internal")?
            .set_override("git.command_timeout_secs", 0)?
            .set_override("telemetry.json", false)?
            .build()?
            .try_deserialize()?;
        assert_eq!(settings.tracker.default_url, "http://tracker.internal");
        assert_eq!(settings.git.command_timeout(), None);
        assert!(!settings.telemetry.json);
        Ok(())
    }
}

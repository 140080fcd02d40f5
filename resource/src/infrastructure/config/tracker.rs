//! Tracker configuration for the resource process.

use serde::Deserialize;
use std::time::Duration;

/// Base URL used when a request does not name a tracker.
pub const DEFAULT_TRACKER_URL: &str = "https://www.pivotaltracker.com";

/// Tracker client settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TrackerSettings {
    /// Base URL used when `source.tracker_url` is absent.
    pub default_url: String,
    /// HTTP request timeout in seconds, `0` for none.
    pub request_timeout_secs: u64,
}

impl TrackerSettings {
    /// Request timeout, if any.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

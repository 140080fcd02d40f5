//! Telemetry configuration for the resource process.

use serde::Deserialize;

/// Logging settings.
#[derive(Debug, Deserialize, Clone)]
pub struct TelemetrySettings {
    /// Default filter when `RUST_LOG` is not set.
    pub log_level: String,
    /// Emit JSON lines instead of compact text.
    #[serde(default = "default_json")]
    pub json: bool,
}

pub(super) fn default_json() -> bool {
    true
}

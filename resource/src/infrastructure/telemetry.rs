use crate::infrastructure::config::TelemetrySettings;
use anyhow::{Context, Result};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

/// Builder for setting up logging.
///
/// Logs always go to standard error: standard output carries the JSON
/// response of the command.
pub struct TelemetryBuilder {
    log_level: String,
    json: bool,
}

impl Default for TelemetryBuilder {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: true,
        }
    }
}

impl TelemetryBuilder {
    /// Creates a builder with `warn` level JSON output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder from process settings.
    #[must_use]
    pub fn from_settings(settings: &TelemetrySettings) -> Self {
        Self::new()
            .with_log_level(settings.log_level.clone())
            .with_json(settings.json)
    }

    /// Sets the filter used when `RUST_LOG` is unset.
    #[must_use]
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Chooses JSON or compact text lines.
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    /// Initializes the global subscriber. `RUST_LOG` overrides the level.
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed.
    pub fn init(self) -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.log_level));

        let fmt_layer = if self.json {
            fmt::layer()
                .json()
                .with_writer(std::io::stderr)
                .boxed()
        } else {
            fmt::layer()
                .compact()
                .with_writer(std::io::stderr)
                .boxed()
        };

        Registry::default()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to init subscriber")
    }
}

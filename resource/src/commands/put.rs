//! The `out` command: record when it ran.
//!
//! Nothing is pushed anywhere; the response only carries the current time.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Request read by `out`. Its contents are accepted but unused.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PutRequest {
    /// Resource configuration.
    #[serde(default)]
    pub source: serde_json::Value,
    /// Step parameters.
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Version emitted by `out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutVersion {
    /// When `out` ran.
    pub time: DateTime<Utc>,
}

/// Response written by `out`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PutResponse {
    /// Recorded version.
    pub version: PutVersion,
}

/// Runs `out` at time `now`.
#[must_use]
pub fn run(sources_dir: &Path, now: DateTime<Utc>) -> PutResponse {
    debug!(sources_dir = %sources_dir.display(), "Recording out time");
    PutResponse {
        version: PutVersion { time: now },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_out_emits_rfc3339_time() -> anyhow::Result<()> {
        let now = Utc
            .with_ymd_and_hms(2015, 6, 9, 6, 0, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid date"))?;
        let response = run(Path::new("/tmp/sources"), now);
        assert_eq!(
            serde_json::to_value(&response)?,
            serde_json::json!({"version": {"time": "2015-06-09T06:00:00Z"}})
        );
        Ok(())
    }

    #[test]
    fn test_out_request_ignores_params() -> anyhow::Result<()> {
        let request: PutRequest = serde_json::from_str(r#"{"params": {"anything": 1}}"#)?;
        assert!(request.source.is_null());
        Ok(())
    }
}

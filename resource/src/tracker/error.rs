//! Error types for tracker requests.

/// Errors that can occur while talking to the tracker.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TrackerError {
    /// The client could not be configured or a URL could not be built.
    #[error("Tracker configuration error: {0}")]
    Config(String),
    /// The request could not be sent or the connection failed.
    #[error("GET {endpoint} failed: {message}")]
    Network {
        /// Requested URL.
        endpoint: String,
        /// Transport error.
        message: String,
    },
    /// The tracker answered with a non-success status.
    #[error("GET {endpoint} returned HTTP {status}: {body}")]
    Status {
        /// Requested URL.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// The response body was not the expected JSON.
    #[error("Could not decode response from {endpoint}: {message}")]
    Decode {
        /// Requested URL.
        endpoint: String,
        /// Decoder error.
        message: String,
    },
}

impl TrackerError {
    /// Returns the endpoint involved, if any.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Config(_) => None,
            Self::Network { endpoint, .. }
            | Self::Status { endpoint, .. }
            | Self::Decode { endpoint, .. } => Some(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TrackerError::Status {
            endpoint: "http://localhost/services/v5/projects/1/stories".to_string(),
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "GET http://localhost/services/v5/projects/1/stories returned HTTP 403: forbidden"
        );
        assert_eq!(
            err.endpoint(),
            Some("http://localhost/services/v5/projects/1/stories")
        );
        assert_eq!(TrackerError::Config("bad".to_string()).endpoint(), None);
    }
}

//! Tracker v5 REST API client.
//!
//! Only two read-only endpoints are used: the project's stories filtered by
//! state, and a story's activity feed. Dates are requested as epoch
//! milliseconds.

use crate::tracker::StoryTracker;
use crate::tracker::error::TrackerError;
use crate::tracker::types::{Activity, Story, StoryState};
use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

/// Header carrying the API token.
pub const TOKEN_HEADER: &str = "X-TrackerToken";

/// Configuration for the tracker client.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// API token.
    pub token: SecretString,
    /// Base URL, e.g. `https://www.pivotaltracker.com`.
    pub base_url: Url,
    /// Project whose stories are queried.
    pub project_id: u64,
    /// Timeout for each request.
    pub request_timeout: Option<Duration>,
}

impl TrackerConfig {
    /// Creates a config without a request timeout.
    #[must_use]
    pub fn new(token: SecretString, base_url: Url, project_id: u64) -> Self {
        Self {
            token,
            base_url,
            project_id,
            request_timeout: None,
        }
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }
}

/// HTTP client for one tracker project.
pub struct TrackerClient {
    client: Client,
    config: TrackerConfig,
}

impl TrackerClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TrackerError::Config`] if the HTTP client cannot be built.
    pub fn new(config: TrackerConfig) -> Result<Self, TrackerError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| TrackerError::Config(format!("Could not build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }

    /// Builds `<base>/services/v5/projects/<id>/<segments...>?date_format=millis`.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, TrackerError> {
        let mut url = self.config.base_url.clone();
        let project_id = self.config.project_id.to_string();
        url.path_segments_mut()
            .map_err(|()| {
                TrackerError::Config(format!(
                    "Tracker URL {} cannot be a base",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["services", "v5", "projects", project_id.as_str()])
            .extend(segments);
        url.query_pairs_mut().append_pair("date_format", "millis");
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, TrackerError> {
        let endpoint = url.to_string();
        debug!(%endpoint, "Requesting tracker");
        let res = self
            .client
            .get(url)
            .header(TOKEN_HEADER, self.config.token.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| TrackerError::Network {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(TrackerError::Status {
                endpoint,
                status: status.as_u16(),
                body: body.trim().to_string(),
            });
        }

        let body = res.bytes().await.map_err(|e| TrackerError::Network {
            endpoint: endpoint.clone(),
            message: e.to_string(),
        })?;
        serde_json::from_slice(&body).map_err(|e| TrackerError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl StoryTracker for TrackerClient {
    #[instrument(skip(self), fields(project_id = self.config.project_id))]
    async fn stories(&self, state: StoryState) -> Result<Vec<Story>, TrackerError> {
        let mut url = self.endpoint(&["stories"])?;
        url.query_pairs_mut().append_pair("with_state", state.as_str());
        let stories: Vec<Story> = self.get_json(url).await?;
        debug!(count = stories.len(), "Fetched stories");
        Ok(stories)
    }

    #[instrument(skip(self), fields(project_id = self.config.project_id))]
    async fn story_activity(
        &self,
        story_id: &str,
        occurred_after: Option<i64>,
    ) -> Result<Vec<Activity>, TrackerError> {
        let mut url = self.endpoint(&["stories", story_id, "activity"])?;
        if let Some(after) = occurred_after {
            url.query_pairs_mut()
                .append_pair("occurred_after", &after.to_string());
        }
        self.get_json(url).await
    }
}

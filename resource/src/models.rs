//! Protocol types shared by the `check`, `in` and `out` commands.
//!
//! Story ids are strings and timestamps are epoch seconds everywhere in the
//! crate. On input both are accepted as JSON strings or integers, because CI
//! systems commonly echo versions back as string maps.

use crate::error::ResourceError;
use crate::infrastructure::config::TrackerSettings;
use reqwest::Url;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// A single reportable unit of work: one commit on one story branch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Version {
    /// Id of the story whose branch holds the commit. Empty means "no prior
    /// version".
    #[serde(default, deserialize_with = "lenient::story_id")]
    pub story_id: String,
    /// Commit identifier.
    #[serde(rename = "ref", default)]
    pub reference: String,
    /// Commit time in seconds since the Unix epoch.
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub timestamp: i64,
}

impl Version {
    /// Creates a version.
    #[must_use]
    pub fn new(story_id: impl Into<String>, reference: impl Into<String>, timestamp: i64) -> Self {
        Self {
            story_id: story_id.into(),
            reference: reference.into(),
            timestamp,
        }
    }

    /// Returns `true` when this is the "nothing reported yet" marker.
    #[must_use]
    pub fn is_initial(&self) -> bool {
        self.story_id.is_empty()
    }
}

/// A name/value pair shown next to a fetched version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataPair {
    /// Metadata key.
    pub name: String,
    /// Metadata value.
    pub value: String,
}

impl MetadataPair {
    /// Creates a metadata pair.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Resource configuration from the pipeline definition.
#[derive(Debug, Clone, Deserialize)]
pub struct Source {
    /// Tracker API token.
    pub token: SecretString,
    /// Tracker project id.
    #[serde(deserialize_with = "lenient::story_id")]
    pub project_id: String,
    /// Tracker base URL; the process default is used when absent.
    #[serde(default)]
    pub tracker_url: Option<String>,
    /// Git repository to clone.
    pub repo: String,
    /// SSH private key used for clone and fetch.
    #[serde(default)]
    pub private_key: Option<SecretString>,
}

impl Source {
    /// Parses the tracker project id.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Config`] if the id is not a positive integer.
    pub fn project_id(&self) -> Result<u64, ResourceError> {
        self.project_id
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| {
                ResourceError::Config(format!(
                    "Invalid Tracker project ID {:?}",
                    self.project_id
                ))
            })
    }

    /// Resolves the tracker base URL, falling back to the configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Config`] if the URL cannot be parsed.
    pub fn tracker_url(&self, settings: &TrackerSettings) -> Result<Url, ResourceError> {
        let raw = self
            .tracker_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&settings.default_url);
        Url::parse(raw)
            .map_err(|e| ResourceError::Config(format!("Invalid tracker URL {raw:?}: {e}")))
    }

    /// Checks that a repository is configured.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Config`] if `repo` is blank.
    pub fn repo(&self) -> Result<&str, ResourceError> {
        let repo = self.repo.trim();
        if repo.is_empty() {
            return Err(ResourceError::Config("repo must not be empty".to_string()));
        }
        Ok(repo)
    }
}

pub(crate) mod lenient {
    //! Deserializers that accept either a JSON string or a JSON integer.

    use serde::{Deserialize, Deserializer, de::Error};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrInt {
        Int(i64),
        Str(String),
    }

    pub fn story_id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match Option::<StringOrInt>::deserialize(deserializer)? {
            Some(StringOrInt::Int(id)) => id.to_string(),
            Some(StringOrInt::Str(id)) => id,
            None => String::new(),
        })
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<i64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<StringOrInt>::deserialize(deserializer)? {
            Some(StringOrInt::Int(ts)) => Ok(ts),
            Some(StringOrInt::Str(ts)) if ts.trim().is_empty() => Ok(0),
            Some(StringOrInt::Str(ts)) => ts
                .trim()
                .parse()
                .map_err(|e| D::Error::custom(format!("invalid timestamp {ts:?}: {e}"))),
            None => Ok(0),
        }
    }
}

//! Entry points for the `check`, `in` and `out` commands.
//!
//! Each command reads one JSON request, does its work and produces one JSON
//! response. Reading and writing are kept here so the binary only wires
//! standard streams to them.

pub mod check;
pub mod get;
pub mod put;

use crate::error::ResourceError;
use crate::infrastructure::config::Settings;
use crate::infrastructure::keyfile::KeyFile;
use crate::models::Source;
use crate::repository::GitConfig;
use crate::tracker::{TrackerClient, TrackerConfig};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io::{Read, Write};

/// Decodes a request from `reader`.
///
/// # Errors
///
/// Returns [`ResourceError::Decode`] if the input is not a valid request.
pub fn read_request<T: DeserializeOwned>(reader: impl Read) -> Result<T, ResourceError> {
    serde_json::from_reader(reader).map_err(ResourceError::Decode)
}

/// Encodes `response` to `writer` followed by a newline.
///
/// # Errors
///
/// Returns [`ResourceError::Encode`] if the response cannot be serialized and
/// [`ResourceError::Io`] if it cannot be written.
pub fn write_response<T: Serialize>(mut writer: impl Write, response: &T) -> Result<(), ResourceError> {
    serde_json::to_writer(&mut writer, response).map_err(ResourceError::Encode)?;
    writer
        .write_all(b"\n")
        .and_then(|()| writer.flush())
        .map_err(|e| ResourceError::io("Could not write response to", "standard output", e))
}

/// Git settings for one run, plus the key file they point at.
///
/// The key file is removed when this value is dropped, so it must outlive
/// every git command of the run.
#[derive(Debug)]
pub struct GitAccess {
    /// Config to pass to the repository.
    pub config: GitConfig,
    key_file: Option<KeyFile>,
}

impl GitAccess {
    /// Prepares git access for `source`, writing its private key if any.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Io`] if the key file cannot be written.
    pub fn prepare(source: &Source, settings: &Settings) -> Result<Self, ResourceError> {
        let mut config = GitConfig::from_settings(&settings.git);
        let key_file = match &source.private_key {
            Some(key) => {
                let key_file = KeyFile::create(key).map_err(|e| {
                    ResourceError::io("Could not write private key to", std::env::temp_dir(), e)
                })?;
                config = config.with_ssh_command(key_file.ssh_command(&settings.git.ssh_command));
                Some(key_file)
            }
            None => None,
        };
        Ok(Self { config, key_file })
    }

    /// Returns `true` if a private key was provisioned.
    #[must_use]
    pub fn has_key(&self) -> bool {
        self.key_file.is_some()
    }
}

/// Builds the tracker client for `source`.
///
/// # Errors
///
/// Returns [`ResourceError::Config`] if the project id or tracker URL is invalid.
pub fn tracker_client(source: &Source, settings: &Settings) -> Result<TrackerClient, ResourceError> {
    let mut config = TrackerConfig::new(
        source.token.clone(),
        source.tracker_url(&settings.tracker)?,
        source.project_id()?,
    );
    if let Some(timeout) = settings.tracker.request_timeout() {
        config = config.with_request_timeout(timeout);
    }
    Ok(TrackerClient::new(config)?)
}

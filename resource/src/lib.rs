//! Tracker Git Branch Resource - finds new work on tracker story branches.
//!
//! This crate implements a CI resource that bridges a project tracker and a
//! git repository. Stories in the `finished` and `delivered` states are
//! matched against remote branches whose names contain the story id, and
//! every new commit on those branches is reported as a [`Version`].

#![warn(clippy::pedantic)]

/// Command-line parsing and dispatch.
pub mod cli;
/// `check`, `in` and `out` command orchestration.
pub mod commands;
/// Error types surfaced by the commands.
pub mod error;
/// Infrastructure components (config, telemetry, key files).
pub mod infrastructure;
/// Request, response and version types of the resource protocol.
pub mod models;
/// Repository capability and its git and in-memory implementations.
pub mod repository;
/// Version resolution over story branches.
pub mod resolver;
/// Tracker capability and its HTTP client.
pub mod tracker;

pub use error::ResourceError;
pub use models::{MetadataPair, Source, Version};
pub use repository::{GitConfig, GitRepository, InMemoryRepository, Repository, RepositoryError};
pub use resolver::VersionResolver;
pub use tracker::{Story, StoryState, StoryTracker, TrackerClient, TrackerConfig, TrackerError};

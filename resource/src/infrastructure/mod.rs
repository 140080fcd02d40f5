/// Configuration management for the resource process.
pub mod config;
/// Temporary SSH key files for git.
pub mod keyfile;
/// Telemetry setup for logging.
pub mod telemetry;

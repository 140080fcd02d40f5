//! Command-line surface of the resource binary.
//!
//! The binary is usually installed once and linked as `check`, `in` and
//! `out`; when invoked through such a link the subcommand comes from the
//! program name.

use crate::commands::{self, check, get, put};
use crate::error::ResourceError;
use crate::infrastructure::config::Settings;
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsString;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Tracker story-branch resource.
#[derive(Debug, Parser)]
#[command(name = "tracker-git-branch-resource", version, about)]
pub struct Cli {
    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Resource commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Report new versions on story branches.
    Check,
    /// Fetch a version into a directory.
    In {
        /// Directory to clone into.
        target_dir: PathBuf,
    },
    /// Record an output time.
    Out {
        /// Directory holding the build's sources.
        sources_dir: PathBuf,
    },
}

const APPLETS: [&str; 3] = ["check", "in", "out"];

/// Parses arguments, taking the subcommand from the program name when it is
/// one of `check`, `in` or `out`.
#[must_use]
pub fn parse_from<I, T>(args: I) -> Cli
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let raw: Vec<OsString> = args.into_iter().map(Into::into).collect();
    Cli::parse_from(normalize_args(raw))
}

fn normalize_args(mut raw: Vec<OsString>) -> Vec<OsString> {
    let Some(program) = raw.first() else {
        return raw;
    };
    let applet = Path::new(program)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| APPLETS.contains(name))
        .map(OsString::from);
    if let Some(applet) = applet {
        raw.insert(1, applet);
    }
    raw
}

/// Runs `command`, reading its request from `input` and writing the response
/// to `output`.
///
/// # Errors
///
/// Returns the failure of the command, or of decoding and encoding.
pub async fn execute(
    command: Command,
    settings: &Settings,
    input: impl Read,
    output: impl Write,
) -> Result<(), ResourceError> {
    match command {
        Command::Check => {
            let request: check::CheckRequest = commands::read_request(input)?;
            let versions = check::run(request, settings).await?;
            commands::write_response(output, &versions)
        }
        Command::In { target_dir } => {
            let request: get::GetRequest = commands::read_request(input)?;
            let response = get::run(request, &target_dir, settings).await?;
            commands::write_response(output, &response)
        }
        Command::Out { sources_dir } => {
            let _request: put::PutRequest = commands::read_request(input)?;
            let response = put::run(&sources_dir, Utc::now());
            commands::write_response(output, &response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<OsString> {
        list.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_subcommand_from_program_name() {
        let cli = parse_from(args(&["/opt/resource/check"]));
        assert!(matches!(cli.command, Command::Check));

        let cli = parse_from(args(&["/opt/resource/in", "/tmp/build/get"]));
        assert!(
            matches!(cli.command, Command::In { ref target_dir } if target_dir == Path::new("/tmp/build/get"))
        );
    }

    #[test]
    fn test_explicit_subcommand() {
        let cli = parse_from(args(&["tracker-git-branch-resource", "out", "/tmp/src"]));
        assert!(
            matches!(cli.command, Command::Out { ref sources_dir } if sources_dir == Path::new("/tmp/src"))
        );
    }

    #[test]
    fn test_missing_directory_is_rejected() {
        let result = Cli::try_parse_from(normalize_args(args(&["/opt/resource/in"])));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_execute_out() -> anyhow::Result<()> {
        let settings = Settings::builder()?.build()?.try_deserialize::<Settings>()?;
        let mut output = Vec::new();
        execute(
            Command::Out {
                sources_dir: PathBuf::from("/tmp/src"),
            },
            &settings,
            r#"{"source": {}, "params": {}}"#.as_bytes(),
            &mut output,
        )
        .await?;
        let response: serde_json::Value = serde_json::from_slice(&output)?;
        assert!(response["version"]["time"].is_string());
        Ok(())
    }

    #[tokio::test]
    async fn test_execute_check_rejects_bad_input() -> anyhow::Result<()> {
        let settings = Settings::builder()?.build()?.try_deserialize::<Settings>()?;
        let err = execute(Command::Check, &settings, "[]".as_bytes(), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ResourceError::Decode(_)));
        Ok(())
    }
}

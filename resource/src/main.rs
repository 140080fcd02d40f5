//! `check`, `in` and `out` entry point for the tracker git branch resource.

use std::process::ExitCode;
use tracker_git_branch_resource::ResourceError;
use tracker_git_branch_resource::cli::{self, Cli};
use tracker_git_branch_resource::infrastructure::{config::Settings, telemetry::TelemetryBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = cli::parse_from(std::env::args_os());
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::new().map_err(ResourceError::from)?;
    TelemetryBuilder::from_settings(&settings.telemetry).init()?;

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    cli::execute(cli.command, &settings, stdin.lock(), stdout.lock()).await?;
    Ok(())
}

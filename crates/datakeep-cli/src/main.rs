//! Datakeep - tiered artifact storage with calendar-day retention.

use clap::Parser;
use datakeep_cli::commands;
use datakeep_cli::{Cli, Command, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> datakeep_cli::Result<()> {
    // Logs go to stderr so `get` can stream artifact bytes on stdout
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Settings come from the environment, matching service deployments
    let settings = Settings::from_env()?;

    match cli.command {
        Command::Run => commands::execute_run(settings).await?,
        Command::Archive => commands::execute_archive(settings).await?,
        Command::Status(args) => commands::execute_status(args, settings).await?,
        Command::Get(args) => commands::execute_get(args, settings).await?,
        Command::Ls(args) => commands::execute_ls(args, settings).await?,
        Command::Dates(args) => commands::execute_dates(args, settings).await?,
    }

    Ok(())
}

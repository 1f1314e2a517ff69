//! Command definitions and argument parsing

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Datakeep - tiered artifact storage with scheduled archival
#[derive(Debug, Parser)]
#[command(name = "datakeep")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the collection and archival service until interrupted
    Run,

    /// Run one archive cycle now and print its report
    Archive,

    /// Show tier usage and archival state
    Status(StatusArgs),

    /// Fetch one artifact and write its bytes to stdout
    Get(GetArgs),

    /// List artifacts for a collector
    Ls(LsArgs),

    /// List partition dates known for a collector, newest first
    Dates(DatesArgs),
}

/// Arguments for the status command
#[derive(Debug, Parser)]
pub struct StatusArgs {
    /// Emit machine-readable JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the get command
#[derive(Debug, Parser)]
pub struct GetArgs {
    /// Collector name
    pub collector: String,

    /// Relative key, e.g. 2025/12/19/prices_0300.json; omitted means the
    /// most recent payload
    pub key: Option<String>,
}

/// Arguments for the ls command
#[derive(Debug, Parser)]
pub struct LsArgs {
    /// Collector name
    pub collector: String,

    /// Partition date to list, YYYY-MM-DD; archived partitions are read
    /// from the remote tier
    #[arg(short, long)]
    pub date: Option<NaiveDate>,
}

/// Arguments for the dates command
#[derive(Debug, Parser)]
pub struct DatesArgs {
    /// Collector name
    pub collector: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_command_parses() {
        let cli = Cli::parse_from(["datakeep", "run"]);
        assert!(matches!(cli.command, Command::Run));
    }

    #[test]
    fn test_status_json_flag() {
        let cli = Cli::parse_from(["datakeep", "status", "--json"]);
        match cli.command {
            Command::Status(args) => assert!(args.json),
            _ => panic!("Expected Status command"),
        }
    }

    #[test]
    fn test_get_with_and_without_key() {
        let cli = Cli::parse_from(["datakeep", "get", "prices"]);
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.collector, "prices");
                assert!(args.key.is_none());
            }
            _ => panic!("Expected Get command"),
        }

        let cli = Cli::parse_from(["datakeep", "get", "prices", "2025/12/19/prices_0300.json"]);
        match cli.command {
            Command::Get(args) => {
                assert_eq!(args.key.as_deref(), Some("2025/12/19/prices_0300.json"));
            }
            _ => panic!("Expected Get command"),
        }
    }

    #[test]
    fn test_ls_parses_date() {
        let cli = Cli::parse_from(["datakeep", "ls", "prices", "--date", "2025-12-19"]);
        match cli.command {
            Command::Ls(args) => {
                let date = args.date.unwrap();
                assert_eq!(date, NaiveDate::from_ymd_opt(2025, 12, 19).unwrap());
            }
            _ => panic!("Expected Ls command"),
        }
    }

    #[test]
    fn test_ls_rejects_malformed_date() {
        let result = Cli::try_parse_from(["datakeep", "ls", "prices", "--date", "19/12/2025"]);
        assert!(result.is_err());
    }
}

//! Datakeep CLI library.
//!
//! This library provides the core functionality for the datakeep command-line
//! interface, including environment-based settings, command execution, and the
//! long-running service mode.

pub mod cli;
pub mod commands;
pub mod error;
pub mod settings;

pub use cli::{Cli, Command};
pub use error::{CliError, Result};
pub use settings::Settings;

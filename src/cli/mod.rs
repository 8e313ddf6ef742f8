//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Object Tracker using clap.

pub mod commands;

use crate::config::{apply_env_overrides, load_config, TrackerConfig};
use crate::domain::{Result, TrackerError};
use clap::{Parser, Subcommand};

/// Exit code for a completed run, including runs with per-object failures
pub const EXIT_OK: i32 = 0;
/// Exit code for invalid or incomplete configuration
pub const EXIT_CONFIG: i32 = 2;
/// Exit code when the export finished but publishing failed
pub const EXIT_VCS: i32 = 3;
/// Exit code when the database session could not be established or was lost
pub const EXIT_CONNECTION: i32 = 4;
/// Exit code for any other fatal error
pub const EXIT_FATAL: i32 = 5;
/// Exit code for a run stopped by SIGINT/SIGTERM
pub const EXIT_INTERRUPTED: i32 = 130;

/// Object Tracker - exports database object DDL into a version-controlled tree
#[derive(Parser, Debug)]
#[command(name = "object-tracker")]
#[command(version, about, long_about = None)]
#[command(author = "Object Tracker Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults and environment only when unset)
    #[arg(short, long, env = "OBJECT_TRACKER_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "LOGGING_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export object DDL to the output directory and optionally publish it
    Export(commands::export::ExportArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// List supported object types and their directory names
    ObjectTypes(commands::object_types::ObjectTypesArgs),
}

/// Load the configuration file, or start from defaults when no file is given
///
/// `OBJECT_TRACKER_*` environment overrides are applied in both cases.
/// The result is not validated.
pub fn resolve_config(path: Option<&str>) -> Result<TrackerConfig> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = TrackerConfig::default();
            apply_env_overrides(&mut config)?;
            Ok(config)
        }
    }
}

/// Map a run-level error to a process exit code
pub fn exit_code_for(error: &TrackerError) -> i32 {
    match error {
        TrackerError::Configuration(_) => EXIT_CONFIG,
        TrackerError::Connection(_) => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VcsError;
    use std::path::PathBuf;
    use test_case::test_case;

    #[test]
    fn test_cli_parse_export() {
        let cli = Cli::parse_from(["object-tracker", "export"]);
        assert!(matches!(cli.command, Commands::Export(_)));
    }

    #[test]
    fn test_cli_parse_with_config() {
        let cli = Cli::parse_from(["object-tracker", "--config", "custom.toml", "export"]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
    }

    #[test]
    fn test_cli_parse_with_log_level() {
        let cli = Cli::parse_from(["object-tracker", "--log-level", "debug", "export"]);
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_parse_validate_config() {
        let cli = Cli::parse_from(["object-tracker", "validate-config"]);
        assert!(matches!(cli.command, Commands::ValidateConfig(_)));
    }

    #[test]
    fn test_cli_parse_init() {
        let cli = Cli::parse_from(["object-tracker", "init"]);
        assert!(matches!(cli.command, Commands::Init(_)));
    }

    #[test]
    fn test_cli_parse_object_types() {
        let cli = Cli::parse_from(["object-tracker", "object-types"]);
        assert!(matches!(cli.command, Commands::ObjectTypes(_)));
    }

    #[test]
    fn test_cli_version_flag_exits_early() {
        let err = Cli::try_parse_from(["object-tracker", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test_case(TrackerError::Configuration("bad".into()), EXIT_CONFIG ; "configuration")]
    #[test_case(TrackerError::Connection("ORA-12541".into()), EXIT_CONNECTION ; "connection")]
    #[test_case(TrackerError::DirectoryExists { path: PathBuf::from("/tmp/out/HR") }, EXIT_FATAL ; "directory exists")]
    #[test_case(TrackerError::Vcs(VcsError::Acquire("denied".into())), EXIT_FATAL ; "working tree")]
    fn test_exit_code_for(error: TrackerError, expected: i32) {
        assert_eq!(exit_code_for(&error), expected);
    }
}

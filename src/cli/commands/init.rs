//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::cli::{EXIT_CONFIG, EXIT_FATAL, EXIT_OK};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "object-tracker.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Object Tracker configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(EXIT_CONFIG);
        }

        match fs::write(&self.output, sample_config()) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export DATABASE_PASSWORD (or put it in a .env file)");
                println!(
                    "  3. Validate configuration: object-tracker --config {} validate-config",
                    self.output
                );
                println!(
                    "  4. Run export: object-tracker --config {} export",
                    self.output
                );
                println!();
                Ok(EXIT_OK)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Sample configuration with every section and its defaults
pub fn sample_config() -> &'static str {
    r#"# Object Tracker Configuration File
# Exports database object DDL into a version-controlled directory tree

[application]
log_level = "info"

[database]
username = "hr"
# Resolved from the environment when the file is loaded
password = "${DATABASE_PASSWORD}"
hostname = "localhost"
port = 1521
service_name = "XEPDB1"
# client_lib_dir = "/opt/oracle/instantclient_21_12"

[export]
# Defaults to the upper-cased username when empty
schemas = ["HR"]
object_types = [
    "TABLE",
    "VIEW",
    "INDEX",
    "SEQUENCE",
    "SYNONYM",
    "TRIGGER",
    "FUNCTION",
    "PROCEDURE",
    "PACKAGE",
    "PACKAGE BODY",
    "TYPE",
    "TYPE BODY",
    "MATERIALIZED VIEW",
]
object_name_include_pattern = ".*"
# object_name_exclude_pattern = "_BKUP$"
output_directory = "./ddl"
overwrite = false
# "schema" clears each exported schema directory, "root" the whole output directory
overwrite_scope = "schema"
dry_run = false

[git]
# Publishing is disabled while repository is unset
# repository = "git@github.com:acme/ddl-history.git"
branch = "main"
sync_on_partial_failure = true
author_name = "Object Tracker"
author_email = "object-tracker@localhost"
commit_message_prefix = "Object Tracker - DDL export"
# ssh_key_path = "~/.ssh/id_ed25519"
# username = "git"
# token = "${GIT_TOKEN}"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
}

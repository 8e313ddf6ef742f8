//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Object Tracker configuration.

use crate::cli::{resolve_config, EXIT_CONFIG, EXIT_OK};
use crate::core::export::ExportPlan;
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also require complete database connection settings
    #[arg(long)]
    pub require_connection: bool,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let source = config_path.unwrap_or("<defaults and environment>");
        tracing::info!(config_path = %source, "Validating configuration");

        println!("🔍 Validating configuration: {source}");
        println!();

        let config = match resolve_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        // Resolving the plan also compiles the patterns and checks schema names
        let plan = match ExportPlan::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        };

        if self.require_connection {
            if let Err(e) = config.database.validate_connection() {
                println!("❌ Database connection settings incomplete");
                println!("   Error: {e}");
                println!();
                return Ok(EXIT_CONFIG);
            }
        }

        println!("✅ Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Database: {}", config.database.connect_string());
        println!(
            "  Username: {}",
            config.database.username.as_deref().unwrap_or("(not set)")
        );
        println!("  Schemas: {:?}", plan.schemas);
        println!(
            "  Object Types: {}",
            plan.object_types
                .iter()
                .map(|t| t.short_name())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!("  Include Pattern: {}", plan.include_pattern.as_str());
        if let Some(exclude) = &plan.exclude_pattern {
            println!("  Exclude Pattern: {}", exclude.as_str());
        }
        println!("  Output Directory: {}", plan.output_root.display());
        println!(
            "  Overwrite: {} ({:?} scope)",
            plan.overwrite, plan.overwrite_scope
        );
        match &plan.vcs {
            Some(vcs) => {
                println!("  Git Repository: {}", vcs.remote_url);
                println!("  Git Branch: {}", vcs.branch);
                println!("  Sync On Partial Failure: {}", vcs.sync_on_partial_failure);
            }
            None => println!("  Git Publishing: disabled"),
        }
        println!();
        Ok(EXIT_OK)
    }
}

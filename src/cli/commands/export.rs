//! Export command implementation
//!
//! This module implements the `export` command: enumerate, render and
//! write object DDL, then optionally publish the tree to a git remote.

use crate::adapters::database::create_database_session;
use crate::adapters::git::Git2Repository;
use crate::cli::{
    exit_code_for, resolve_config, EXIT_CONFIG, EXIT_FATAL, EXIT_INTERRUPTED, EXIT_OK, EXIT_VCS,
};
use crate::config::{secret_string, OverwriteScope, TrackerConfig};
use crate::core::export::{ExportOrchestrator, ExportPlan, ExportResult, VcsStatus};
use anyhow::Context;
use clap::Args;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the export command
///
/// Every flag overrides the matching configuration value when given.
#[derive(Args, Debug, Default)]
pub struct ExportArgs {
    /// Database username
    #[arg(long, env = "DATABASE_USERNAME")]
    pub database_username: Option<String>,

    /// Database password
    #[arg(long, env = "DATABASE_PASSWORD", hide_env_values = true)]
    pub database_password: Option<String>,

    /// Database host name
    #[arg(long, env = "DATABASE_HOSTNAME")]
    pub database_hostname: Option<String>,

    /// Database listener port
    #[arg(long, env = "DATABASE_PORT")]
    pub database_port: Option<u16>,

    /// Database service name
    #[arg(long, env = "DATABASE_SERVICE_NAME")]
    pub database_service_name: Option<String>,

    /// Schemas to export (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub schemas: Vec<String>,

    /// Object types to export (comma-separated, e.g. TABLE,VIEW,PACKAGE_BODY)
    #[arg(long, value_delimiter = ',')]
    pub object_types: Vec<String>,

    /// Regular expression an object name must match
    #[arg(long)]
    pub include_pattern: Option<String>,

    /// Regular expression excluding object names
    #[arg(long)]
    pub exclude_pattern: Option<String>,

    /// Output directory
    #[arg(short, long)]
    pub output_directory: Option<String>,

    /// Replace existing output instead of aborting
    #[arg(long)]
    pub overwrite: bool,

    /// What --overwrite clears (schema or root)
    #[arg(long, value_name = "SCOPE")]
    pub overwrite_scope: Option<String>,

    /// Remote repository to publish to
    #[arg(long)]
    pub git_repo: Option<String>,

    /// Branch to publish to
    #[arg(long)]
    pub git_branch: Option<String>,

    /// Enumerate objects only - nothing is rendered, written or pushed
    #[arg(long)]
    pub dry_run: bool,

    /// Write the run result as JSON to this path
    #[arg(long, value_name = "PATH")]
    pub report: Option<PathBuf>,
}

impl ExportArgs {
    /// Layer command-line flags on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut TrackerConfig) -> anyhow::Result<()> {
        if let Some(username) = &self.database_username {
            config.database.username = Some(username.clone());
        }
        if let Some(password) = &self.database_password {
            config.database.password = Some(secret_string(password.clone()));
        }
        if let Some(hostname) = &self.database_hostname {
            config.database.hostname = Some(hostname.clone());
        }
        if let Some(port) = self.database_port {
            config.database.port = port;
        }
        if let Some(service_name) = &self.database_service_name {
            config.database.service_name = Some(service_name.clone());
        }

        let schemas = trimmed(&self.schemas);
        if !schemas.is_empty() {
            tracing::info!(schemas = ?schemas, "Overriding schemas from CLI");
            config.export.schemas = schemas;
        }
        let object_types = trimmed(&self.object_types);
        if !object_types.is_empty() {
            tracing::info!(object_types = ?object_types, "Overriding object types from CLI");
            config.export.object_types = object_types;
        }
        if let Some(pattern) = &self.include_pattern {
            config.export.object_name_include_pattern = pattern.clone();
        }
        if let Some(pattern) = &self.exclude_pattern {
            config.export.object_name_exclude_pattern = Some(pattern.clone());
        }
        if let Some(dir) = &self.output_directory {
            config.export.output_directory = dir.clone();
        }
        if self.overwrite {
            config.export.overwrite = true;
        }
        if let Some(scope) = &self.overwrite_scope {
            config.export.overwrite_scope = scope
                .parse::<OverwriteScope>()
                .map_err(anyhow::Error::msg)?;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }

        if let Some(repo) = &self.git_repo {
            config.git.repository = Some(repo.clone());
        }
        if let Some(branch) = &self.git_branch {
            config.git.branch = branch.clone();
        }

        Ok(())
    }

    /// Execute the export command
    pub async fn execute(
        &self,
        config_path: Option<&str>,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = match resolve_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("Failed to load configuration: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if let Err(e) = self.apply_overrides(&mut config) {
            tracing::error!(error = %e, "Invalid command-line override");
            eprintln!("Invalid argument: {e}");
            return Ok(EXIT_CONFIG);
        }

        let plan = match ExportPlan::from_config(&config) {
            Ok(p) => p,
            Err(e) => {
                tracing::error!(error = %e, "Configuration validation failed");
                eprintln!("Configuration validation failed: {e}");
                return Ok(EXIT_CONFIG);
            }
        };

        if plan.dry_run {
            println!("🔍 DRY RUN MODE - objects are listed, nothing is written or pushed");
            println!();
        }

        let session = match create_database_session(&config.database).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open database session");
                eprintln!("Failed to connect: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        let mut orchestrator =
            ExportOrchestrator::new(plan, session.catalog, session.metadata, shutdown_signal);
        if config.git_enabled() {
            orchestrator = orchestrator
                .with_vcs_repository(Arc::new(Git2Repository::from_config(&config.git)));
        }

        println!("🚀 Starting export...");
        println!();

        let result = match orchestrator.execute().await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(exit_code_for(&e));
            }
        };

        result.log_summary();
        print_summary(&result);

        if let Some(path) = &self.report {
            if let Err(e) = write_report(path, &result) {
                tracing::error!(error = %e, path = %path.display(), "Failed to write report");
                eprintln!("Failed to write report: {e:#}");
                return Ok(EXIT_FATAL);
            }
            println!("📄 Report written to {}", path.display());
        }

        Ok(exit_code(&result))
    }
}

fn trimmed(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Exit code for a run that returned a result
pub fn exit_code(result: &ExportResult) -> i32 {
    if result.interrupted {
        EXIT_INTERRUPTED
    } else if result.vcs.as_ref().map(|v| v.is_failure()).unwrap_or(false) {
        EXIT_VCS
    } else {
        EXIT_OK
    }
}

fn write_report(path: &Path, result: &ExportResult) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(result).context("Failed to serialize run result")?;
    std::fs::write(path, json).with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}

fn print_summary(result: &ExportResult) {
    println!();
    println!("📊 Export Summary:");
    println!("  Schemas: {}", result.tallies.len());
    println!("  Objects enumerated: {}", result.total_enumerated());
    if !result.dry_run {
        println!("  Exported: {}", result.total_succeeded());
        println!("  Failed: {}", result.total_failed());
    }
    println!("  Duration: {:.2}s", result.duration.as_secs_f64());

    if result.dry_run {
        for (schema, types) in &result.tallies {
            for (object_type, tally) in types {
                println!("    {schema} {object_type}: {}", tally.enumerated);
            }
        }
    }
    println!();

    if !result.enumeration_failures.is_empty() {
        println!("⚠️  Enumeration failures:");
        for failure in &result.enumeration_failures {
            match failure.object_type {
                Some(object_type) => {
                    println!("  - {} {}: {}", failure.schema, object_type, failure.message)
                }
                None => println!("  - {}: {}", failure.schema, failure.message),
            }
        }
        println!();
    }

    if !result.failures.is_empty() {
        println!("⚠️  Object failures:");
        for (i, failure) in result.failures.iter().enumerate() {
            if i < 10 {
                println!("  - {} ({:?}): {}", failure.object, failure.kind, failure.message);
            }
        }
        if result.failures.len() > 10 {
            println!("  ... and {} more failures", result.failures.len() - 10);
        }
        println!();
    }

    if let Some(vcs) = &result.vcs {
        match vcs.status {
            VcsStatus::Pushed => println!(
                "📤 Pushed {} to {} ({})",
                vcs.branch,
                vcs.remote,
                vcs.commit_id.as_deref().unwrap_or("-")
            ),
            VcsStatus::NoChanges => println!("📤 No changes to publish on {}", vcs.branch),
            VcsStatus::Skipped => println!(
                "📤 Publish skipped: {}",
                vcs.message.as_deref().unwrap_or("-")
            ),
            VcsStatus::Failed => println!(
                "❌ Publish failed: {}",
                vcs.message.as_deref().unwrap_or("-")
            ),
        }
        println!();
    }

    if result.interrupted {
        println!("⚠️  Export interrupted. Output is incomplete and was not published.");
    } else if result.is_successful() {
        println!("✅ Export completed successfully!");
    } else {
        println!("⚠️  Export completed with failures");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::export::VcsOutcome;
    use secrecy::ExposeSecret;

    #[test]
    fn test_export_args_defaults_leave_config_untouched() {
        let mut config = TrackerConfig::default();
        let before = config.export.object_types.clone();
        ExportArgs::default().apply_overrides(&mut config).unwrap();
        assert_eq!(config.export.object_types, before);
        assert!(!config.export.overwrite);
        assert!(config.git.repository.is_none());
    }

    #[test]
    fn test_export_args_with_overrides() {
        let args = ExportArgs {
            database_username: Some("hr".to_string()),
            database_password: Some("secret".to_string()),
            schemas: vec!["HR".to_string(), " SCOTT ".to_string(), String::new()],
            object_types: vec!["TABLE".to_string(), "VIEW".to_string()],
            include_pattern: Some("^EMP".to_string()),
            overwrite: true,
            overwrite_scope: Some("root".to_string()),
            git_repo: Some("git@example.com:acme/ddl.git".to_string()),
            git_branch: Some("snapshots".to_string()),
            dry_run: true,
            ..Default::default()
        };

        let mut config = TrackerConfig::default();
        args.apply_overrides(&mut config).unwrap();

        assert_eq!(config.database.username.as_deref(), Some("hr"));
        assert_eq!(
            config
                .database
                .password
                .as_ref()
                .map(|p| p.expose_secret().as_ref().to_string()),
            Some("secret".to_string())
        );
        assert_eq!(config.export.schemas, vec!["HR", "SCOTT"]);
        assert_eq!(config.export.object_types, vec!["TABLE", "VIEW"]);
        assert_eq!(config.export.object_name_include_pattern, "^EMP");
        assert!(config.export.overwrite);
        assert_eq!(config.export.overwrite_scope, OverwriteScope::Root);
        assert!(config.export.dry_run);
        assert_eq!(config.git.branch, "snapshots");
        assert!(config.git_enabled());
    }

    #[test]
    fn test_invalid_overwrite_scope_rejected() {
        let args = ExportArgs {
            overwrite_scope: Some("everything".to_string()),
            ..Default::default()
        };
        let mut config = TrackerConfig::default();
        assert!(args.apply_overrides(&mut config).is_err());
    }

    #[test]
    fn test_exit_code_for_results() {
        let mut result = ExportResult::new(false);
        assert_eq!(exit_code(&result), EXIT_OK);

        result.set_vcs_outcome(VcsOutcome {
            remote: "origin".to_string(),
            branch: "main".to_string(),
            status: VcsStatus::Failed,
            commit_id: None,
            message: Some("rejected".to_string()),
        });
        assert_eq!(exit_code(&result), EXIT_VCS);

        result.interrupted = true;
        assert_eq!(exit_code(&result), EXIT_INTERRUPTED);
    }

    #[test]
    fn test_report_written_as_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        write_report(&path, &ExportResult::new(true)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["dry_run"], serde_json::Value::Bool(true));
        assert!(value["duration_secs"].is_number());
    }
}

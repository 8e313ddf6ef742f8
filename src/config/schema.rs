//! Configuration schema types
//!
//! This module defines the configuration structure for Object Tracker.
//! Every section has defaults so a run can be configured purely from the
//! command line.

use crate::config::SecretString;
use crate::domain::ObjectType;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Granularity of the overwrite guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OverwriteScope {
    /// Clear and recreate each configured schema directory; sibling schema
    /// directories are left untouched
    #[default]
    Schema,
    /// Clear and recreate the whole output directory once
    Root,
}

impl std::str::FromStr for OverwriteScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "schema" => Ok(OverwriteScope::Schema),
            "root" => Ok(OverwriteScope::Root),
            other => Err(format!(
                "Invalid overwrite scope '{other}'. Must be one of: schema, root"
            )),
        }
    }
}

/// Main Object Tracker configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrackerConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Database connection settings
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Export settings
    #[serde(default)]
    pub export: ExportConfig,

    /// Optional git publishing
    #[serde(default)]
    pub git: GitConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.database.validate()?;
        self.export.validate()?;
        self.git.validate()?;
        self.logging.validate()?;

        if self.export.effective_schemas(&self.database).is_empty() {
            return Err(
                "export.schemas cannot be empty when database.username is not set".to_string(),
            );
        }

        Ok(())
    }

    /// Whether the git publishing stage is enabled
    pub fn git_enabled(&self) -> bool {
        self.git
            .repository
            .as_ref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Database connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Username to connect with
    #[serde(default)]
    pub username: Option<String>,

    /// Password to connect with
    /// Stored securely in memory and automatically zeroized on drop
    #[serde(default)]
    pub password: Option<SecretString>,

    /// Database host name
    #[serde(default)]
    pub hostname: Option<String>,

    /// Listener port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Service name
    #[serde(default)]
    pub service_name: Option<String>,

    /// Directory holding the Oracle client libraries, when they are not on
    /// the default library search path
    #[serde(default)]
    pub client_lib_dir: Option<String>,
}

impl DatabaseConfig {
    fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("database.port must be > 0".to_string());
        }
        Ok(())
    }

    /// Checks that every connection setting needed for a live session is present
    pub fn validate_connection(&self) -> Result<(), String> {
        use secrecy::ExposeSecret;

        let missing = |value: &Option<String>| {
            value.as_ref().map(|v| v.trim().is_empty()).unwrap_or(true)
        };

        if missing(&self.username) {
            return Err("database.username is required".to_string());
        }
        if self
            .password
            .as_ref()
            .map(|p| p.expose_secret().is_empty())
            .unwrap_or(true)
        {
            return Err("database.password is required".to_string());
        }
        if missing(&self.hostname) {
            return Err("database.hostname is required".to_string());
        }
        if missing(&self.service_name) {
            return Err("database.service_name is required".to_string());
        }
        Ok(())
    }

    /// EZConnect string (`//host:port/service`)
    pub fn connect_string(&self) -> String {
        format!(
            "//{}:{}/{}",
            self.hostname.as_deref().unwrap_or_default(),
            self.port,
            self.service_name.as_deref().unwrap_or_default()
        )
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            username: None,
            password: None,
            hostname: None,
            port: default_port(),
            service_name: None,
            client_lib_dir: None,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Schemas to export, in order (empty = the connecting user's schema)
    #[serde(default)]
    pub schemas: Vec<String>,

    /// Object types to export, in order (catalog keyword or short name)
    #[serde(default = "default_object_types")]
    pub object_types: Vec<String>,

    /// Regular expression an object name must match to be exported
    #[serde(default = "default_include_pattern")]
    pub object_name_include_pattern: String,

    /// Regular expression excluding object names from the export
    #[serde(default)]
    pub object_name_exclude_pattern: Option<String>,

    /// Output directory, relative or absolute
    #[serde(default = "default_output_directory")]
    pub output_directory: String,

    /// Replace existing output instead of aborting
    #[serde(default)]
    pub overwrite: bool,

    /// Granularity of the overwrite guard
    #[serde(default)]
    pub overwrite_scope: OverwriteScope,

    /// Enumerate objects only; nothing is rendered, written or pushed
    #[serde(default)]
    pub dry_run: bool,
}

impl ExportConfig {
    fn validate(&self) -> Result<(), String> {
        if self.object_types.is_empty() {
            return Err("export.object_types cannot be empty".to_string());
        }
        for object_type in &self.object_types {
            object_type.parse::<ObjectType>()?;
        }

        Regex::new(&self.object_name_include_pattern).map_err(|e| {
            format!(
                "export.object_name_include_pattern is not a valid regular expression: {e}"
            )
        })?;
        if let Some(pattern) = &self.object_name_exclude_pattern {
            Regex::new(pattern).map_err(|e| {
                format!("export.object_name_exclude_pattern is not a valid regular expression: {e}")
            })?;
        }

        if self.output_directory.trim().is_empty() {
            return Err("export.output_directory cannot be empty".to_string());
        }

        for schema in &self.schemas {
            if schema.trim().is_empty() {
                return Err("export.schemas cannot contain empty names".to_string());
            }
        }

        Ok(())
    }

    /// Configured schemas, or the upper-cased username when none are given
    pub fn effective_schemas(&self, database: &DatabaseConfig) -> Vec<String> {
        if !self.schemas.is_empty() {
            return self.schemas.clone();
        }
        database
            .username
            .as_ref()
            .filter(|u| !u.trim().is_empty())
            .map(|u| vec![u.trim().to_uppercase()])
            .unwrap_or_default()
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            schemas: vec![],
            object_types: default_object_types(),
            object_name_include_pattern: default_include_pattern(),
            object_name_exclude_pattern: None,
            output_directory: default_output_directory(),
            overwrite: false,
            overwrite_scope: OverwriteScope::default(),
            dry_run: false,
        }
    }
}

/// Git publishing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitConfig {
    /// Remote repository URL (SSH or HTTPS). Publishing is disabled when unset.
    #[serde(default)]
    pub repository: Option<String>,

    /// Branch to commit to; created when it does not exist
    #[serde(default = "default_branch")]
    pub branch: String,

    /// Commit and push even when some objects failed to export
    #[serde(default = "default_true")]
    pub sync_on_partial_failure: bool,

    /// Commit author name
    #[serde(default = "default_author_name")]
    pub author_name: String,

    /// Commit author email
    #[serde(default = "default_author_email")]
    pub author_email: String,

    /// Commit message prefix; a timestamp is appended
    #[serde(default = "default_commit_message_prefix")]
    pub commit_message_prefix: String,

    /// Private key for SSH remotes (the SSH agent is used when unset)
    #[serde(default)]
    pub ssh_key_path: Option<String>,

    /// Username for HTTPS remotes
    #[serde(default)]
    pub username: Option<String>,

    /// Token or password for HTTPS remotes
    #[serde(default)]
    pub token: Option<SecretString>,
}

impl GitConfig {
    fn validate(&self) -> Result<(), String> {
        if self.repository.is_some() && self.branch.trim().is_empty() {
            return Err("git.branch cannot be empty when git.repository is set".to_string());
        }
        if self.author_name.trim().is_empty() || self.author_email.trim().is_empty() {
            return Err("git.author_name and git.author_email cannot be empty".to_string());
        }
        Ok(())
    }
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            repository: None,
            branch: default_branch(),
            sync_on_partial_failure: true,
            author_name: default_author_name(),
            author_email: default_author_email(),
            commit_message_prefix: default_commit_message_prefix(),
            ssh_key_path: None,
            username: None,
            token: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Enable local JSON file logging
    #[serde(default)]
    pub local_enabled: bool,

    /// Local log directory
    #[serde(default = "default_local_path")]
    pub local_path: String,

    /// Log rotation strategy (daily, hourly, never)
    #[serde(default = "default_local_rotation")]
    pub local_rotation: String,
}

impl LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&self.local_rotation.as_str()) {
            return Err(format!(
                "Invalid logging.local_rotation '{}'. Must be one of: {}",
                self.local_rotation,
                valid_rotations.join(", ")
            ));
        }
        if self.local_enabled && self.local_path.trim().is_empty() {
            return Err("logging.local_path cannot be empty when local logging is enabled".to_string());
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            local_enabled: false,
            local_path: default_local_path(),
            local_rotation: default_local_rotation(),
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_port() -> u16 {
    1521
}

fn default_true() -> bool {
    true
}

fn default_object_types() -> Vec<String> {
    ObjectType::ALL
        .iter()
        .map(|t| t.catalog_name().to_string())
        .collect()
}

fn default_include_pattern() -> String {
    ".*".to_string()
}

fn default_output_directory() -> String {
    std::env::temp_dir()
        .join("output")
        .to_string_lossy()
        .into_owned()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_author_name() -> String {
    "Object Tracker".to_string()
}

fn default_author_email() -> String {
    "object-tracker@localhost".to_string()
}

fn default_commit_message_prefix() -> String {
    "Object Tracker - DDL export".to_string()
}

fn default_local_path() -> String {
    "/var/log/object-tracker".to_string()
}

fn default_local_rotation() -> String {
    "daily".to_string()
}

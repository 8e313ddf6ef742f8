//! Configuration management for Object Tracker.
//!
//! Configuration comes from three layers, lowest precedence first:
//!
//! 1. An optional TOML file, with `${VAR_NAME}` environment substitution
//! 2. `OBJECT_TRACKER_<SECTION>_<KEY>` environment overrides
//! 3. Command-line flags (which themselves fall back to `DATABASE_*` variables)
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - Log level
//! - [`DatabaseConfig`] - Connection settings
//! - [`ExportConfig`] - Schemas, object types, name filters, output and overwrite policy
//! - [`GitConfig`] - Optional publishing to a git remote
//! - [`LoggingConfig`] - Local file logging
//!
//! # Example Configuration
//!
//! ```toml
//! [database]
//! username = "hr"
//! password = "${DATABASE_PASSWORD}"
//! hostname = "db.example.com"
//! service_name = "ORCLPDB1"
//!
//! [export]
//! schemas = ["HR", "SALES"]
//! object_types = ["TABLE", "VIEW", "PACKAGE", "PACKAGE BODY"]
//! object_name_exclude_pattern = "_BKUP$"
//! output_directory = "./ddl"
//! overwrite = true
//!
//! [git]
//! repository = "git@github.com:acme/schema-history.git"
//! branch = "main"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{apply_env_overrides, load_config};
pub use schema::{
    ApplicationConfig, DatabaseConfig, ExportConfig, GitConfig, LoggingConfig, OverwriteScope,
    TrackerConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};

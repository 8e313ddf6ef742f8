//! External system integrations for Object Tracker.
//!
//! This module provides adapters for integrating with external systems:
//!
//! - [`database`] - Catalog and metadata abstraction layer (trait-based)
//! - [`oracle`] - Oracle implementation using `DBMS_METADATA`
//! - [`git`] - Working tree management and publishing via libgit2
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the export
//! engine can be tested with in-memory implementations.
//!
//! ```rust,no_run
//! use object_tracker::adapters::database::{create_database_session, CatalogSource};
//! use object_tracker::config::{secret_string, DatabaseConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DatabaseConfig {
//!     username: Some("hr".to_string()),
//!     password: Some(secret_string("hr")),
//!     hostname: Some("localhost".to_string()),
//!     port: 1521,
//!     service_name: Some("XEPDB1".to_string()),
//!     client_lib_dir: None,
//! };
//!
//! let session = create_database_session(&config).await?;
//! let exists = session.catalog.schema_exists("HR").await?;
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod git;
pub mod oracle;

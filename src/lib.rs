// Object Tracker - Database DDL export to version control
// Copyright (c) 2025 Object Tracker Contributors
// Licensed under the MIT License

//! # Object Tracker - Database DDL export
//!
//! Object Tracker exports the DDL of every selected object in one or more
//! database schemas into a deterministic directory tree, and optionally
//! commits and pushes that tree to a git remote so schema changes can be
//! tracked over time.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Enumerating** objects per schema and object type with include/exclude patterns
//! - **Rendering** each object's DDL through the server's metadata service
//! - **Writing** one file per object at `<root>/<schema>/<type>/<name>.sql`
//! - **Publishing** the tree to a git branch
//!
//! ## Architecture
//!
//! Object Tracker follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Export engine (enumerate, retrieve, layout, orchestrate, publish)
//! - [`adapters`] - External integrations (Oracle, git)
//! - [`domain`] - Core domain types and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use object_tracker::adapters::database::create_database_session;
//! use object_tracker::config::load_config;
//! use object_tracker::core::export::{ExportOrchestrator, ExportPlan};
//! use tokio::sync::watch;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("object-tracker.toml")?;
//!     let plan = ExportPlan::from_config(&config)?;
//!     let session = create_database_session(&config.database).await?;
//!
//!     let (_shutdown_tx, shutdown_rx) = watch::channel(false);
//!     let mut orchestrator =
//!         ExportOrchestrator::new(plan, session.catalog, session.metadata, shutdown_rx);
//!     let result = orchestrator.execute().await?;
//!
//!     println!("Exported {} objects", result.total_succeeded());
//!     Ok(())
//! }
//! ```
//!
//! ## Failure handling
//!
//! A failure to render or write one object is recorded in the
//! [`ExportResult`](core::export::ExportResult) and the run continues. An
//! output directory that already exists without overwrite permission, or a
//! lost database session, aborts the run before or during the export.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;

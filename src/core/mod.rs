//! Core business logic for Object Tracker.
//!
//! # Modules
//!
//! - [`enumerate`] - Object enumeration with include/exclude name filters
//! - [`retrieve`] - DDL retrieval with session rendering preferences
//! - [`layout`] - Output paths, overwrite policy and atomic writes
//! - [`vcs`] - Working tree preparation and publishing
//! - [`export`] - Plan, orchestrator, progress and results
//!
//! # Export Workflow
//!
//! 1. **Configure**: apply rendering preferences to the session
//! 2. **Prepare**: check and clear output directories, acquire the working tree
//! 3. **Enumerate**: list objects per schema and object type
//! 4. **Retrieve**: render each object's DDL
//! 5. **Write**: store it at `{root}/{schema}/{short_name}/{name}.sql`
//! 6. **Publish** (optional): stage, commit and push
//! 7. **Report**: log and return the [`export::ExportResult`]
//!
//! # Example
//!
//! ```rust,no_run
//! use object_tracker::adapters::database::create_database_session;
//! use object_tracker::config::load_config;
//! use object_tracker::core::export::{ExportOrchestrator, ExportPlan};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("object-tracker.toml")?;
//! let plan = ExportPlan::from_config(&config)?;
//! let session = create_database_session(&config.database).await?;
//!
//! let (_shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
//! let mut orchestrator =
//!     ExportOrchestrator::new(plan, session.catalog, session.metadata, shutdown_rx);
//!
//! let result = orchestrator.execute().await?;
//! println!("Exported: {}", result.total_succeeded());
//! println!("Failed: {}", result.total_failed());
//! # Ok(())
//! # }
//! ```

pub mod enumerate;
pub mod export;
pub mod layout;
pub mod retrieve;
pub mod vcs;

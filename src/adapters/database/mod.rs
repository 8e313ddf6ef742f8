//! Database abstraction layer
//!
//! This module provides a trait-based abstraction over the object catalog
//! and the server-side DDL renderer, so the export engine can run against
//! a live Oracle session or an in-memory stand-in.

pub mod factory;
pub mod traits;

pub use factory::{create_database_session, DatabaseSessionHandles};
pub use traits::{CatalogObject, CatalogSource, MetadataService};

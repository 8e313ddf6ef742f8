//! Database abstraction traits
//!
//! This module defines the traits that database adapters must implement
//! to work with Object Tracker. The export engine only sees these traits,
//! so tests can drive it with in-memory implementations.

use crate::core::retrieve::RenderingOptions;
use crate::domain::{ObjectType, Result};
use async_trait::async_trait;

/// One row of the object catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogObject {
    /// Object name as stored in the catalog
    pub name: String,

    /// Whether the object was generated by the system (e.g. a LOB index)
    pub generated: bool,
}

impl CatalogObject {
    /// A user-created object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generated: false,
        }
    }

    /// A system-generated object
    pub fn generated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generated: true,
        }
    }
}

/// Catalog access used for object enumeration
///
/// Name filtering and ordering are applied by the caller; implementations
/// return every row for the owner and object type.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Check whether a schema exists and is visible to the session
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::QueryFailed` if the catalog cannot be queried.
    async fn schema_exists(&self, schema: &str) -> Result<bool>;

    /// List the objects of one type owned by a schema
    ///
    /// # Arguments
    ///
    /// * `schema` - Owning schema
    /// * `object_type` - Object type; implementations query by its catalog keyword
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::QueryFailed` if the catalog cannot be queried.
    async fn list_objects(&self, schema: &str, object_type: ObjectType)
        -> Result<Vec<CatalogObject>>;
}

/// Server-side DDL rendering
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Apply rendering preferences to the session
    ///
    /// Must be called once before any [`render`](Self::render) call.
    ///
    /// # Errors
    ///
    /// Returns an error if the session rejects the preferences.
    async fn configure(&self, options: &RenderingOptions) -> Result<()>;

    /// Render the DDL of one object
    ///
    /// `object_type` is passed by its short name (`PACKAGE_SPEC`, `DB_LINK`, ...).
    ///
    /// # Errors
    ///
    /// Returns an error if the object cannot be rendered.
    async fn render(&self, object_type: ObjectType, object_name: &str, schema: &str)
        -> Result<String>;
}

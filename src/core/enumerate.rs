//! Object enumeration with name filtering

use crate::adapters::database::CatalogSource;
use crate::domain::{ObjectType, Result, TrackerError};
use regex::Regex;
use std::sync::Arc;

/// Lists the objects of one type in one schema
///
/// System-generated objects are skipped. A name is kept when it matches
/// the include pattern and does not match the exclude pattern. Matching
/// is unanchored search, so `^EMP` and `BKUP` behave as in any regex tool.
pub struct ObjectEnumerator {
    catalog: Arc<dyn CatalogSource>,
    include: Regex,
    exclude: Option<Regex>,
}

impl ObjectEnumerator {
    pub fn new(catalog: Arc<dyn CatalogSource>, include: Regex, exclude: Option<Regex>) -> Self {
        Self {
            catalog,
            include,
            exclude,
        }
    }

    /// Whether an object name passes the include and exclude filters
    pub fn matches(&self, name: &str) -> bool {
        self.include.is_match(name)
            && !self
                .exclude
                .as_ref()
                .map(|re| re.is_match(name))
                .unwrap_or(false)
    }

    /// Fail with `TrackerError::SchemaNotFound` unless the schema is visible
    pub async fn ensure_schema(&self, schema: &str) -> Result<()> {
        if self.catalog.schema_exists(schema).await? {
            Ok(())
        } else {
            Err(TrackerError::SchemaNotFound(schema.to_string()))
        }
    }

    /// Return the filtered object names, sorted ascending
    ///
    /// # Errors
    ///
    /// - `TrackerError::SchemaNotFound` if the schema is not visible
    /// - `TrackerError::QueryFailed` if the catalog query fails
    pub async fn list_objects(&self, schema: &str, object_type: ObjectType) -> Result<Vec<String>> {
        self.ensure_schema(schema).await?;
        self.list_objects_in_checked_schema(schema, object_type).await
    }

    /// [`list_objects`](Self::list_objects) for a schema that already
    /// passed [`ensure_schema`](Self::ensure_schema) in this run
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::QueryFailed` if the catalog query fails.
    pub async fn list_objects_in_checked_schema(
        &self,
        schema: &str,
        object_type: ObjectType,
    ) -> Result<Vec<String>> {
        let rows = self.catalog.list_objects(schema, object_type).await?;
        let total = rows.len();

        let mut names: Vec<String> = rows
            .into_iter()
            .filter(|row| !row.generated)
            .map(|row| row.name)
            .filter(|name| self.matches(name))
            .collect();
        names.sort();
        names.dedup();

        tracing::debug!(
            schema = %schema,
            object_type = %object_type,
            catalog_rows = total,
            selected = names.len(),
            "Objects enumerated"
        );

        Ok(names)
    }
}

//! Oracle adapter implementing the catalog and metadata traits

use crate::adapters::database::traits::{CatalogObject, CatalogSource, MetadataService};
use crate::adapters::oracle::client::OracleClient;
use crate::core::retrieve::RenderingOptions;
use crate::domain::{ObjectType, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Wraps an [`OracleClient`] for the export engine
///
/// Catalog queries use `ALL_USERS` and `ALL_OBJECTS`; rendering uses
/// `DBMS_METADATA`. One session serves both.
pub struct OracleAdapter {
    client: Arc<OracleClient>,
}

impl OracleAdapter {
    pub fn new(client: OracleClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn new_with_arc(client: Arc<OracleClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<OracleClient> {
        &self.client
    }
}

#[async_trait]
impl CatalogSource for OracleAdapter {
    async fn schema_exists(&self, schema: &str) -> Result<bool> {
        self.client.schema_exists(schema).await
    }

    async fn list_objects(
        &self,
        schema: &str,
        object_type: ObjectType,
    ) -> Result<Vec<CatalogObject>> {
        let rows = self
            .client
            .list_objects(schema, object_type.catalog_name())
            .await?;

        Ok(rows
            .into_iter()
            .map(|(name, generated)| CatalogObject { name, generated })
            .collect())
    }
}

#[async_trait]
impl MetadataService for OracleAdapter {
    async fn configure(&self, options: &RenderingOptions) -> Result<()> {
        self.client.set_transform_params(options).await
    }

    async fn render(
        &self,
        object_type: ObjectType,
        object_name: &str,
        schema: &str,
    ) -> Result<String> {
        self.client
            .get_ddl(object_type.short_name(), object_name, schema)
            .await
    }
}

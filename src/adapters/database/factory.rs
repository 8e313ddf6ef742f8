//! Database session factory
//!
//! Builds the catalog and metadata handles the export engine runs against.

use crate::adapters::database::traits::{CatalogSource, MetadataService};
use crate::adapters::oracle::{OracleAdapter, OracleClient};
use crate::config::DatabaseConfig;
use crate::domain::{Result, TrackerError};
use std::sync::Arc;

/// Catalog and metadata access backed by one database session
#[derive(Clone)]
pub struct DatabaseSessionHandles {
    pub catalog: Arc<dyn CatalogSource>,
    pub metadata: Arc<dyn MetadataService>,
}

/// Open a database session and return both trait handles
///
/// The catalog and metadata handles share the session, so rendering
/// preferences applied through one are seen by the other.
///
/// # Errors
///
/// - `TrackerError::Configuration` if a connection setting is missing
/// - `TrackerError::Connection` if the session cannot be established
pub async fn create_database_session(config: &DatabaseConfig) -> Result<DatabaseSessionHandles> {
    config
        .validate_connection()
        .map_err(TrackerError::Configuration)?;

    tracing::info!("Creating Oracle session");
    let client = Arc::new(OracleClient::connect(config).await?);
    let adapter = Arc::new(OracleAdapter::new_with_arc(client));

    Ok(DatabaseSessionHandles {
        catalog: adapter.clone() as Arc<dyn CatalogSource>,
        metadata: adapter as Arc<dyn MetadataService>,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_rejected_before_connecting() {
        let config = DatabaseConfig::default();
        let err = create_database_session(&config).await.err().unwrap();
        assert!(matches!(err, TrackerError::Configuration(ref m) if m.contains("username")));
    }
}

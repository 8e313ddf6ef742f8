//! DDL retrieval
//!
//! [`DdlRetriever`] can only be obtained through [`DdlRetriever::configure`],
//! which applies the [`RenderingOptions`] to the session first. A retriever
//! in hand therefore always talks to a configured session.

use crate::adapters::database::MetadataService;
use crate::domain::{DdlText, ObjectRef, Result, TrackerError};
use serde::Serialize;
use std::sync::Arc;

/// Session rendering preferences for the metadata service
///
/// Each field maps onto one DBMS_METADATA session transform parameter.
/// [`Default`] yields the fixed set every export uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RenderingOptions {
    pub constraints: bool,
    pub ref_constraints: bool,
    pub constraint_use_default_index: bool,
    pub constraints_as_alter: bool,
    pub pretty: bool,
    pub sqlterminator: bool,
    pub size_byte_keyword: bool,
    pub segment_attributes: bool,
    pub storage: bool,
    pub tablespace: bool,
    pub partitioning: bool,
    pub body: bool,
}

impl Default for RenderingOptions {
    fn default() -> Self {
        Self {
            constraints: true,
            ref_constraints: true,
            constraint_use_default_index: true,
            constraints_as_alter: false,
            pretty: true,
            sqlterminator: true,
            size_byte_keyword: false,
            segment_attributes: true,
            storage: false,
            tablespace: true,
            partitioning: true,
            body: false,
        }
    }
}

impl RenderingOptions {
    /// Transform parameter names and values, in the order they are applied
    pub fn transform_params(&self) -> Vec<(&'static str, bool)> {
        vec![
            ("CONSTRAINTS", self.constraints),
            ("REF_CONSTRAINTS", self.ref_constraints),
            ("CONSTRAINT_USE_DEFAULT_INDEX", self.constraint_use_default_index),
            ("CONSTRAINTS_AS_ALTER", self.constraints_as_alter),
            ("PRETTY", self.pretty),
            ("SQLTERMINATOR", self.sqlterminator),
            ("SIZE_BYTE_KEYWORD", self.size_byte_keyword),
            ("SEGMENT_ATTRIBUTES", self.segment_attributes),
            ("STORAGE", self.storage),
            ("TABLESPACE", self.tablespace),
            ("PARTITIONING", self.partitioning),
            ("BODY", self.body),
        ]
    }
}

/// Retrieves object DDL from a configured metadata service
pub struct DdlRetriever {
    service: Arc<dyn MetadataService>,
    options: RenderingOptions,
}

impl DdlRetriever {
    /// Apply `options` to the session and return a retriever bound to it
    ///
    /// # Errors
    ///
    /// Returns the service error if the preferences cannot be applied. This
    /// is fatal for the run.
    pub async fn configure(
        service: Arc<dyn MetadataService>,
        options: RenderingOptions,
    ) -> Result<Self> {
        service.configure(&options).await?;
        tracing::debug!(params = options.transform_params().len(), "Rendering preferences applied");
        Ok(Self { service, options })
    }

    /// The preferences this retriever was configured with
    pub fn options(&self) -> &RenderingOptions {
        &self.options
    }

    /// Fetch the DDL of one object
    ///
    /// # Errors
    ///
    /// Service failures become `TrackerError::ObjectNotRenderable`, a
    /// per-object error. A lost session stays `TrackerError::Connection`.
    pub async fn get_ddl(&self, object: &ObjectRef) -> Result<DdlText> {
        let rendered = self
            .service
            .render(object.object_type, &object.object_name, &object.schema)
            .await
            .map_err(|e| match e {
                TrackerError::Connection(_) => e,
                other => TrackerError::ObjectNotRenderable {
                    object: object.to_string(),
                    reason: other.to_string(),
                },
            })?;

        Ok(DdlText::from_rendered(rendered))
    }
}

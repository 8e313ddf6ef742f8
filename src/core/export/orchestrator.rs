//! Export orchestrator - drives one export run
//!
//! The orchestrator walks schemas × object types × objects in the order
//! given by the [`ExportPlan`], sending each object through the enumerator,
//! the retriever and the layout manager. Output directories are checked
//! against the overwrite policy before anything is written, and the
//! optional VCS stage brackets the loop.

use crate::adapters::database::{CatalogSource, MetadataService};
use crate::adapters::git::VcsRepository;
use crate::config::OverwriteScope;
use crate::core::enumerate::ObjectEnumerator;
use crate::core::export::plan::{dedup_in_order, ExportPlan};
use crate::core::export::progress::{ExportObserver, Phase, TracingObserver};
use crate::core::export::summary::ExportResult;
use crate::core::layout::OutputLayoutManager;
use crate::core::retrieve::DdlRetriever;
use crate::core::vcs::{commit_message, VcsSyncStage};
use crate::domain::{ObjectRef, ObjectType, Result, TrackerError};
use crate::log_object_failure;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Position of a run in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    RootPrepared,
    SchemaPrepared,
    TypeDirReady,
    Enumerated,
    Retrieved,
    Written,
    Completed,
    Aborted,
}

/// Export orchestrator
pub struct ExportOrchestrator {
    plan: ExportPlan,
    catalog: Arc<dyn CatalogSource>,
    metadata: Arc<dyn MetadataService>,
    vcs_repository: Option<Arc<dyn VcsRepository>>,
    observer: Arc<dyn ExportObserver>,
    shutdown: watch::Receiver<bool>,
    state: RunState,
}

impl ExportOrchestrator {
    /// Create an orchestrator for `plan`
    ///
    /// `shutdown` is checked between objects; once it reads `true` the run
    /// stops after the object in flight and skips publishing.
    pub fn new(
        plan: ExportPlan,
        catalog: Arc<dyn CatalogSource>,
        metadata: Arc<dyn MetadataService>,
        shutdown: watch::Receiver<bool>,
    ) -> Self {
        Self {
            plan,
            catalog,
            metadata,
            vcs_repository: None,
            observer: Arc::new(TracingObserver),
            shutdown,
            state: RunState::Idle,
        }
    }

    /// Repository used when the plan has a VCS target
    pub fn with_vcs_repository(mut self, repository: Arc<dyn VcsRepository>) -> Self {
        self.vcs_repository = Some(repository);
        self
    }

    /// Replace the default [`TracingObserver`]
    pub fn with_observer(mut self, observer: Arc<dyn ExportObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn plan(&self) -> &ExportPlan {
        &self.plan
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        tracing::trace!(from = ?self.state, to = ?next, "Run state");
        self.state = next;
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Execute the export
    ///
    /// Per-object failures are recorded in the returned [`ExportResult`].
    /// A publish failure is recorded in [`ExportResult::vcs`].
    ///
    /// # Errors
    ///
    /// Returns an error for whole-run failures: an output directory that
    /// exists without overwrite permission, a lost or unusable database
    /// session, or a working tree that cannot be prepared.
    pub async fn execute(&mut self) -> Result<ExportResult> {
        let start_time = Instant::now();
        let mut result = ExportResult::new(self.plan.dry_run);

        let label = format!("Exporting objects - for schemas: {:?}", self.plan.schemas);
        self.observer.phase_started(Phase::Run, &label);

        let outcome = if self.plan.dry_run {
            self.run_dry(&mut result).await
        } else {
            self.run_export(&mut result).await
        };

        self.observer
            .phase_finished(Phase::Run, &label, start_time.elapsed());

        match outcome {
            Ok(()) => {
                self.transition(RunState::Completed);
                Ok(result.with_duration(start_time.elapsed()))
            }
            Err(e) => {
                self.transition(RunState::Aborted);
                tracing::error!(error = %e, "Export aborted");
                Err(e)
            }
        }
    }

    fn enumerator(&self) -> ObjectEnumerator {
        ObjectEnumerator::new(
            Arc::clone(&self.catalog),
            self.plan.include_pattern.clone(),
            self.plan.exclude_pattern.clone(),
        )
    }

    /// Enumerate only: nothing is rendered, written or published
    async fn run_dry(&mut self, result: &mut ExportResult) -> Result<()> {
        let enumerator = self.enumerator();
        let schemas = dedup_in_order(&self.plan.schemas);
        let object_types = dedup_in_order(&self.plan.object_types);

        tracing::info!("Dry run: objects are enumerated but not exported");

        for schema in &schemas {
            if self.shutdown_requested() {
                result.interrupted = true;
                break;
            }
            if !self.check_schema(&enumerator, schema, result).await? {
                continue;
            }
            for &object_type in &object_types {
                if let Some(names) = self
                    .enumerate(&enumerator, schema, object_type, result)
                    .await?
                {
                    for name in &names {
                        tracing::info!(
                            object = %ObjectRef::new(schema.as_str(), object_type, name.as_str()),
                            "Would export"
                        );
                    }
                }
            }
        }
        Ok(())
    }

    async fn run_export(&mut self, result: &mut ExportResult) -> Result<()> {
        let layout = OutputLayoutManager::new(self.plan.output_root.clone());
        let enumerator = self.enumerator();
        let retriever =
            DdlRetriever::configure(Arc::clone(&self.metadata), self.plan.rendering).await?;

        let mut vcs_stage = match (&self.plan.vcs, &self.vcs_repository) {
            (Some(target), Some(repository)) => Some(VcsSyncStage::new(
                Arc::clone(repository),
                target.remote_url.as_str(),
                target.branch.as_str(),
            )),
            (Some(_), None) => {
                return Err(TrackerError::Configuration(
                    "A git repository is configured but no VCS backend was provided".to_string(),
                ))
            }
            (None, _) => None,
        };

        let schemas = dedup_in_order(&self.plan.schemas);
        let object_types = dedup_in_order(&self.plan.object_types);
        let overwrite = self.plan.overwrite;

        match self.plan.overwrite_scope {
            OverwriteScope::Root => {
                layout.prepare_root(overwrite)?;
                if let Some(stage) = vcs_stage.as_mut() {
                    self.prepare_vcs(stage, &layout).await?;
                }
            }
            OverwriteScope::Schema => {
                layout.preflight(&schemas, overwrite)?;
                match vcs_stage.as_mut() {
                    Some(stage) => {
                        let root_existed = layout.root().exists();
                        let root_vacant = layout.root_is_vacant()?;
                        self.prepare_vcs(stage, &layout).await?;
                        // The tree may already hold schema directories
                        if let Err(e) = layout.preflight(&schemas, overwrite) {
                            if root_vacant {
                                tracing::warn!(
                                    path = %layout.root().display(),
                                    "Removing working tree acquired for a refused run"
                                );
                                if let Err(cleanup) = layout.vacate_root(root_existed) {
                                    tracing::error!(error = %cleanup, "Failed to remove working tree");
                                }
                            }
                            return Err(e);
                        }
                    }
                    None => layout.ensure_root()?,
                }
            }
        }
        self.transition(RunState::RootPrepared);

        'schemas: for schema in &schemas {
            if self.shutdown_requested() {
                result.interrupted = true;
                break;
            }

            let schema_label = format!("Exporting objects - for schema: {schema}");
            let schema_start = Instant::now();
            self.observer.phase_started(Phase::Schema, &schema_label);

            if !self.check_schema(&enumerator, schema, result).await? {
                self.observer
                    .phase_finished(Phase::Schema, &schema_label, schema_start.elapsed());
                continue;
            }

            if self.plan.overwrite_scope == OverwriteScope::Schema {
                layout.prepare_schema_dir(schema, overwrite)?;
            }
            self.transition(RunState::SchemaPrepared);

            for &object_type in &object_types {
                let type_label = format!(
                    "Exporting object type: {object_type} - for schema: {schema}"
                );
                let type_start = Instant::now();
                self.observer.phase_started(Phase::ObjectType, &type_label);

                layout.ensure_type_dir(schema, object_type)?;
                self.transition(RunState::TypeDirReady);

                let names = self
                    .enumerate(&enumerator, schema, object_type, result)
                    .await?
                    .unwrap_or_default();

                for name in names {
                    if self.shutdown_requested() {
                        tracing::warn!("Shutdown requested, stopping after the current object");
                        result.interrupted = true;
                        self.observer.phase_finished(
                            Phase::ObjectType,
                            &type_label,
                            type_start.elapsed(),
                        );
                        self.observer.phase_finished(
                            Phase::Schema,
                            &schema_label,
                            schema_start.elapsed(),
                        );
                        break 'schemas;
                    }

                    let object = ObjectRef::new(schema.as_str(), object_type, name);
                    let object_label = format!(
                        "Exporting object: {} - {}.{}",
                        object_type, object.schema, object.object_name
                    );
                    let object_start = Instant::now();
                    self.observer.phase_started(Phase::Object, &object_label);

                    match self.export_object(&retriever, &layout, &object).await {
                        Ok(()) => result.record_success(&object),
                        Err(e) if is_per_object(&e) => {
                            log_object_failure!(&object, &e);
                            result.record_failure(&object, &e);
                        }
                        Err(e) => return Err(e),
                    }

                    self.observer
                        .phase_finished(Phase::Object, &object_label, object_start.elapsed());
                }

                self.observer
                    .phase_finished(Phase::ObjectType, &type_label, type_start.elapsed());
            }

            self.observer
                .phase_finished(Phase::Schema, &schema_label, schema_start.elapsed());
        }

        if let Some(stage) = vcs_stage.as_mut() {
            self.publish(stage, result).await;
        }

        Ok(())
    }

    /// Returns `false` (after recording the failure) when the schema is
    /// not visible to the session
    async fn check_schema(
        &self,
        enumerator: &ObjectEnumerator,
        schema: &str,
        result: &mut ExportResult,
    ) -> Result<bool> {
        match enumerator.ensure_schema(schema).await {
            Ok(()) => Ok(true),
            Err(e @ (TrackerError::SchemaNotFound(_) | TrackerError::QueryFailed(_))) => {
                tracing::error!(schema = %schema, error = %e, "Skipping schema");
                result.record_enumeration_failure(schema, None, &e);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    /// Enumerate one object type; query failures are recorded and yield `None`
    async fn enumerate(
        &mut self,
        enumerator: &ObjectEnumerator,
        schema: &str,
        object_type: ObjectType,
        result: &mut ExportResult,
    ) -> Result<Option<Vec<String>>> {
        match enumerator
            .list_objects_in_checked_schema(schema, object_type)
            .await
        {
            Ok(names) => {
                result.record_enumerated(schema, object_type, names.len());
                self.transition(RunState::Enumerated);
                tracing::info!(
                    schema = %schema,
                    object_type = %object_type,
                    count = names.len(),
                    "Objects to export"
                );
                Ok(Some(names))
            }
            Err(e @ (TrackerError::SchemaNotFound(_) | TrackerError::QueryFailed(_))) => {
                tracing::error!(
                    schema = %schema,
                    object_type = %object_type,
                    error = %e,
                    "Enumeration failed"
                );
                result.record_enumeration_failure(schema, Some(object_type), &e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn export_object(
        &mut self,
        retriever: &DdlRetriever,
        layout: &OutputLayoutManager,
        object: &ObjectRef,
    ) -> Result<()> {
        let path = layout.path_for(&object.schema, object.object_type, &object.object_name)?;
        let ddl = retriever.get_ddl(object).await?;
        self.transition(RunState::Retrieved);
        layout.write(&path, &ddl)?;
        self.transition(RunState::Written);
        Ok(())
    }

    async fn prepare_vcs(
        &self,
        stage: &mut VcsSyncStage,
        layout: &OutputLayoutManager,
    ) -> Result<()> {
        let label = format!("Cloning git repository: {}", stage.remote_url());
        let start = Instant::now();
        self.observer.phase_started(Phase::Vcs, &label);
        stage.prepare(layout.root()).await?;
        self.observer.phase_finished(Phase::Vcs, &label, start.elapsed());
        Ok(())
    }

    async fn publish(&self, stage: &mut VcsSyncStage, result: &mut ExportResult) {
        let Some(target) = self.plan.vcs.as_ref() else {
            return;
        };

        let outcome = if result.interrupted {
            stage.skipped("Export was interrupted")
        } else if result.has_failures() && !target.sync_on_partial_failure {
            stage.skipped(format!(
                "{} object(s) and {} enumeration(s) failed and git.sync_on_partial_failure is disabled",
                result.failures.len(),
                result.enumeration_failures.len()
            ))
        } else {
            let message = commit_message(&target.commit_message_prefix, chrono::Local::now());
            let label = format!(
                "Pushing changes to git repository: {} - branch: {} - with commit message: '{}'",
                target.remote_url, target.branch, message
            );
            let start = Instant::now();
            self.observer.phase_started(Phase::Vcs, &label);
            let outcome = stage.publish(message).await;
            self.observer.phase_finished(Phase::Vcs, &label, start.elapsed());
            outcome
        };

        result.set_vcs_outcome(outcome);
    }
}

/// Errors that fail one object without stopping the run
fn is_per_object(error: &TrackerError) -> bool {
    matches!(
        error,
        TrackerError::InvalidSegment { .. }
            | TrackerError::ObjectNotRenderable { .. }
            | TrackerError::Io(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_object_classification() {
        assert!(is_per_object(&TrackerError::Io("disk full".to_string())));
        assert!(is_per_object(&TrackerError::InvalidSegment {
            segment: "a/b".to_string(),
            reason: "separator".to_string(),
        }));
        assert!(!is_per_object(&TrackerError::Connection("ORA-03113".to_string())));
        assert!(!is_per_object(&TrackerError::DirectoryExists {
            path: "out".into()
        }));
    }
}

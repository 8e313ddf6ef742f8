//! Shared fixtures for integration tests
//!
//! [`InMemoryDatabase`] stands in for a live session on both the catalog
//! and the metadata side. [`RecordingRepository`] stands in for git and
//! records every call it receives.

#![allow(dead_code)]

use async_trait::async_trait;
use object_tracker::adapters::database::{CatalogObject, CatalogSource, MetadataService};
use object_tracker::adapters::git::{VcsRepository, WorkingTree};
use object_tracker::core::retrieve::RenderingOptions;
use object_tracker::domain::{ObjectType, Result, TrackerError, VcsError};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// In-memory catalog and metadata service
#[derive(Default)]
pub struct InMemoryDatabase {
    schemas: BTreeSet<String>,
    objects: BTreeMap<(String, ObjectType), Vec<CatalogObject>>,
    ddl: HashMap<(String, String), String>,
    unrenderable: HashSet<String>,
    failing_enumerations: HashSet<(String, ObjectType)>,
    lost_session_on: Option<String>,
    shutdown_after: Option<(usize, watch::Sender<bool>)>,
    configured: Mutex<Option<RenderingOptions>>,
    renders: Mutex<Vec<String>>,
    rendered_unconfigured: Mutex<bool>,
    schema_checks: Mutex<usize>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schemas.insert(schema.to_string());
        self
    }

    pub fn with_object(mut self, schema: &str, object_type: ObjectType, name: &str) -> Self {
        self.schemas.insert(schema.to_string());
        self.objects
            .entry((schema.to_string(), object_type))
            .or_default()
            .push(CatalogObject::new(name));
        self
    }

    pub fn with_generated(mut self, schema: &str, object_type: ObjectType, name: &str) -> Self {
        self.schemas.insert(schema.to_string());
        self.objects
            .entry((schema.to_string(), object_type))
            .or_default()
            .push(CatalogObject::generated(name));
        self
    }

    pub fn with_ddl(mut self, schema: &str, name: &str, ddl: &str) -> Self {
        self.ddl
            .insert((schema.to_string(), name.to_string()), ddl.to_string());
        self
    }

    /// Rendering `name` fails with a metadata error
    pub fn failing_render(mut self, name: &str) -> Self {
        self.unrenderable.insert(name.to_string());
        self
    }

    /// Enumerating `object_type` in `schema` fails with a query error
    pub fn failing_enumeration(mut self, schema: &str, object_type: ObjectType) -> Self {
        self.failing_enumerations
            .insert((schema.to_string(), object_type));
        self
    }

    /// Rendering `name` reports a lost session
    pub fn losing_session_on(mut self, name: &str) -> Self {
        self.lost_session_on = Some(name.to_string());
        self
    }

    /// Raise the shutdown flag once `renders` objects have been rendered
    pub fn shutdown_after(mut self, renders: usize, sender: watch::Sender<bool>) -> Self {
        self.shutdown_after = Some((renders, sender));
        self
    }

    /// `SHORT_NAME SCHEMA.NAME` for every render call, in order
    pub fn renders(&self) -> Vec<String> {
        self.renders.lock().unwrap().clone()
    }

    /// Number of schema existence queries received
    pub fn schema_checks(&self) -> usize {
        *self.schema_checks.lock().unwrap()
    }

    pub fn configured_with(&self) -> Option<RenderingOptions> {
        *self.configured.lock().unwrap()
    }

    pub fn rendered_before_configure(&self) -> bool {
        *self.rendered_unconfigured.lock().unwrap()
    }

    pub fn default_ddl(object_type: ObjectType, schema: &str, name: &str) -> String {
        format!(
            "CREATE {} \"{}\".\"{}\"",
            object_type.catalog_name(),
            schema,
            name
        )
    }
}

#[async_trait]
impl CatalogSource for InMemoryDatabase {
    async fn schema_exists(&self, schema: &str) -> Result<bool> {
        *self.schema_checks.lock().unwrap() += 1;
        Ok(self.schemas.contains(schema))
    }

    async fn list_objects(
        &self,
        schema: &str,
        object_type: ObjectType,
    ) -> Result<Vec<CatalogObject>> {
        if self
            .failing_enumerations
            .contains(&(schema.to_string(), object_type))
        {
            return Err(TrackerError::QueryFailed(
                "ORA-00942: table or view does not exist".to_string(),
            ));
        }
        Ok(self
            .objects
            .get(&(schema.to_string(), object_type))
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl MetadataService for InMemoryDatabase {
    async fn configure(&self, options: &RenderingOptions) -> Result<()> {
        *self.configured.lock().unwrap() = Some(*options);
        Ok(())
    }

    async fn render(
        &self,
        object_type: ObjectType,
        object_name: &str,
        schema: &str,
    ) -> Result<String> {
        if self.configured.lock().unwrap().is_none() {
            *self.rendered_unconfigured.lock().unwrap() = true;
        }

        let count = {
            let mut renders = self.renders.lock().unwrap();
            renders.push(format!(
                "{} {}.{}",
                object_type.short_name(),
                schema,
                object_name
            ));
            renders.len()
        };
        if let Some((after, sender)) = &self.shutdown_after {
            if count >= *after {
                let _ = sender.send(true);
            }
        }

        if self.lost_session_on.as_deref() == Some(object_name) {
            return Err(TrackerError::Connection(
                "ORA-03113: end-of-file on communication channel".to_string(),
            ));
        }
        if self.unrenderable.contains(object_name) {
            return Err(TrackerError::QueryFailed(format!(
                "ORA-31603: object \"{object_name}\" of type {} not found in schema \"{schema}\"",
                object_type.short_name()
            )));
        }

        Ok(self
            .ddl
            .get(&(schema.to_string(), object_name.to_string()))
            .cloned()
            .unwrap_or_else(|| Self::default_ddl(object_type, schema, object_name)))
    }
}

/// Call log shared between a repository and the trees it hands out
#[derive(Default)]
pub struct CallLog {
    calls: Mutex<Vec<String>>,
    staged_files: Mutex<Vec<usize>>,
}

impl CallLog {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of `.sql` files under the tree each time it was staged
    pub fn staged_files(&self) -> Vec<usize> {
        self.staged_files.lock().unwrap().clone()
    }

    fn push(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

/// Records every repository call
pub struct RecordingRepository {
    pub log: Arc<CallLog>,
    pub fail_acquire: bool,
    pub fail_push: bool,
    pub no_changes: bool,
    /// Files (relative path, content) the acquired tree already holds
    pub seed_files: Vec<(String, String)>,
}

impl RecordingRepository {
    pub fn new() -> Self {
        Self {
            log: Arc::new(CallLog::default()),
            fail_acquire: false,
            fail_push: false,
            no_changes: false,
            seed_files: Vec::new(),
        }
    }
}

struct RecordingTree {
    log: Arc<CallLog>,
    path: PathBuf,
    fail_push: bool,
    no_changes: bool,
}

impl VcsRepository for RecordingRepository {
    fn acquire_working_tree(
        &self,
        remote_url: &str,
        root: &Path,
    ) -> std::result::Result<Box<dyn WorkingTree>, VcsError> {
        self.log.push(format!("acquire {remote_url}"));
        if self.fail_acquire {
            return Err(VcsError::Acquire("authentication required".to_string()));
        }
        std::fs::create_dir_all(root).map_err(|e| VcsError::Acquire(e.to_string()))?;
        for (rel, content) in &self.seed_files {
            let path = root.join(rel);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| VcsError::Acquire(e.to_string()))?;
            }
            std::fs::write(&path, content).map_err(|e| VcsError::Acquire(e.to_string()))?;
        }
        Ok(Box::new(RecordingTree {
            log: Arc::clone(&self.log),
            path: root.to_path_buf(),
            fail_push: self.fail_push,
            no_changes: self.no_changes,
        }))
    }
}

impl WorkingTree for RecordingTree {
    fn path(&self) -> &Path {
        &self.path
    }

    fn switch_or_create_branch(&mut self, branch: &str) -> std::result::Result<(), VcsError> {
        self.log.push(format!("branch {branch}"));
        Ok(())
    }

    fn stage_all(&mut self) -> std::result::Result<(), VcsError> {
        self.log.push("stage".to_string());
        self.log
            .staged_files
            .lock()
            .unwrap()
            .push(sql_files(&self.path).len());
        Ok(())
    }

    fn commit(&mut self, message: &str) -> std::result::Result<Option<String>, VcsError> {
        self.log.push(format!("commit {message}"));
        if self.no_changes {
            Ok(None)
        } else {
            Ok(Some("0123abcd".to_string()))
        }
    }

    fn push(&mut self, branch: &str) -> std::result::Result<(), VcsError> {
        self.log.push(format!("push {branch}"));
        if self.fail_push {
            return Err(VcsError::Push {
                branch: branch.to_string(),
                message: "rejected: non-fast-forward".to_string(),
            });
        }
        Ok(())
    }
}

/// Every `.sql` file under `root`, relative and sorted
pub fn sql_files(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        let Ok(entries) = std::fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else if path.extension().map(|e| e == "sql").unwrap_or(false) {
                if let Ok(rel) = path.strip_prefix(root) {
                    out.push(rel.to_string_lossy().replace('\\', "/"));
                }
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}

//! Version-control synchronisation around an export run
//!
//! The stage runs twice per run: [`VcsSyncStage::prepare`] before the first
//! write and [`VcsSyncStage::publish`] after the last one. It never runs
//! while objects are being written. Repository work is blocking, so each
//! call moves the working tree onto a blocking thread and takes it back.

use crate::adapters::git::{VcsRepository, WorkingTree};
use crate::core::export::summary::{VcsOutcome, VcsStatus};
use crate::domain::{Result, TrackerError, VcsError};
use std::path::Path;
use std::sync::Arc;

/// Drives a [`VcsRepository`] for one run
pub struct VcsSyncStage {
    repository: Arc<dyn VcsRepository>,
    remote_url: String,
    branch: String,
    tree: Option<Box<dyn WorkingTree>>,
}

impl VcsSyncStage {
    pub fn new(
        repository: Arc<dyn VcsRepository>,
        remote_url: impl Into<String>,
        branch: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            remote_url: remote_url.into(),
            branch: branch.into(),
            tree: None,
        }
    }

    pub fn remote_url(&self) -> &str {
        &self.remote_url
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    /// Acquire the working tree at `root` and check out the target branch
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::Vcs` if the tree cannot be acquired or the
    /// branch cannot be checked out. Both are fatal for the run.
    pub async fn prepare(&mut self, root: &Path) -> Result<()> {
        let repository = Arc::clone(&self.repository);
        let remote_url = self.remote_url.clone();
        let branch = self.branch.clone();
        let root = root.to_path_buf();

        let tree = tokio::task::spawn_blocking(move || -> std::result::Result<_, VcsError> {
            let mut tree = repository.acquire_working_tree(&remote_url, &root)?;
            tree.switch_or_create_branch(&branch)?;
            Ok(tree)
        })
        .await
        .map_err(|e| TrackerError::Other(format!("VCS task failed: {e}")))??;

        tracing::info!(
            remote = %self.remote_url,
            branch = %self.branch,
            path = %tree.path().display(),
            "Working tree ready"
        );
        self.tree = Some(tree);
        Ok(())
    }

    /// Stage everything, commit with `message` and push
    ///
    /// Failures never propagate: they are returned as a
    /// [`VcsStatus::Failed`] outcome so the export result stays intact.
    pub async fn publish(&mut self, message: String) -> VcsOutcome {
        let Some(mut tree) = self.tree.take() else {
            return self.outcome(
                VcsStatus::Failed,
                None,
                Some("Working tree was not prepared".to_string()),
            );
        };
        let branch = self.branch.clone();

        let joined = tokio::task::spawn_blocking(move || {
            let result = commit_and_push(&mut *tree, &branch, &message);
            (tree, result)
        })
        .await;

        match joined {
            Ok((tree, Ok(commit_id))) => {
                self.tree = Some(tree);
                let status = if commit_id.is_some() {
                    VcsStatus::Pushed
                } else {
                    VcsStatus::NoChanges
                };
                self.outcome(status, commit_id, None)
            }
            Ok((tree, Err(e))) => {
                self.tree = Some(tree);
                tracing::error!(error = %e, branch = %self.branch, "Publishing to remote failed");
                self.outcome(VcsStatus::Failed, None, Some(e.to_string()))
            }
            Err(e) => self.outcome(VcsStatus::Failed, None, Some(format!("VCS task failed: {e}"))),
        }
    }

    /// Outcome for a publish that was deliberately not attempted
    pub fn skipped(&self, reason: impl Into<String>) -> VcsOutcome {
        let reason = reason.into();
        tracing::warn!(reason = %reason, "Skipping publish to remote");
        self.outcome(VcsStatus::Skipped, None, Some(reason))
    }

    fn outcome(&self, status: VcsStatus, commit_id: Option<String>, message: Option<String>) -> VcsOutcome {
        VcsOutcome {
            remote: self.remote_url.clone(),
            branch: self.branch.clone(),
            status,
            commit_id,
            message,
        }
    }
}

fn commit_and_push(
    tree: &mut dyn WorkingTree,
    branch: &str,
    message: &str,
) -> std::result::Result<Option<String>, VcsError> {
    tree.stage_all()?;
    match tree.commit(message)? {
        Some(commit_id) => {
            tree.push(branch)?;
            Ok(Some(commit_id))
        }
        None => Ok(None),
    }
}

/// Commit message for a run finished at `timestamp`
pub fn commit_message(prefix: &str, timestamp: chrono::DateTime<chrono::Local>) -> String {
    format!("{} - {}.", prefix, timestamp.format("%Y-%m-%d %H:%M:%S%.6f"))
}

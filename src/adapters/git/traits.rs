//! Version-control abstraction traits
//!
//! The export engine drives a repository through these traits only.
//! Implementations are synchronous; callers move them onto a blocking
//! thread.

use crate::domain::VcsError;
use std::path::Path;

/// Access to a remote repository
pub trait VcsRepository: Send + Sync {
    /// Obtain a working tree at `root` tracking `remote_url`
    ///
    /// Clones when `root` is absent or an empty directory, otherwise opens
    /// the existing tree and refreshes it from the remote.
    ///
    /// # Errors
    ///
    /// Returns `VcsError::Acquire` if the tree cannot be cloned or opened.
    fn acquire_working_tree(
        &self,
        remote_url: &str,
        root: &Path,
    ) -> Result<Box<dyn WorkingTree>, VcsError>;
}

/// A checked-out working tree
pub trait WorkingTree: Send {
    /// Working tree root
    fn path(&self) -> &Path;

    /// Check out `branch`, creating it when it does not exist
    ///
    /// Idempotent: calling it for the current branch is a no-op.
    fn switch_or_create_branch(&mut self, branch: &str) -> Result<(), VcsError>;

    /// Stage every addition, modification and deletion in the tree
    fn stage_all(&mut self) -> Result<(), VcsError>;

    /// Commit the staged changes
    ///
    /// Returns the new commit id, or `None` when nothing changed since the
    /// last commit.
    fn commit(&mut self, message: &str) -> Result<Option<String>, VcsError>;

    /// Push `branch` to the remote the tree was acquired from
    fn push(&mut self, branch: &str) -> Result<(), VcsError>;
}

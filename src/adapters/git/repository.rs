//! libgit2-backed repository implementation

use super::traits::{VcsRepository, WorkingTree};
use crate::config::{GitConfig, SecretString};
use crate::domain::VcsError;
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    BranchType, Cred, CredentialType, ErrorCode, FetchOptions, IndexAddOption, PushOptions,
    RemoteCallbacks, Repository, Signature,
};
use secrecy::ExposeSecret;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Name of the remote every working tree pushes to
pub const REMOTE_NAME: &str = "origin";

// libgit2 keeps asking while the callback returns credentials
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Credentials for remote operations
#[derive(Debug, Clone, Default)]
pub struct GitCredentials {
    /// Private key for SSH remotes; the SSH agent is tried when unset
    pub ssh_key_path: Option<PathBuf>,
    /// Username for HTTPS remotes
    pub username: Option<String>,
    /// Token or password for HTTPS remotes
    pub token: Option<SecretString>,
}

impl GitCredentials {
    fn callbacks(&self) -> RemoteCallbacks<'static> {
        let ssh_key_path = self.ssh_key_path.clone();
        let username = self.username.clone();
        let token = self.token.clone();
        let mut attempts = 0;

        let mut callbacks = RemoteCallbacks::new();
        callbacks.credentials(move |_url, username_from_url, allowed_types| {
            attempts += 1;
            if attempts > MAX_CREDENTIAL_ATTEMPTS {
                return Err(git2::Error::from_str("authentication failed"));
            }

            let user = username_from_url.unwrap_or("git");
            if allowed_types.contains(CredentialType::SSH_KEY) {
                return match &ssh_key_path {
                    Some(key_path) => Cred::ssh_key(user, None, key_path, None),
                    None => Cred::ssh_key_from_agent(user),
                };
            }

            if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
                if let (Some(user), Some(token)) = (&username, &token) {
                    return Cred::userpass_plaintext(user, token.expose_secret().as_ref());
                }
            }

            Cred::default()
        });
        callbacks
    }
}

/// Repository access through libgit2
#[derive(Debug, Clone)]
pub struct Git2Repository {
    credentials: GitCredentials,
    author_name: String,
    author_email: String,
}

impl Git2Repository {
    pub fn new(
        credentials: GitCredentials,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
    ) -> Self {
        Self {
            credentials,
            author_name: author_name.into(),
            author_email: author_email.into(),
        }
    }

    /// Build from the `[git]` configuration section
    pub fn from_config(config: &GitConfig) -> Self {
        let credentials = GitCredentials {
            ssh_key_path: config.ssh_key_path.as_ref().map(PathBuf::from),
            username: config.username.clone(),
            token: config.token.clone(),
        };
        Self::new(credentials, &config.author_name, &config.author_email)
    }

    fn clone_into(&self, remote_url: &str, root: &Path) -> Result<Repository, VcsError> {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(self.credentials.callbacks());

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);

        let repo = builder.clone(remote_url, root).map_err(|e| {
            VcsError::Acquire(format!("Failed to clone {remote_url}: {}", e.message()))
        })?;

        info!(remote = %remote_url, path = %root.display(), "Cloned repository");
        Ok(repo)
    }

    fn open_existing(&self, remote_url: &str, root: &Path) -> Result<Repository, VcsError> {
        let repo = Repository::open(root).map_err(|e| {
            VcsError::Acquire(format!(
                "{} is not empty and is not a git working tree: {}",
                root.display(),
                e.message()
            ))
        })?;

        {
            let mut remote = repo.find_remote(REMOTE_NAME).map_err(|e| {
                VcsError::Acquire(format!("Remote '{REMOTE_NAME}' not configured: {}", e.message()))
            })?;

            if remote.url() != Some(remote_url) {
                warn!(
                    configured = remote.url().unwrap_or_default(),
                    requested = %remote_url,
                    "Existing working tree tracks a different remote URL"
                );
            }

            let mut fetch_options = FetchOptions::new();
            fetch_options.remote_callbacks(self.credentials.callbacks());
            let no_refspecs: [&str; 0] = [];
            remote
                .fetch(&no_refspecs, Some(&mut fetch_options), None)
                .map_err(|e| VcsError::Acquire(format!("Failed to fetch: {}", e.message())))?;
        }

        info!(path = %root.display(), "Opened existing working tree");
        Ok(repo)
    }
}

impl VcsRepository for Git2Repository {
    fn acquire_working_tree(
        &self,
        remote_url: &str,
        root: &Path,
    ) -> Result<Box<dyn WorkingTree>, VcsError> {
        let repo = if is_absent_or_empty(root)? {
            self.clone_into(remote_url, root)?
        } else {
            self.open_existing(remote_url, root)?
        };

        Ok(Box::new(Git2WorkingTree {
            repo,
            path: root.to_path_buf(),
            credentials: self.credentials.clone(),
            author_name: self.author_name.clone(),
            author_email: self.author_email.clone(),
        }))
    }
}

fn is_absent_or_empty(root: &Path) -> Result<bool, VcsError> {
    if !root.exists() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(root)
        .map_err(|e| VcsError::Acquire(format!("Cannot read {}: {}", root.display(), e)))?;
    Ok(entries.next().is_none())
}

/// A working tree opened through libgit2
pub struct Git2WorkingTree {
    repo: Repository,
    path: PathBuf,
    credentials: GitCredentials,
    author_name: String,
    author_email: String,
}

impl Git2WorkingTree {
    fn branch_error(branch: &str, e: git2::Error) -> VcsError {
        VcsError::Branch {
            branch: branch.to_string(),
            message: e.message().to_string(),
        }
    }

    /// Move a local branch forward to its remote-tracking branch when the
    /// remote is strictly ahead
    fn fast_forward(&self, branch: &str) -> Result<(), git2::Error> {
        let local = self.repo.find_branch(branch, BranchType::Local)?;
        let remote = match self
            .repo
            .find_branch(&format!("{REMOTE_NAME}/{branch}"), BranchType::Remote)
        {
            Ok(remote) => remote,
            Err(_) => return Ok(()),
        };

        let local_oid = local.get().peel_to_commit()?.id();
        let remote_oid = remote.get().peel_to_commit()?.id();
        if local_oid == remote_oid {
            return Ok(());
        }

        if self.repo.graph_descendant_of(remote_oid, local_oid)? {
            let mut reference = self.repo.find_reference(&format!("refs/heads/{branch}"))?;
            reference.set_target(remote_oid, "Fast-forward to remote")?;
            debug!(branch = %branch, "Fast-forwarded local branch");
        } else if !self.repo.graph_descendant_of(local_oid, remote_oid)? {
            warn!(branch = %branch, "Local branch has diverged from the remote; push may be rejected");
        }
        Ok(())
    }

    fn head_commit(&self) -> Result<Option<git2::Commit<'_>>, git2::Error> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl WorkingTree for Git2WorkingTree {
    fn path(&self) -> &Path {
        &self.path
    }

    fn switch_or_create_branch(&mut self, branch: &str) -> Result<(), VcsError> {
        let refname = format!("refs/heads/{branch}");

        if self.repo.find_branch(branch, BranchType::Local).is_ok() {
            self.fast_forward(branch)
                .map_err(|e| Self::branch_error(branch, e))?;
        } else if let Ok(remote) = self
            .repo
            .find_branch(&format!("{REMOTE_NAME}/{branch}"), BranchType::Remote)
        {
            let commit = remote
                .get()
                .peel_to_commit()
                .map_err(|e| Self::branch_error(branch, e))?;
            let mut local = self
                .repo
                .branch(branch, &commit, false)
                .map_err(|e| Self::branch_error(branch, e))?;
            local
                .set_upstream(Some(&format!("{REMOTE_NAME}/{branch}")))
                .map_err(|e| Self::branch_error(branch, e))?;
            debug!(branch = %branch, "Created local branch from remote");
        } else {
            let head = self
                .head_commit()
                .map_err(|e| Self::branch_error(branch, e))?;
            match head {
                Some(commit) => {
                    self.repo
                        .branch(branch, &commit, false)
                        .map_err(|e| Self::branch_error(branch, e))?;
                    info!(branch = %branch, "Created new branch from HEAD");
                }
                None => {
                    // Empty repository: HEAD stays unborn until the first commit
                    self.repo
                        .set_head(&refname)
                        .map_err(|e| Self::branch_error(branch, e))?;
                    info!(branch = %branch, "Repository is empty; branch starts with the next commit");
                    return Ok(());
                }
            }
        }

        self.repo
            .set_head(&refname)
            .map_err(|e| Self::branch_error(branch, e))?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(|e| Self::branch_error(branch, e))?;

        info!(branch = %branch, "Checked out branch");
        Ok(())
    }

    fn stage_all(&mut self) -> Result<(), VcsError> {
        let stage = |repo: &Repository| -> Result<(), git2::Error> {
            let mut index = repo.index()?;
            index.add_all(["*"], IndexAddOption::DEFAULT, None)?;
            index.update_all(["*"], None)?;
            index.write()
        };
        stage(&self.repo).map_err(|e| VcsError::Commit(format!("Failed to stage: {}", e.message())))?;

        debug!(path = %self.path.display(), "Staged all changes");
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<Option<String>, VcsError> {
        let to_vcs = |e: git2::Error| VcsError::Commit(e.message().to_string());

        let mut index = self.repo.index().map_err(to_vcs)?;
        let tree_id = index.write_tree().map_err(to_vcs)?;
        let tree = self.repo.find_tree(tree_id).map_err(to_vcs)?;
        let parent = self.head_commit().map_err(to_vcs)?;

        let unchanged = match &parent {
            Some(parent) => parent.tree_id() == tree_id,
            None => tree.is_empty(),
        };
        if unchanged {
            info!("No changes to commit");
            return Ok(None);
        }

        let signature = Signature::now(&self.author_name, &self.author_email).map_err(to_vcs)?;
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();
        let oid = self
            .repo
            .commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)
            .map_err(to_vcs)?;

        info!(commit = %oid, "Committed changes: {}", message);
        Ok(Some(oid.to_string()))
    }

    fn push(&mut self, branch: &str) -> Result<(), VcsError> {
        let push_error = |message: String| VcsError::Push {
            branch: branch.to_string(),
            message,
        };

        let mut remote = self
            .repo
            .find_remote(REMOTE_NAME)
            .map_err(|e| push_error(e.message().to_string()))?;

        let mut callbacks = self.credentials.callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(reason) => Err(git2::Error::from_str(&format!(
                "remote rejected {refname}: {reason}"
            ))),
            None => Ok(()),
        });

        let mut push_options = PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");
        remote
            .push(&[refspec.as_str()], Some(&mut push_options))
            .map_err(|e| push_error(e.message().to_string()))?;

        info!(branch = %branch, remote = REMOTE_NAME, "Pushed branch");
        Ok(())
    }
}

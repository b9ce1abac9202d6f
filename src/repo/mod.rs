//! Repository adapter
//!
//! Git primitives against one explicit working directory. Nothing here
//! depends on the process's current directory: every implementation is
//! bound to the path it was opened with.

mod git;

pub use git::{GitCli, GitCliProvider};

use crate::error::Result;
use crate::types::ObservedState;
use std::path::Path;
use tracing::debug;

/// Working tree status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoStatus {
    /// No staged, unstaged or untracked changes
    pub is_clean: bool,
    /// Checked out branch, `None` when HEAD is detached
    pub current_branch: Option<String>,
}

/// Git operations on a single working directory
///
/// Implemented by [`GitCli`] for real repositories; tests provide in-memory
/// implementations.
pub trait GitRepository {
    /// Working directory this repository is bound to
    fn root(&self) -> &Path;

    /// Current branch and cleanliness
    fn status(&self) -> Result<RepoStatus>;

    /// Fetch from a remote
    fn fetch(&self, remote: &str) -> Result<()>;

    /// Fast-forward the checked out branch from `remote/branch`
    fn pull(&self, remote: &str, branch: &str) -> Result<()>;

    /// Check out an existing local branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create a local branch tracking `remote/branch` and check it out
    fn checkout_tracking(&self, remote: &str, branch: &str) -> Result<()>;

    /// Create a branch at HEAD and check it out
    fn create_branch(&self, name: &str) -> Result<()>;

    /// Delete a fully merged local branch
    fn delete_branch(&self, name: &str) -> Result<()>;

    /// Local branch names
    fn local_branches(&self) -> Result<Vec<String>>;

    /// Remote-tracking branch names for `remote`, without the remote prefix
    fn remote_branches(&self, remote: &str) -> Result<Vec<String>>;

    /// Branch the remote's `HEAD` points to, if known locally
    fn remote_head(&self, remote: &str) -> Result<Option<String>>;

    /// Stash all changes including untracked files
    fn stash(&self, message: &str) -> Result<()>;

    /// Stash entries, newest first
    fn stash_list(&self) -> Result<Vec<String>>;

    /// Stage paths (relative to the root)
    fn add(&self, paths: &[&str]) -> Result<()>;

    /// Commit staged changes; a non-empty `paths` commits only those paths
    fn commit(&self, message: &str, paths: &[&str]) -> Result<()>;

    /// Push a branch
    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()>;

    /// Whether a local branch has an upstream configured
    fn has_upstream(&self, branch: &str) -> Result<bool>;

    /// URL of a remote, `None` if the remote does not exist
    fn remote_url(&self, name: &str) -> Result<Option<String>>;

    /// Full hash of HEAD
    fn head_commit(&self) -> Result<String>;

    /// Revision recorded for a submodule path in HEAD's tree
    fn recorded_pointer(&self, path: &str) -> Result<Option<String>> {
        self.recorded_pointer_at("HEAD", path)
    }

    /// Revision recorded for a submodule path in the tree of `revision`
    fn recorded_pointer_at(&self, revision: &str, path: &str) -> Result<Option<String>>;

    /// Subjects of commits reachable from `head` but not `base`, newest first
    fn commit_subjects(&self, base: &str, head: &str) -> Result<Vec<String>>;
}

/// Opens repositories by path
pub trait RepositoryProvider {
    /// Open the repository whose working directory is exactly `path`
    fn open(&self, path: &Path) -> Result<Box<dyn GitRepository>>;
}

/// Resolve a repository's default branch
///
/// Order: the branch declared in `.gitmodules`, the remote's symbolic
/// `HEAD`, then the first fallback that exists locally or on the remote,
/// then the first fallback unconditionally.
pub fn resolve_default_branch(
    repo: &dyn GitRepository,
    remote: &str,
    declared: Option<&str>,
    fallbacks: &[String],
) -> Result<String> {
    if let Some(branch) = declared {
        debug!(branch, "using declared default branch");
        return Ok(branch.to_string());
    }

    if let Some(branch) = repo.remote_head(remote)? {
        debug!(branch = %branch, "using remote HEAD as default branch");
        return Ok(branch);
    }

    let local = repo.local_branches()?;
    let remote_branches = repo.remote_branches(remote)?;
    for candidate in fallbacks {
        if local.contains(candidate) || remote_branches.contains(candidate) {
            debug!(branch = %candidate, "using fallback default branch");
            return Ok(candidate.clone());
        }
    }

    Ok(fallbacks
        .first()
        .cloned()
        .unwrap_or_else(|| "main".to_string()))
}

/// Query status and default branch together
pub fn observe(
    repo: &dyn GitRepository,
    remote: &str,
    declared: Option<&str>,
    fallbacks: &[String],
) -> Result<ObservedState> {
    let status = repo.status()?;
    let default_branch = resolve_default_branch(repo, remote, declared, fallbacks)?;
    Ok(ObservedState {
        current_branch: status.current_branch,
        is_clean: status.is_clean,
        default_branch,
    })
}

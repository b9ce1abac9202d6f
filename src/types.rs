//! Core types for subflow

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix for every feature branch
pub const FEATURE_PREFIX: &str = "feature/";

/// A linked repository declared by the parent repository
///
/// Identity is `path`. Observed state (branch, cleanliness) is kept out of
/// this type on purpose: see [`ObservedState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedRepository {
    /// Submodule name
    pub name: String,
    /// Path relative to the parent repository root (forward slashes)
    pub path: String,
    /// Remote URL
    pub url: String,
    /// Tracked branch declared in `.gitmodules`, if any
    pub branch: Option<String>,
}

impl LinkedRepository {
    /// Absolute working directory under the given parent root
    pub fn absolute_path(&self, parent_root: &std::path::Path) -> PathBuf {
        parent_root.join(&self.path)
    }
}

/// Live state of a repository, re-queried at every decision point
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedState {
    /// Checked out branch, `None` when HEAD is detached
    pub current_branch: Option<String>,
    /// Whether the working tree has no changes (untracked files count as changes)
    pub is_clean: bool,
    /// Resolved default branch
    pub default_branch: String,
}

/// Outcome of reconciling one linked repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Clean and up to date with its tracked remote branch
    Synced,
    /// Deliberately left alone (e.g. uncommitted changes)
    Skipped,
    /// An adapter call failed
    Failed,
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synced => write!(f, "synced"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Result of reconciling one linked repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationResult {
    /// Repository this result describes
    pub repository: LinkedRepository,
    /// What happened
    pub outcome: Outcome,
    /// Human-readable detail (branch synced, skip reason, error message)
    pub detail: String,
    /// Stash created during this run, if any
    pub stash: Option<String>,
}

impl ReconciliationResult {
    /// Shorthand for a `Synced` result
    pub fn synced(repository: &LinkedRepository, detail: impl Into<String>) -> Self {
        Self::new(repository, Outcome::Synced, detail)
    }

    /// Shorthand for a `Skipped` result
    pub fn skipped(repository: &LinkedRepository, detail: impl Into<String>) -> Self {
        Self::new(repository, Outcome::Skipped, detail)
    }

    /// Shorthand for a `Failed` result
    pub fn failed(repository: &LinkedRepository, detail: impl Into<String>) -> Self {
        Self::new(repository, Outcome::Failed, detail)
    }

    fn new(repository: &LinkedRepository, outcome: Outcome, detail: impl Into<String>) -> Self {
        Self {
            repository: repository.clone(),
            outcome,
            detail: detail.into(),
            stash: None,
        }
    }
}

/// A feature branch inside one linked repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureBranch {
    /// Linked repository (service) name
    pub service_name: String,
    /// Feature name as typed by the user
    pub feature_name: String,
    /// Full branch name, always `feature/<feature_name>`
    pub branch_name: String,
}

impl FeatureBranch {
    /// Build the branch value for a feature
    pub fn new(service_name: impl Into<String>, feature_name: impl Into<String>) -> Self {
        let feature_name = feature_name.into();
        Self {
            service_name: service_name.into(),
            branch_name: format!("{FEATURE_PREFIX}{feature_name}"),
            feature_name,
        }
    }

    /// Feature name encoded in a branch name (prefix stripped when present)
    pub fn feature_name_of(branch: &str) -> &str {
        branch.strip_prefix(FEATURE_PREFIX).unwrap_or(branch)
    }
}

/// A pull request / merge request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR/MR number
    pub number: u64,
    /// Web URL for the PR/MR
    pub html_url: String,
    /// Base branch name
    pub base_ref: String,
    /// Head branch name
    pub head_ref: String,
    /// PR/MR title
    pub title: String,
    /// Whether PR is a draft
    pub is_draft: bool,
}

/// One linked repository whose HEAD differs from the parent's recorded pointer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerChange {
    /// Linked repository name
    pub repository: String,
    /// Path relative to the parent root
    pub path: String,
    /// Revision recorded by the parent (`None` if not yet recorded)
    pub old_revision: Option<String>,
    /// Current HEAD of the linked repository
    pub new_revision: String,
}

/// Pointer changes not yet reflected in the parent repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointerChangeSet {
    /// One entry per moved linked repository, in registry order
    pub entries: Vec<PointerChange>,
}

impl PointerChangeSet {
    /// No linked repository moved
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of moved linked repositories
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Paths to stage in the parent
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    /// Names of the moved linked repositories
    pub fn repository_names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.repository.as_str()).collect()
    }
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}

//! Error types for subflow

use std::path::PathBuf;
use thiserror::Error;

/// How the caller is expected to react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Caller must fix state before retrying; never auto-resolved
    Precondition,
    /// Local and remote state disagree in a way that needs an explicit choice
    Conflict,
    /// Network or remote failure; the same operation can be retried
    Transient,
    /// Not a valid repository or corrupt configuration; stop immediately
    Fatal,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Precondition => write!(f, "precondition"),
            Self::Conflict => write!(f, "conflict"),
            Self::Transient => write!(f, "transient"),
            Self::Fatal => write!(f, "fatal"),
        }
    }
}

/// Errors produced by subflow
#[derive(Debug, Error)]
pub enum Error {
    /// Linked repository is not registered or its directory is not a repository
    #[error("linked repository '{name}' not found (known: {})", .known.join(", "))]
    NotFound {
        /// Name that was requested
        name: String,
        /// Registered linked repository names
        known: Vec<String>,
    },

    /// Working tree has uncommitted changes
    #[error("{repository} has uncommitted changes on {}", .branch.as_deref().unwrap_or("detached HEAD"))]
    DirtyWorkingTree {
        /// Linked repository name
        repository: String,
        /// Current branch (None when detached)
        branch: Option<String>,
    },

    /// Operation needs a feature branch but the default branch is checked out
    #[error("{repository} is on its default branch '{branch}'; check out a feature branch first")]
    OnDefaultBranch {
        /// Linked repository name
        repository: String,
        /// Default branch name
        branch: String,
    },

    /// Operation needs a named branch but HEAD is detached
    #[error("{repository} has a detached HEAD; check out a branch first")]
    DetachedHead {
        /// Linked repository name
        repository: String,
    },

    /// Branch has nothing to propose
    #[error("{repository}: branch '{branch}' has no commits ahead of '{base}'")]
    NoCommitsAhead {
        /// Linked repository name
        repository: String,
        /// Head branch
        branch: String,
        /// Base ref compared against
        base: String,
    },

    /// Directory is not a parent repository with linked repositories
    #[error("not a parent repository (no .gitmodules): {}", .0.display())]
    NotAParentRepository(PathBuf),

    /// Feature name cannot form a valid branch name
    #[error("invalid feature name '{0}'")]
    InvalidFeatureName(String),

    /// Authentication error
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Hosting CLI tool is not installed
    #[error("'{0}' is not installed")]
    CliNotInstalled(String),

    /// Branch exists locally and the switch was not confirmed
    #[error("branch '{branch}' already exists in {repository}")]
    BranchExists {
        /// Linked repository name
        repository: String,
        /// Existing branch
        branch: String,
    },

    /// Pull could not fast-forward (diverged history or merge conflict)
    #[error("cannot fast-forward '{branch}': {message}")]
    Diverged {
        /// Branch being pulled
        branch: String,
        /// Git's explanation
        message: String,
    },

    /// A git command exited with failure
    #[error("git {command} failed: {message}")]
    Git {
        /// Subcommand and arguments
        command: String,
        /// Trimmed stderr
        message: String,
    },

    /// Directory exists but is not a git repository
    #[error("not a git repository: {} ({reason})", .path.display())]
    NotARepository {
        /// Directory that was opened
        path: PathBuf,
        /// Why opening failed
        reason: String,
    },

    /// Configuration error (corrupt `.gitmodules` or config file)
    #[error("configuration error: {0}")]
    Config(String),

    /// The git executable could not be run
    #[error("failed to run git: {0}")]
    GitUnavailable(String),

    /// Remote URL does not point at GitHub or GitLab
    #[error("no supported hosting platform for remote '{0}' (set GH_HOST or GITLAB_HOST for self-hosted instances)")]
    UnsupportedRemote(String),

    /// Generic platform error
    #[error("platform error: {0}")]
    Platform(String),

    /// GitHub API error
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API error
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// Octocrab error
    #[error("GitHub API error: {0}")]
    Octocrab(#[from] octocrab::Error),

    /// HTTP request error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. }
            | Self::DirtyWorkingTree { .. }
            | Self::OnDefaultBranch { .. }
            | Self::DetachedHead { .. }
            | Self::NoCommitsAhead { .. }
            | Self::NotAParentRepository(_)
            | Self::InvalidFeatureName(_)
            | Self::Auth(_)
            | Self::CliNotInstalled(_)
            | Self::UnsupportedRemote(_) => ErrorKind::Precondition,
            Self::BranchExists { .. } | Self::Diverged { .. } => ErrorKind::Conflict,
            Self::Git { .. }
            | Self::Platform(_)
            | Self::GitHubApi(_)
            | Self::GitLabApi(_)
            | Self::Octocrab(_)
            | Self::Http(_) => ErrorKind::Transient,
            Self::NotARepository { .. }
            | Self::Config(_)
            | Self::GitUnavailable(_)
            | Self::Io(_) => ErrorKind::Fatal,
        }
    }

    /// Errors that stop a command before any mutation is attempted
    pub const fn is_hard_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotAParentRepository(_) | Self::Auth(_) | Self::CliNotInstalled(_)
        )
    }
}

/// Result type alias for subflow operations
pub type Result<T> = std::result::Result<T, Error>;

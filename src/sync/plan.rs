//! Reconcile planning - pure functions deciding what to run
//!
//! No I/O happens here. The caller gathers status (and the default branch
//! when HEAD is detached) and the planner turns it into ordered steps.

use crate::decision::DirtyTreeAction;
use crate::repo::RepoStatus;
use chrono::{DateTime, Utc};

/// Detail used when a dirty repository is left alone
pub const SKIP_UNCOMMITTED: &str = "uncommitted changes";

/// One git operation in a reconcile plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStep {
    /// Stash everything, including untracked files
    Stash {
        /// Stash message
        message: String,
    },
    /// Fetch the remote
    Fetch {
        /// Remote name
        remote: String,
    },
    /// Check out an existing local branch
    Checkout {
        /// Branch name
        branch: String,
    },
    /// Fast-forward from the remote branch
    Pull {
        /// Remote name
        remote: String,
        /// Branch name
        branch: String,
    },
}

impl std::fmt::Display for SyncStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stash { message } => write!(f, "stash changes ({message})"),
            Self::Fetch { remote } => write!(f, "fetch {remote}"),
            Self::Checkout { branch } => write!(f, "checkout {branch}"),
            Self::Pull { remote, branch } => write!(f, "pull {remote}/{branch}"),
        }
    }
}

/// What reconciling one repository will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcilePlan {
    /// Leave the repository untouched
    Skip {
        /// Why
        reason: String,
    },
    /// Run these steps in order
    Run {
        /// Branch the repository ends up on
        branch: String,
        /// Steps to execute
        steps: Vec<SyncStep>,
    },
}

impl ReconcilePlan {
    /// Whether the plan stashes anything
    pub fn stashes(&self) -> bool {
        matches!(self, Self::Run { steps, .. } if steps.iter().any(|s| matches!(s, SyncStep::Stash { .. })))
    }
}

/// Everything the planner needs, gathered beforehand
#[derive(Debug, Clone)]
pub struct PlanInput<'a> {
    /// Linked repository name
    pub repository: &'a str,
    /// Live status
    pub status: &'a RepoStatus,
    /// Default branch; only consulted when HEAD is detached
    pub default_branch: Option<&'a str>,
    /// Decision for a dirty tree (ignored when clean)
    pub dirty_action: DirtyTreeAction,
    /// Remote to reconcile against
    pub remote: &'a str,
    /// Time used in the stash message
    pub now: DateTime<Utc>,
}

/// Stash message naming the repository and a millisecond UTC timestamp
pub fn stash_message(repository: &str, now: DateTime<Utc>) -> String {
    format!(
        "subflow auto-stash {repository} {}",
        now.format("%Y-%m-%dT%H:%M:%S%.3fZ")
    )
}

/// Create a reconcile plan (PURE - no I/O)
///
/// Attached HEAD: fetch, then pull the same branch. Detached HEAD: fetch,
/// check out the default branch, then pull it. A dirty tree is either
/// stashed first or the whole repository is skipped.
#[must_use]
pub fn plan_reconcile(input: &PlanInput<'_>) -> ReconcilePlan {
    let mut steps = Vec::new();

    if !input.status.is_clean {
        match input.dirty_action {
            DirtyTreeAction::Skip => {
                return ReconcilePlan::Skip {
                    reason: SKIP_UNCOMMITTED.to_string(),
                };
            }
            DirtyTreeAction::Stash => steps.push(SyncStep::Stash {
                message: stash_message(input.repository, input.now),
            }),
        }
    }

    steps.push(SyncStep::Fetch {
        remote: input.remote.to_string(),
    });

    let branch = if let Some(branch) = &input.status.current_branch {
        branch.clone()
    } else {
        let Some(default_branch) = input.default_branch else {
            return ReconcilePlan::Skip {
                reason: "detached HEAD and no default branch could be resolved".to_string(),
            };
        };
        steps.push(SyncStep::Checkout {
            branch: default_branch.to_string(),
        });
        default_branch.to_string()
    };

    steps.push(SyncStep::Pull {
        remote: input.remote.to_string(),
        branch: branch.clone(),
    });

    ReconcilePlan::Run { branch, steps }
}

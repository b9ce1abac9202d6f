//! Reconciliation engine
//!
//! Three-phase pattern per linked repository:
//! 1. Gather - status, and the default branch when HEAD is detached
//! 2. Plan - create a `ReconcilePlan` (pure, testable)
//! 3. Execute - run the steps (effectful)
//!
//! Repositories are processed sequentially. One failing repository never
//! stops the others; its failure is recorded in the report.

mod execute;
mod plan;

pub use execute::{ExecutionResult, execute_steps};
pub use plan::{PlanInput, ReconcilePlan, SKIP_UNCOMMITTED, SyncStep, plan_reconcile, stash_message};

use crate::config::Config;
use crate::decision::{DecisionPolicy, DirtyTreeAction};
use crate::error::Result;
use crate::pr::{commit_pointer_changes, compute_pointer_changes, pointer_commit_message};
use crate::progress::ProgressCallback;
use crate::registry::LinkRegistry;
use crate::repo::{GitRepository, RepositoryProvider, observe, resolve_default_branch};
use crate::types::{LinkedRepository, ObservedState, Outcome, PointerChangeSet, ReconciliationResult};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Stash dirty trees without asking
    pub force_stash: bool,
    /// Remote to reconcile against
    pub remote: String,
    /// Default branch candidates for detached repositories
    pub default_branch_fallbacks: Vec<String>,
}

impl SyncOptions {
    /// Options derived from configuration
    pub fn from_config(config: &Config, force_stash: bool) -> Self {
        Self {
            force_stash,
            remote: config.remote.clone(),
            default_branch_fallbacks: config.default_branch_fallbacks.clone(),
        }
    }
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self::from_config(&Config::default(), false)
    }
}

/// What happened to the parent's recorded pointers after a sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentUpdate {
    /// Every linked repository matches its recorded pointer
    Unchanged,
    /// Pointers moved but the commit was declined
    Pending(PointerChangeSet),
    /// Pointer updates were committed in the parent
    Committed(PointerChangeSet),
    /// Computing or committing the pointer updates failed
    Failed(String),
}

/// Outcome of a whole sync run
#[derive(Debug, Clone)]
pub struct SyncReport {
    /// One result per linked repository, in registry order
    pub results: Vec<ReconciliationResult>,
    /// Parent pointer handling after the linked repositories
    pub parent: ParentUpdate,
}

impl SyncReport {
    /// Number of results with the given outcome
    pub fn count(&self, outcome: Outcome) -> usize {
        self.results.iter().filter(|r| r.outcome == outcome).count()
    }

    /// Some repository failed (the report is still complete)
    pub fn is_partial_failure(&self) -> bool {
        self.count(Outcome::Failed) > 0 || matches!(self.parent, ParentUpdate::Failed(_))
    }

    /// Stash entries created during the run
    pub fn stashes(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter_map(|r| r.stash.as_deref())
            .collect()
    }
}

/// Gather and plan for one repository without mutating it
fn gather_plan(
    repo: &dyn GitRepository,
    repository: &LinkedRepository,
    options: &SyncOptions,
    dirty_action: impl FnOnce() -> DirtyTreeAction,
) -> Result<ReconcilePlan> {
    let status = repo.status()?;

    let dirty_action = if status.is_clean {
        DirtyTreeAction::Skip
    } else if options.force_stash {
        DirtyTreeAction::Stash
    } else {
        dirty_action()
    };

    let default_branch = if status.current_branch.is_none() {
        Some(resolve_default_branch(
            repo,
            &options.remote,
            repository.branch.as_deref(),
            &options.default_branch_fallbacks,
        )?)
    } else {
        None
    };

    Ok(plan_reconcile(&PlanInput {
        repository: &repository.name,
        status: &status,
        default_branch: default_branch.as_deref(),
        dirty_action,
        remote: &options.remote,
        now: Utc::now(),
    }))
}

/// Reconcile one linked repository
///
/// Never returns an error: every failure becomes an `Outcome::Failed`
/// result so the caller can continue with the next repository.
pub fn reconcile(
    registry: &LinkRegistry,
    repository: &LinkedRepository,
    provider: &dyn RepositoryProvider,
    options: &SyncOptions,
    policy: &dyn DecisionPolicy,
) -> ReconciliationResult {
    let repo = match provider.open(&registry.absolute_path(repository)) {
        Ok(repo) => repo,
        Err(e) => return ReconciliationResult::failed(repository, e.to_string()),
    };

    let plan = match gather_plan(repo.as_ref(), repository, options, || {
        policy.on_dirty_tree(repository)
    }) {
        Ok(plan) => plan,
        Err(e) => return ReconciliationResult::failed(repository, e.to_string()),
    };

    match plan {
        ReconcilePlan::Skip { reason } => {
            info!(repository = %repository.name, reason = %reason, "skipping");
            ReconciliationResult::skipped(repository, reason)
        }
        ReconcilePlan::Run { branch, steps } => {
            let execution = execute_steps(repo.as_ref(), &repository.name, &steps);
            let mut result = match execution.error {
                None => ReconciliationResult::synced(
                    repository,
                    format!("up to date with {}/{branch}", options.remote),
                ),
                Some(e) => {
                    warn!(repository = %repository.name, error = %e, "reconcile failed");
                    ReconciliationResult::failed(repository, e.to_string())
                }
            };
            result.stash = execution.stash;
            result
        }
    }
}

/// Reconcile every linked repository, then handle the parent's pointers
///
/// Pointer updates are committed in the parent (on its current branch,
/// without pushing) only when the policy confirms.
pub fn reconcile_all(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    options: &SyncOptions,
    policy: &dyn DecisionPolicy,
    progress: &dyn ProgressCallback,
) -> SyncReport {
    let mut results = Vec::with_capacity(registry.repositories().len());

    for repository in registry.repositories() {
        progress.on_repository_start(repository);
        let result = reconcile(registry, repository, provider, options, policy);
        progress.on_result(&result);
        results.push(result);
    }

    let parent = update_parent(registry, provider, policy, &results);
    SyncReport { results, parent }
}

/// Commit the pointers of repositories that synced in this run
///
/// A skipped or failed repository keeps its recorded pointer even if its HEAD
/// moved, so local or half-updated work never lands in the parent.
fn update_parent(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    policy: &dyn DecisionPolicy,
    results: &[ReconciliationResult],
) -> ParentUpdate {
    let parent = match provider.open(registry.parent_root()) {
        Ok(parent) => parent,
        Err(e) => return ParentUpdate::Failed(e.to_string()),
    };

    let mut changes = match compute_pointer_changes(registry, parent.as_ref(), provider) {
        Ok(changes) => changes,
        Err(e) => return ParentUpdate::Failed(e.to_string()),
    };
    changes.entries.retain(|change| {
        let synced = results
            .iter()
            .any(|r| r.repository.name == change.repository && r.outcome == Outcome::Synced);
        if !synced {
            debug!(repository = %change.repository, "not synced, leaving its pointer out");
        }
        synced
    });

    if changes.is_empty() {
        return ParentUpdate::Unchanged;
    }
    if !policy.confirm_parent_commit(&changes) {
        return ParentUpdate::Pending(changes);
    }

    let message = pointer_commit_message(&changes, None);
    match commit_pointer_changes(parent.as_ref(), &changes, &message) {
        Ok(()) => {
            info!(count = changes.len(), "committed pointer updates in parent");
            ParentUpdate::Committed(changes)
        }
        Err(e) => ParentUpdate::Failed(e.to_string()),
    }
}

/// Plan every linked repository without mutating anything (dry run)
///
/// Dirty trees plan as skipped unless stashing is forced.
pub fn plan_all(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    options: &SyncOptions,
) -> Vec<(LinkedRepository, Result<ReconcilePlan>)> {
    registry
        .repositories()
        .iter()
        .map(|repository| {
            let plan = provider
                .open(&registry.absolute_path(repository))
                .and_then(|repo| {
                    gather_plan(repo.as_ref(), repository, options, || {
                        DirtyTreeAction::Skip
                    })
                });
            (repository.clone(), plan)
        })
        .collect()
}

/// Observed state of one linked repository for status display
#[derive(Debug, Clone)]
pub struct RepositoryStatus {
    /// The linked repository
    pub repository: LinkedRepository,
    /// Live state, or the error that prevented reading it
    pub state: std::result::Result<ObservedState, String>,
    /// Current HEAD
    pub head: Option<String>,
    /// Revision recorded by the parent
    pub recorded: Option<String>,
}

impl RepositoryStatus {
    /// HEAD differs from the parent's recorded pointer
    pub fn pointer_moved(&self) -> bool {
        self.head.is_some() && self.head != self.recorded
    }
}

/// Read-only view of every linked repository
pub fn inspect_all(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    options: &SyncOptions,
) -> Result<Vec<RepositoryStatus>> {
    let parent = provider.open(registry.parent_root())?;

    let mut statuses = Vec::with_capacity(registry.repositories().len());
    for repository in registry.repositories() {
        let recorded = parent.recorded_pointer(&repository.path)?;
        let opened = provider.open(&registry.absolute_path(repository));
        let (state, head) = match opened {
            Ok(repo) => {
                let state = observe(
                    repo.as_ref(),
                    &options.remote,
                    repository.branch.as_deref(),
                    &options.default_branch_fallbacks,
                )
                .map_err(|e| e.to_string());
                (state, repo.head_commit().ok())
            }
            Err(e) => (Err(e.to_string()), None),
        };
        statuses.push(RepositoryStatus {
            repository: repository.clone(),
            state,
            head,
            recorded,
        });
    }
    Ok(statuses)
}

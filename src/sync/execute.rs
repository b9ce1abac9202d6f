//! Reconcile execution - effectful operations
//!
//! Runs the steps of a [`ReconcilePlan`](super::ReconcilePlan) against one
//! repository and stops at the first failure.

use crate::error::{Error, Result};
use crate::repo::GitRepository;
use crate::sync::plan::SyncStep;
use tracing::{debug, info};

/// Result of executing a reconcile plan
#[derive(Debug, Default)]
pub struct ExecutionResult {
    /// Stash message, when a stash entry was created
    pub stash: Option<String>,
    /// First failure, if any; later steps were not run
    pub error: Option<Error>,
}

/// Execute reconcile steps in order (EFFECTFUL)
pub fn execute_steps(
    repo: &dyn GitRepository,
    repository: &str,
    steps: &[SyncStep],
) -> ExecutionResult {
    let mut result = ExecutionResult::default();

    for step in steps {
        debug!(repository, %step, "executing step");
        let outcome = match step {
            SyncStep::Stash { message } => stash_and_verify(repo, repository, message).map(|()| {
                info!(repository, message = %message, "stashed uncommitted changes");
                result.stash = Some(message.clone());
            }),
            SyncStep::Fetch { remote } => repo.fetch(remote),
            SyncStep::Checkout { branch } => repo.checkout(branch),
            SyncStep::Pull { remote, branch } => repo.pull(remote, branch),
        };

        if let Err(e) = outcome {
            debug!(repository, %step, error = %e, "step failed");
            result.error = Some(e);
            break;
        }
    }

    result
}

/// Stash, then re-query status: the tree must be clean before anything moves
fn stash_and_verify(repo: &dyn GitRepository, repository: &str, message: &str) -> Result<()> {
    repo.stash(message)?;
    let status = repo.status()?;
    if !status.is_clean {
        return Err(Error::DirtyWorkingTree {
            repository: repository.to_string(),
            branch: status.current_branch,
        });
    }
    Ok(())
}

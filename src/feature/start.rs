//! Starting (or resuming) a feature branch

use super::{checkout_existing, open_linked, validate_feature_name};
use crate::config::Config;
use crate::decision::DecisionPolicy;
use crate::error::{Error, Result};
use crate::registry::LinkRegistry;
use crate::repo::{RepositoryProvider, resolve_default_branch};
use crate::types::FeatureBranch;
use tracing::{debug, info};

/// How the feature branch was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartAction {
    /// New branch created from the updated default branch
    Created,
    /// Local branch created tracking an existing remote branch
    Resumed,
    /// Existing local branch checked out
    Switched,
}

impl std::fmt::Display for StartAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Resumed => write!(f, "resumed from remote"),
            Self::Switched => write!(f, "switched to existing branch"),
        }
    }
}

/// A feature branch that is now checked out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartedFeature {
    /// The branch
    pub branch: FeatureBranch,
    /// What was done to get there
    pub action: StartAction,
    /// Default branch the feature is based on
    pub default_branch: String,
}

/// Create or resume `feature/<feature_name>` in a linked repository
///
/// The default branch is checked out and pulled first, so new branches
/// always start from an up-to-date trunk. An existing local branch is only
/// switched to when the policy confirms; otherwise `BranchExists`.
pub fn start_feature(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    repository_name: &str,
    feature_name: &str,
    config: &Config,
    policy: &dyn DecisionPolicy,
) -> Result<StartedFeature> {
    let (repository, repo) = open_linked(registry, provider, repository_name)?;

    let status = repo.status()?;
    if !status.is_clean {
        return Err(Error::DirtyWorkingTree {
            repository: repository.name.clone(),
            branch: status.current_branch,
        });
    }
    validate_feature_name(feature_name)?;

    let remote = config.remote.as_str();
    repo.fetch(remote)?;
    let default_branch = resolve_default_branch(
        repo.as_ref(),
        remote,
        repository.branch.as_deref(),
        &config.default_branch_fallbacks,
    )?;

    if status.current_branch.as_deref() != Some(default_branch.as_str()) {
        debug!(repository = %repository.name, branch = %default_branch, "checking out default branch");
        checkout_existing(repo.as_ref(), remote, &default_branch)?;
    }
    repo.pull(remote, &default_branch)?;

    let branch = FeatureBranch::new(&repository.name, feature_name);
    let exists_locally = repo
        .local_branches()?
        .iter()
        .any(|b| *b == branch.branch_name);
    let exists_remotely = repo
        .remote_branches(remote)?
        .iter()
        .any(|b| *b == branch.branch_name);

    let action = match (exists_locally, exists_remotely) {
        (true, _) => {
            if !policy.confirm_branch_switch(&repository.name, &branch.branch_name) {
                return Err(Error::BranchExists {
                    repository: repository.name.clone(),
                    branch: branch.branch_name,
                });
            }
            repo.checkout(&branch.branch_name)?;
            StartAction::Switched
        }
        (false, true) => {
            repo.checkout_tracking(remote, &branch.branch_name)?;
            StartAction::Resumed
        }
        (false, false) => {
            repo.create_branch(&branch.branch_name)?;
            StartAction::Created
        }
    };

    info!(repository = %repository.name, branch = %branch.branch_name, %action, "feature branch ready");
    Ok(StartedFeature {
        branch,
        action,
        default_branch,
    })
}

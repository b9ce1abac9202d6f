//! Finishing a feature branch once its work has landed

use super::{checkout_existing, open_linked, validate_feature_name};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::registry::LinkRegistry;
use crate::repo::{RepositoryProvider, resolve_default_branch};
use crate::types::FeatureBranch;
use tracing::info;

/// Result of finishing a feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedFeature {
    /// The feature branch
    pub branch: FeatureBranch,
    /// Default branch now checked out
    pub default_branch: String,
    /// Whether a local branch was deleted (false when none existed)
    pub deleted: bool,
}

/// Return to the updated default branch and delete the local feature branch
///
/// Deletion uses git's safe delete, so unmerged work makes git refuse and
/// the error propagates with the branch left in place. The remote branch is
/// never touched.
pub fn finish_feature(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    repository_name: &str,
    feature_name: &str,
    config: &Config,
) -> Result<FinishedFeature> {
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
        checkout_existing(repo.as_ref(), remote, &default_branch)?;
    }
    repo.pull(remote, &default_branch)?;

    let branch = FeatureBranch::new(&repository.name, feature_name);
    let exists = repo
        .local_branches()?
        .iter()
        .any(|b| *b == branch.branch_name);
    if exists {
        repo.delete_branch(&branch.branch_name)?;
        info!(repository = %repository.name, branch = %branch.branch_name, "deleted local feature branch");
    }

    Ok(FinishedFeature {
        branch,
        default_branch,
        deleted: exists,
    })
}

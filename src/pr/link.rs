//! PR against a linked repository

use crate::config::Config;
use crate::error::{Error, Result};
use crate::platform::{PlatformService, ensure_authenticated};
use crate::repo::{GitRepository, resolve_default_branch};
use crate::types::{FeatureBranch, LinkedRepository, PullRequest};
use std::fmt::Write as _;
use tracing::{debug, info};

/// Result of `create_link_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPrOutcome {
    /// The open PR for the branch
    pub pr: PullRequest,
    /// False when an existing PR was returned unchanged
    pub created: bool,
}

/// Title `"<service> : <feature>"`
pub fn link_pr_title(service_name: &str, branch: &str) -> String {
    format!("{service_name} : {}", FeatureBranch::feature_name_of(branch))
}

/// Body with the commit subjects and a verification section to fill in
pub fn link_pr_body(subjects: &[String]) -> String {
    let mut body = String::from("## What changed\n\n");
    for subject in subjects {
        let _ = writeln!(body, "- {subject}");
    }
    body.push_str("\n## How to verify\n\n- [ ] Describe how a reviewer can check this change\n");
    body
}

/// Push the checked out feature branch and open (or reuse) its PR
///
/// Requires a named, non-default branch with at least one commit that is not
/// on the remote default branch. An existing open PR for the branch is
/// returned as is. The platform credentials are checked before the push.
pub async fn create_link_pr(
    repository: &LinkedRepository,
    repo: &dyn GitRepository,
    platform: &dyn PlatformService,
    config: &Config,
    draft: bool,
) -> Result<LinkPrOutcome> {
    let remote = config.remote.as_str();
    let status = repo.status()?;
    let branch = status.current_branch.ok_or_else(|| Error::DetachedHead {
        repository: repository.name.clone(),
    })?;

    let default_branch = resolve_default_branch(
        repo,
        remote,
        repository.branch.as_deref(),
        &config.default_branch_fallbacks,
    )?;
    if branch == default_branch {
        return Err(Error::OnDefaultBranch {
            repository: repository.name.clone(),
            branch,
        });
    }

    let base = if repo.remote_branches(remote)?.contains(&default_branch) {
        format!("{remote}/{default_branch}")
    } else {
        default_branch.clone()
    };
    let subjects = repo.commit_subjects(&base, &branch)?;
    if subjects.is_empty() {
        return Err(Error::NoCommitsAhead {
            repository: repository.name.clone(),
            branch,
            base,
        });
    }

    ensure_authenticated(platform).await?;

    let set_upstream = !repo.has_upstream(&branch)?;
    debug!(repository = %repository.name, %branch, set_upstream, "pushing feature branch");
    repo.push(remote, &branch, set_upstream)?;

    if let Some(pr) = platform.find_existing_pr(&branch).await? {
        info!(repository = %repository.name, pr = pr.number, "PR already open");
        return Ok(LinkPrOutcome { pr, created: false });
    }

    let title = link_pr_title(&repository.name, &branch);
    let body = link_pr_body(&subjects);
    let pr = platform
        .create_pr_with_options(&branch, &default_branch, &title, Some(&body), draft)
        .await?;
    info!(repository = %repository.name, pr = pr.number, "created PR");

    Ok(LinkPrOutcome { pr, created: true })
}

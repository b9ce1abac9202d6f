//! PR against the parent repository advancing its recorded pointers

use super::changes::{
    commit_pointer_changes, committed_pointer_changes, compute_pointer_changes,
    pointer_commit_message, short_revision,
};
use crate::config::Config;
use crate::decision::DecisionPolicy;
use crate::error::Result;
use crate::feature::validate_feature_name;
use crate::platform::{PlatformResolver, PlatformService, ensure_authenticated};
use crate::registry::LinkRegistry;
use crate::repo::{GitRepository, RepositoryProvider, resolve_default_branch};
use crate::types::{FeatureBranch, PointerChangeSet, PullRequest};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::fmt::Write as _;
use tracing::{debug, info, warn};

/// Result of `create_parent_pr`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentPrOutcome {
    /// Every pointer already matches; nothing was committed or pushed
    NothingToUpdate,
    /// The policy declined the parent commit
    Declined(PointerChangeSet),
    /// A new PR was opened
    Created {
        /// The PR
        pr: PullRequest,
        /// Pointer updates it carries
        changes: PointerChangeSet,
    },
    /// An open PR for the branch already existed; its body was refreshed
    Existing {
        /// The PR
        pr: PullRequest,
        /// Pointer updates it carries
        changes: PointerChangeSet,
    },
}

/// Options for one `create_parent_pr` call
#[derive(Debug, Clone)]
pub struct ParentPrOptions<'a> {
    /// Feature name; the parent branch becomes `feature/<hint>`
    pub feature_hint: Option<&'a str>,
    /// Open the PR as a draft
    pub draft: bool,
    /// Timestamp for generated branch names
    pub now: DateTime<Utc>,
}

/// `feature/<hint>`, or `<prefix>-<YYYYMMDD-HHMMSS>` without a hint
pub fn parent_branch_name(feature_hint: Option<&str>, prefix: &str, now: DateTime<Utc>) -> String {
    match feature_hint {
        Some(hint) => FeatureBranch::new("", hint).branch_name,
        None => format!("{prefix}-{}", now.format("%Y%m%d-%H%M%S")),
    }
}

/// PR title for the parent
pub fn parent_pr_title(changes: &PointerChangeSet, feature_hint: Option<&str>) -> String {
    match feature_hint {
        Some(hint) => format!("Update linked repositories for {hint}"),
        None => format!(
            "Update linked repositories: {}",
            changes.repository_names().join(", ")
        ),
    }
}

/// PR body listing every pointer update, with links to linked PRs when known
pub fn parent_pr_body(
    changes: &PointerChangeSet,
    linked_prs: &HashMap<String, PullRequest>,
) -> String {
    let mut body = String::from("## Linked repository updates\n\n");
    for change in &changes.entries {
        let old = change
            .old_revision
            .as_deref()
            .map_or("(new)", short_revision);
        let _ = write!(
            body,
            "- {}: {old} -> {}",
            change.repository,
            short_revision(&change.new_revision)
        );
        if let Some(pr) = linked_prs.get(&change.repository) {
            let _ = write!(body, " ([#{}]({}))", pr.number, pr.html_url);
        }
        body.push('\n');
    }
    body
}

/// Commit the parent's pointer updates on a branch and open (or reuse) its PR
///
/// Steps: compute the change set (empty means no commit, no push, no PR),
/// ask the policy, verify the platform credentials, branch from the current
/// parent HEAD, commit exactly the pointer paths, push with upstream, then
/// find or create the PR.
///
/// When the pointers already match because an earlier run committed them on
/// the parent branch but never got its PR open, that commit is pushed and
/// proposed instead of reporting nothing to update.
pub async fn create_parent_pr(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    platform: &dyn PlatformService,
    resolver: &dyn PlatformResolver,
    policy: &dyn DecisionPolicy,
    config: &Config,
    options: &ParentPrOptions<'_>,
) -> Result<ParentPrOutcome> {
    if let Some(hint) = options.feature_hint {
        validate_feature_name(hint)?;
    }

    let parent = provider.open(registry.parent_root())?;
    let pending = compute_pointer_changes(registry, parent.as_ref(), provider)?;
    let unpublished = if pending.is_empty() {
        unpublished_pointer_commit(registry, parent.as_ref(), config, options.feature_hint)?
    } else {
        None
    };

    if pending.is_empty() && unpublished.is_none() {
        info!("all pointers up to date, nothing to propose");
        return Ok(ParentPrOutcome::NothingToUpdate);
    }
    if unpublished.is_none() && !policy.confirm_parent_commit(&pending) {
        return Ok(ParentPrOutcome::Declined(pending));
    }

    ensure_authenticated(platform).await?;

    let remote = config.remote.as_str();
    let (branch, base, changes) = match unpublished {
        Some(found) => {
            info!(branch = %found.branch, "pointer updates already committed, publishing them");
            (found.branch, found.base, found.changes)
        }
        None => {
            let base = resolve_default_branch(
                parent.as_ref(),
                remote,
                None,
                &config.default_branch_fallbacks,
            )?;
            let branch = parent_branch_name(
                options.feature_hint,
                &config.parent_branch_prefix,
                options.now,
            );

            switch_to_branch(parent.as_ref(), &branch)?;
            let message = pointer_commit_message(&pending, options.feature_hint);
            commit_pointer_changes(parent.as_ref(), &pending, &message)?;
            (branch, base, pending)
        }
    };

    let set_upstream = !parent.has_upstream(&branch)?;
    parent.push(remote, &branch, set_upstream)?;

    let linked_prs =
        discover_linked_prs(registry, provider, resolver, config, &changes, options.feature_hint)
            .await;
    let body = parent_pr_body(&changes, &linked_prs);

    if let Some(existing) = platform.find_existing_pr(&branch).await? {
        let pr = platform.update_pr_body(existing.number, &body).await?;
        info!(pr = pr.number, "refreshed existing parent PR");
        return Ok(ParentPrOutcome::Existing { pr, changes });
    }

    let title = parent_pr_title(&changes, options.feature_hint);
    let pr = platform
        .create_pr_with_options(&branch, &base, &title, Some(&body), options.draft)
        .await?;
    info!(pr = pr.number, %branch, "created parent PR");
    Ok(ParentPrOutcome::Created { pr, changes })
}

/// Pointer commit left on a parent branch by an earlier, interrupted run
struct UnpublishedCommit {
    branch: String,
    base: String,
    changes: PointerChangeSet,
}

/// Find pointer updates committed on the checked out parent branch but not on
/// its base
///
/// Only branches this command would have created qualify: `feature/<hint>`,
/// or any `<prefix>-*` branch without a hint.
fn unpublished_pointer_commit(
    registry: &LinkRegistry,
    parent: &dyn GitRepository,
    config: &Config,
    feature_hint: Option<&str>,
) -> Result<Option<UnpublishedCommit>> {
    let Some(branch) = parent.status()?.current_branch else {
        return Ok(None);
    };
    let ours = match feature_hint {
        Some(hint) => branch == FeatureBranch::new("", hint).branch_name,
        None => branch.starts_with(&format!("{}-", config.parent_branch_prefix)),
    };
    if !ours {
        return Ok(None);
    }

    let remote = config.remote.as_str();
    let base = resolve_default_branch(parent, remote, None, &config.default_branch_fallbacks)?;
    if branch == base {
        return Ok(None);
    }
    let base_ref = if parent.remote_branches(remote)?.contains(&base) {
        format!("{remote}/{base}")
    } else {
        base.clone()
    };
    if parent.commit_subjects(&base_ref, &branch)?.is_empty() {
        return Ok(None);
    }

    let changes = committed_pointer_changes(registry, parent, &base_ref)?;
    if changes.is_empty() {
        return Ok(None);
    }
    debug!(%branch, %base_ref, count = changes.len(), "found unpublished pointer commit");
    Ok(Some(UnpublishedCommit {
        branch,
        base,
        changes,
    }))
}

/// Check out `branch` in the parent, creating it at HEAD when missing
fn switch_to_branch(parent: &dyn GitRepository, branch: &str) -> Result<()> {
    let status = parent.status()?;
    if status.current_branch.as_deref() == Some(branch) {
        return Ok(());
    }
    if parent.local_branches()?.iter().any(|b| b == branch) {
        parent.checkout(branch)
    } else {
        parent.create_branch(branch)
    }
}

/// Open PRs in the linked repositories, keyed by repository name
///
/// A PR matches when its head is `feature/<hint>` (or, without a hint, the
/// linked repository's checked out branch). Every failure is logged and
/// skipped: links are a convenience, never a reason to fail.
async fn discover_linked_prs(
    registry: &LinkRegistry,
    provider: &dyn RepositoryProvider,
    resolver: &dyn PlatformResolver,
    config: &Config,
    changes: &PointerChangeSet,
    feature_hint: Option<&str>,
) -> HashMap<String, PullRequest> {
    let mut found = HashMap::new();

    for change in &changes.entries {
        let Ok(repository) = registry.find(&change.repository) else {
            continue;
        };
        let (branch, url) = match provider.open(&registry.absolute_path(repository)) {
            Ok(repo) => {
                let branch = match feature_hint {
                    Some(hint) => Some(FeatureBranch::new("", hint).branch_name),
                    None => repo.status().ok().and_then(|s| s.current_branch),
                };
                let url = repo
                    .remote_url(&config.remote)
                    .ok()
                    .flatten()
                    .unwrap_or_else(|| repository.url.clone());
                (branch, url)
            }
            Err(e) => {
                warn!(repository = %repository.name, error = %e, "skipping PR lookup");
                continue;
            }
        };
        let Some(branch) = branch else {
            debug!(repository = %repository.name, "detached HEAD, no PR to link");
            continue;
        };

        let service = match resolver.service_for_url(&url).await {
            Ok(service) => service,
            Err(e) => {
                warn!(repository = %repository.name, error = %e, "skipping PR lookup");
                continue;
            }
        };
        match service.find_existing_pr(&branch).await {
            Ok(Some(pr)) => {
                found.insert(repository.name.clone(), pr);
            }
            Ok(None) => debug!(repository = %repository.name, %branch, "no linked PR"),
            Err(e) => warn!(repository = %repository.name, error = %e, "PR lookup failed"),
        }
    }

    found
}

//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface for the PR/MR operations the aggregator needs:
//! find by head branch, create, update body and view.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{detect_platform_with_hosts, parse_repo_info, parse_repo_info_with_hosts};
pub use factory::{RemotePlatformResolver, create_platform_service};
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::{Error, Result};
use crate::types::{PlatformConfig, PullRequest};
use async_trait::async_trait;
use tracing::debug;

/// Platform service trait for PR/MR operations
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// PR logic to work with either platform.
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// Find an existing open PR for a head branch
    async fn find_existing_pr(&self, head_branch: &str) -> Result<Option<PullRequest>>;

    /// Create a new PR with explicit body and draft options.
    async fn create_pr_with_options(
        &self,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
        draft: bool,
    ) -> Result<PullRequest>;

    /// Replace the description of an existing PR
    async fn update_pr_body(&self, pr_number: u64, body: &str) -> Result<PullRequest>;

    /// Fetch a PR by number
    async fn get_pr(&self, pr_number: u64) -> Result<PullRequest>;

    /// Login of the account the credentials belong to
    async fn current_user(&self) -> Result<String>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}

/// Check that the platform accepts our credentials before anything is pushed
///
/// Every failure, including an unreachable host, is reported as
/// [`Error::Auth`] so callers stop with a precondition failure.
pub async fn ensure_authenticated(platform: &dyn PlatformService) -> Result<String> {
    let config = platform.config();
    let host = config
        .host
        .clone()
        .unwrap_or_else(|| config.platform.to_string());
    match platform.current_user().await {
        Ok(login) => {
            debug!(%host, %login, "platform credentials accepted");
            Ok(login)
        }
        Err(e @ Error::Auth(_)) => Err(e),
        Err(e) => Err(Error::Auth(format!(
            "could not verify credentials for {host}: {e}"
        ))),
    }
}

/// Finds the hosting service behind a linked repository's remote URL
///
/// The parent PR links to PRs in the linked repositories, which may live on
/// different hosts or owners than the parent.
#[async_trait]
pub trait PlatformResolver: Send + Sync {
    /// Service for the repository at `remote_url`
    async fn service_for_url(&self, remote_url: &str) -> Result<Box<dyn PlatformService>>;
}

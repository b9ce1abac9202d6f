//! Platform service construction

use crate::auth::{get_github_auth, get_gitlab_auth};
use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, PlatformResolver, PlatformService, parse_repo_info};
use crate::types::{Platform, PlatformConfig};
use async_trait::async_trait;
use tracing::debug;

/// Create an authenticated platform service for a repository
pub async fn create_platform_service(config: &PlatformConfig) -> Result<Box<dyn PlatformService>> {
    debug!(platform = %config.platform, owner = %config.owner, repo = %config.repo, "creating platform service");
    match config.platform {
        Platform::GitHub => {
            let auth = get_github_auth(config.host.as_deref()).await?;
            Ok(Box::new(GitHubService::new(
                &auth.token,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
            )?))
        }
        Platform::GitLab => {
            let auth = get_gitlab_auth(config.host.as_deref()).await?;
            Ok(Box::new(GitLabService::new(
                auth.token,
                config.owner.clone(),
                config.repo.clone(),
                config.host.clone(),
            )?))
        }
    }
}

/// Resolves services from remote URLs with real authentication
#[derive(Debug, Clone, Copy, Default)]
pub struct RemotePlatformResolver;

#[async_trait]
impl PlatformResolver for RemotePlatformResolver {
    async fn service_for_url(&self, remote_url: &str) -> Result<Box<dyn PlatformService>> {
        let config = parse_repo_info(remote_url)?;
        create_platform_service(&config).await
    }
}

//! Shared command context for CLI commands
//!
//! Extracts common setup: locating the parent repository, loading the link
//! registry and configuration, and creating platform services on demand.

use std::path::{Path, PathBuf};
use subflow::config::Config;
use subflow::error::{Error, Result};
use subflow::platform::{PlatformService, create_platform_service, parse_repo_info};
use subflow::registry::LinkRegistry;
use subflow::repo::{GitCli, GitCliProvider, GitRepository, RepositoryProvider};
use subflow::types::LinkedRepository;
use tracing::debug;

/// Shared context for CLI commands
///
/// Live repository state is not kept here: every command re-queries it
/// through the provider.
pub struct CommandContext {
    /// Root of the parent repository
    pub parent_root: PathBuf,
    /// Linked repositories from `.gitmodules`
    pub registry: LinkRegistry,
    /// Effective configuration (file plus command line overrides)
    pub config: Config,
    /// Opens repositories by path
    pub provider: GitCliProvider,
}

impl CommandContext {
    /// Locate the parent repository from `path` and load its registry
    ///
    /// Works from anywhere inside the parent or one of its linked
    /// repositories.
    pub fn new(path: &Path, remote: Option<&str>) -> Result<Self> {
        let parent_root = GitCli::find_parent_root(path).map_err(|e| {
            debug!(error = %e, "no enclosing repository");
            Error::NotAParentRepository(path.to_path_buf())
        })?;
        debug!(parent_root = %parent_root.display(), "found parent repository");

        let registry = LinkRegistry::load(&parent_root)?;

        let mut config = Config::load(&parent_root)?;
        if let Some(remote) = remote {
            config.remote = remote.to_string();
        }

        Ok(Self {
            parent_root,
            registry,
            config,
            provider: GitCliProvider,
        })
    }

    /// Open the parent repository
    pub fn parent(&self) -> Result<Box<dyn GitRepository>> {
        self.provider.open(&self.parent_root)
    }

    /// Platform service for the parent repository's remote
    pub async fn parent_platform(&self) -> Result<Box<dyn PlatformService>> {
        let parent = self.parent()?;
        let url = parent
            .remote_url(&self.config.remote)?
            .ok_or_else(|| Error::Config(format!("parent has no remote '{}'", self.config.remote)))?;
        create_platform_service(&parse_repo_info(&url)?).await
    }

    /// Platform service for a linked repository
    ///
    /// Prefers the repository's own remote URL over the one in `.gitmodules`,
    /// which may be relative.
    pub async fn linked_platform(
        &self,
        repository: &LinkedRepository,
        repo: &dyn GitRepository,
    ) -> Result<Box<dyn PlatformService>> {
        let url = repo
            .remote_url(&self.config.remote)?
            .unwrap_or_else(|| repository.url.clone());
        create_platform_service(&parse_repo_info(&url)?).await
    }
}

//! GitHub authentication

use super::{AuthSource, cli_available, token_from_env};
use crate::error::{Error, Result};
use octocrab::Octocrab;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a GitHub token, in order
const TOKEN_VARS: &[&str] = &["GH_TOKEN", "GITHUB_TOKEN"];

/// GitHub authentication configuration
#[derive(Debug, Clone)]
pub struct GitHubAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitHub Enterprise host, `None` for github.com
    pub host: Option<String>,
}

/// Whether the `gh` CLI is installed
pub async fn is_gh_installed() -> bool {
    cli_available("gh").await
}

/// Get GitHub authentication
///
/// Checks `GH_TOKEN` / `GITHUB_TOKEN` first, then asks `gh auth token`.
pub async fn get_github_auth(host: Option<&str>) -> Result<GitHubAuthConfig> {
    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("using GitHub token from environment");
        return Ok(GitHubAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host: host.map(ToString::to_string),
        });
    }

    if !is_gh_installed().await {
        return Err(Error::CliNotInstalled("gh".to_string()));
    }

    let mut cmd = Command::new("gh");
    cmd.args(["auth", "token"]);
    if let Some(h) = host {
        cmd.args(["--hostname", h]);
    }
    let output = cmd.output().await?;
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() || token.is_empty() {
        return Err(Error::Auth(
            "no GitHub token; run `gh auth login` or set GH_TOKEN".to_string(),
        ));
    }

    debug!("using GitHub token from gh CLI");
    Ok(GitHubAuthConfig {
        token,
        source: AuthSource::Cli,
        host: host.map(ToString::to_string),
    })
}

/// Verify a GitHub token, returning the authenticated login
pub async fn test_github_auth(config: &GitHubAuthConfig) -> Result<String> {
    let mut builder = Octocrab::builder().personal_token(config.token.clone());
    if let Some(ref h) = config.host {
        builder = builder
            .base_uri(format!("https://{h}/api/v3"))
            .map_err(|e| Error::GitHubApi(e.to_string()))?;
    }
    let client = builder
        .build()
        .map_err(|e| Error::GitHubApi(e.to_string()))?;

    let user = client
        .current()
        .user()
        .await
        .map_err(|e| Error::Auth(format!("GitHub rejected the token: {e}")))?;
    Ok(user.login)
}

//! GitLab authentication

use super::{AuthSource, cli_available, token_from_env};
use crate::error::{Error, Result};
use reqwest::Client;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

/// Environment variables checked for a GitLab token, in order
const TOKEN_VARS: &[&str] = &["GITLAB_TOKEN", "GL_TOKEN"];

/// GitLab authentication configuration
#[derive(Debug, Clone)]
pub struct GitLabAuthConfig {
    /// Authentication token
    pub token: String,
    /// Where the token came from
    pub source: AuthSource,
    /// GitLab host (gitlab.com unless self-hosted)
    pub host: String,
}

#[derive(Deserialize)]
struct GitLabUser {
    username: String,
}

/// Whether the `glab` CLI is installed
pub async fn is_glab_installed() -> bool {
    cli_available("glab").await
}

/// Get GitLab authentication
///
/// Checks `GITLAB_TOKEN` / `GL_TOKEN` first, then asks `glab` for the
/// token stored for the host.
pub async fn get_gitlab_auth(host: Option<&str>) -> Result<GitLabAuthConfig> {
    let host = host.unwrap_or("gitlab.com").to_string();

    if let Some(token) = token_from_env(TOKEN_VARS) {
        debug!("using GitLab token from environment");
        return Ok(GitLabAuthConfig {
            token,
            source: AuthSource::EnvVar,
            host,
        });
    }

    if !is_glab_installed().await {
        return Err(Error::CliNotInstalled("glab".to_string()));
    }

    let output = Command::new("glab")
        .args(["config", "get", "token", "--host", &host])
        .output()
        .await?;
    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();

    if !output.status.success() || token.is_empty() {
        return Err(Error::Auth(
            "no GitLab token; run `glab auth login` or set GITLAB_TOKEN".to_string(),
        ));
    }

    debug!("using GitLab token from glab CLI");
    Ok(GitLabAuthConfig {
        token,
        source: AuthSource::Cli,
        host,
    })
}

/// Verify a GitLab token, returning the authenticated username
pub async fn test_gitlab_auth(config: &GitLabAuthConfig) -> Result<String> {
    let url = format!("https://{}/api/v4/user", config.host);
    let response = Client::new()
        .get(&url)
        .header("PRIVATE-TOKEN", &config.token)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(Error::Auth(format!(
            "GitLab rejected the token ({})",
            response.status()
        )));
    }

    let user: GitLabUser = response.json().await?;
    Ok(user.username)
}

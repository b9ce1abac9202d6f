//! Platform detection from remote URLs
//!
//! Recognizes github.com and gitlab.com, plus self-hosted instances named by
//! the `GH_HOST` and `GITLAB_HOST` environment variables.

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::env;
use std::sync::LazyLock;
use url::Url;

/// `git@host:owner/repo.git` style remotes
static SCP_LIKE: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^(?:[\w.-]+@)?([\w.-]+):([^/].*)$"));

/// Host and path parsed out of a remote URL
struct RemoteParts {
    host: String,
    path: String,
}

fn split_remote(url: &str) -> Option<RemoteParts> {
    let trimmed = url.trim().trim_end_matches('/');

    if trimmed.contains("://") {
        let parsed = Url::parse(trimmed).ok()?;
        if parsed.scheme() == "file" {
            return None;
        }
        let host = parsed.host_str()?.to_string();
        return Some(RemoteParts {
            host,
            path: parsed.path().trim_matches('/').to_string(),
        });
    }

    let scp = SCP_LIKE.as_ref().ok()?;
    let captures = scp.captures(trimmed)?;
    Some(RemoteParts {
        host: captures.get(1)?.as_str().to_string(),
        path: captures.get(2)?.as_str().trim_matches('/').to_string(),
    })
}

fn env_host(name: &str) -> Option<String> {
    env::var(name).ok().filter(|h| !h.trim().is_empty())
}

/// Detect the platform of a remote URL using explicit self-hosted hosts
pub fn detect_platform_with_hosts(
    url: &str,
    github_host: Option<&str>,
    gitlab_host: Option<&str>,
) -> Option<Platform> {
    let parts = split_remote(url)?;
    let host = parts.host.to_lowercase();

    if host == "github.com" || github_host.is_some_and(|h| h.eq_ignore_ascii_case(&host)) {
        return Some(Platform::GitHub);
    }
    if host == "gitlab.com" || gitlab_host.is_some_and(|h| h.eq_ignore_ascii_case(&host)) {
        return Some(Platform::GitLab);
    }
    None
}

/// Parse a remote URL into a platform config using explicit self-hosted hosts
///
/// GitLab owners keep every group level (`group/subgroup`); GitHub owners are
/// a single segment.
pub fn parse_repo_info_with_hosts(
    url: &str,
    github_host: Option<&str>,
    gitlab_host: Option<&str>,
) -> Result<PlatformConfig> {
    let unsupported = || Error::UnsupportedRemote(url.to_string());

    let platform =
        detect_platform_with_hosts(url, github_host, gitlab_host).ok_or_else(unsupported)?;
    let parts = split_remote(url).ok_or_else(unsupported)?;

    let path = parts.path.strip_suffix(".git").unwrap_or(&parts.path);
    let (owner, repo) = path.rsplit_once('/').ok_or_else(unsupported)?;
    if owner.is_empty() || repo.is_empty() {
        return Err(unsupported());
    }
    if platform == Platform::GitHub && owner.contains('/') {
        return Err(unsupported());
    }

    let host = match (platform, parts.host.as_str()) {
        (Platform::GitHub, "github.com") | (Platform::GitLab, "gitlab.com") => None,
        (_, other) => Some(other.to_string()),
    };

    Ok(PlatformConfig {
        platform,
        owner: owner.to_string(),
        repo: repo.to_string(),
        host,
    })
}

/// Parse a remote URL into a platform config, honoring `GH_HOST` / `GITLAB_HOST`
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    parse_repo_info_with_hosts(
        url,
        env_host("GH_HOST").as_deref(),
        env_host("GITLAB_HOST").as_deref(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_enterprise_host() {
        let config = parse_repo_info_with_hosts(
            "git@github.acme.io:platform/api.git",
            Some("github.acme.io"),
            None,
        )
        .unwrap();
        assert_eq!(config.platform, Platform::GitHub);
        assert_eq!(config.owner, "platform");
        assert_eq!(config.repo, "api");
        assert_eq!(config.host.as_deref(), Some("github.acme.io"));
    }

    #[test]
    fn test_gitlab_self_hosted_with_port() {
        let config = parse_repo_info_with_hosts(
            "ssh://git@gitlab.internal:2222/team/sub/web.git",
            None,
            Some("gitlab.internal"),
        )
        .unwrap();
        assert_eq!(config.platform, Platform::GitLab);
        assert_eq!(config.owner, "team/sub");
        assert_eq!(config.repo, "web");
        assert_eq!(config.host.as_deref(), Some("gitlab.internal"));
    }

    #[test]
    fn test_self_hosted_unknown_without_env() {
        assert_eq!(
            detect_platform_with_hosts("https://gitlab.internal/team/web.git", None, None),
            None
        );
    }

    #[test]
    fn test_local_paths_are_unsupported() {
        assert_eq!(detect_platform_with_hosts("/srv/git/api.git", None, None), None);
        assert_eq!(detect_platform_with_hosts("../api.git", None, None), None);
        assert_eq!(
            detect_platform_with_hosts("file:///srv/git/api.git", None, None),
            None
        );
    }

    #[test]
    fn test_github_rejects_nested_owner() {
        assert!(parse_repo_info_with_hosts("https://github.com/a/b/c", None, None).is_err());
    }
}

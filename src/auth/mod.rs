//! Authentication for GitHub and GitLab
//!
//! Supports environment variables first, then CLI-based auth (gh, glab).

mod github;
mod gitlab;

pub use github::{GitHubAuthConfig, get_github_auth, is_gh_installed, test_github_auth};
pub use gitlab::{GitLabAuthConfig, get_gitlab_auth, is_glab_installed, test_gitlab_auth};

use tokio::process::Command;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token from environment variable
    EnvVar,
}

impl std::fmt::Display for AuthSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::EnvVar => write!(f, "environment"),
        }
    }
}

/// First non-empty value among `names`, looked up through `lookup`
fn token_from(names: &[&str], lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
    names
        .iter()
        .filter_map(|name| lookup(name))
        .map(|value| value.trim().to_string())
        .find(|value| !value.is_empty())
}

/// First non-empty environment variable among `names`
fn token_from_env(names: &[&str]) -> Option<String> {
    token_from(names, |name| std::env::var(name).ok())
}

/// Whether `program --version` runs successfully
async fn cli_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .await
        .is_ok_and(|out| out.status.success())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_token_lookup_order_and_blank_values() {
        let vars: HashMap<&str, &str> = [("GH_TOKEN", "  "), ("GITHUB_TOKEN", "ghp_abc")]
            .into_iter()
            .collect();
        let token = token_from(&["GH_TOKEN", "GITHUB_TOKEN"], |name| {
            vars.get(name).map(ToString::to_string)
        });
        assert_eq!(token.as_deref(), Some("ghp_abc"));
    }

    #[test]
    fn test_token_lookup_none() {
        assert_eq!(token_from(&["A", "B"], |_| None), None);
    }
}

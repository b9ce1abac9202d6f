//! Feature branch lifecycle inside one linked repository
//!
//! Feature branches are always `feature/<name>` and always start from an
//! up-to-date default branch.

mod finish;
mod start;

pub use finish::{FinishedFeature, finish_feature};
pub use start::{StartAction, StartedFeature, start_feature};

use crate::error::{Error, Result};
use crate::registry::LinkRegistry;
use crate::repo::{GitRepository, RepositoryProvider};
use crate::types::LinkedRepository;
use tracing::debug;

/// Characters git refuses anywhere in a ref name
const FORBIDDEN_CHARS: &[char] = &['~', '^', ':', '?', '*', '[', '\\'];

/// Check that `feature/<name>` is a valid branch name
///
/// Follows `git check-ref-format`: no whitespace or control characters, none
/// of `~^:?*[\`, no `..` or `@{`, no empty or dot-leading components, and no
/// trailing `.lock`.
pub fn validate_feature_name(name: &str) -> Result<()> {
    let invalid = || Error::InvalidFeatureName(name.to_string());

    if name.is_empty() || name == "@" {
        return Err(invalid());
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || FORBIDDEN_CHARS.contains(&c))
    {
        return Err(invalid());
    }
    if name.contains("..") || name.contains("@{") || name.starts_with('-') {
        return Err(invalid());
    }
    if name.ends_with('.') || name.ends_with(".lock") {
        return Err(invalid());
    }
    if name
        .split('/')
        .any(|component| component.is_empty() || component.starts_with('.'))
    {
        return Err(invalid());
    }
    Ok(())
}

/// Look up and open a linked repository, mapping any failure to `NotFound`
fn open_linked<'r>(
    registry: &'r LinkRegistry,
    provider: &dyn RepositoryProvider,
    name: &str,
) -> Result<(&'r LinkedRepository, Box<dyn GitRepository>)> {
    let repository = registry.find(name)?;
    let repo = provider
        .open(&registry.absolute_path(repository))
        .map_err(|e| {
            debug!(repository = %repository.name, error = %e, "linked repository cannot be opened");
            Error::NotFound {
                name: name.to_string(),
                known: registry.names(),
            }
        })?;
    Ok((repository, repo))
}

/// Check out `branch`, creating a tracking branch when it only exists remotely
fn checkout_existing(repo: &dyn GitRepository, remote: &str, branch: &str) -> Result<()> {
    if repo.local_branches()?.iter().any(|b| b == branch) {
        repo.checkout(branch)
    } else {
        repo.checkout_tracking(remote, branch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_feature_names() {
        for name in ["login", "login-form", "ui/login", "JIRA-123_fix", "v2.1"] {
            assert!(validate_feature_name(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_feature_names() {
        for name in [
            "", "@", "with space", "a..b", "a~b", "a^b", "a:b", "a?b", "a*b", "a[b", "a\\b",
            "-lead", "trail.", "x.lock", "a//b", "/lead", "trail/", ".hidden", "a/.b", "a@{b",
            "tab\there",
        ] {
            assert!(
                matches!(validate_feature_name(name), Err(Error::InvalidFeatureName(_))),
                "{name:?} should be rejected"
            );
        }
    }
}

//! Shared test utilities

#![allow(dead_code, unused_imports)]

mod mock_platform;
mod mock_repo;
mod temp_git;

pub use mock_platform::{CreatePrCall, MockPlatformService, MockResolver, SharedPlatform, UpdateBodyCall};
pub use mock_repo::{
    Handle, MockProvider, MockRepository, MockWorkspace, PARENT_ROOT, RepoState, revision,
};
pub use temp_git::{TempWorkspace, git};

use subflow::types::{Platform, PlatformConfig, PullRequest};

/// GitHub config for `acme/parent`
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "acme".to_string(),
        repo: "parent".to_string(),
        host: None,
    }
}

/// A PR for `head` targeting `base`
pub fn make_pr(number: u64, head: &str, base: &str) -> PullRequest {
    PullRequest {
        number,
        html_url: format!("https://github.com/acme/repo/pull/{number}"),
        base_ref: base.to_string(),
        head_ref: head.to_string(),
        title: format!("PR for {head}"),
        is_draft: false,
    }
}

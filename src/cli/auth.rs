//! Auth command - check hosting credentials

use crate::cli::style::{Stylize, check};
use anstream::println;
use subflow::auth::{get_github_auth, get_gitlab_auth, test_github_auth, test_gitlab_auth};
use subflow::error::Result;
use subflow::types::Platform;

/// Run `auth github` / `auth gitlab`
pub async fn run_auth(platform: Platform, host: Option<&str>) -> Result<()> {
    let (login, source) = match platform {
        Platform::GitHub => {
            let config = get_github_auth(host).await?;
            (test_github_auth(&config).await?, config.source)
        }
        Platform::GitLab => {
            let config = get_gitlab_auth(host).await?;
            (test_gitlab_auth(&config).await?, config.source)
        }
    };

    println!(
        "{} {} authenticated as {} {}",
        check(),
        platform.emphasis(),
        login.accent(),
        format!("(token from {source})").muted()
    );
    Ok(())
}

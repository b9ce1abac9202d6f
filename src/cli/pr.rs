//! PR commands - link PR and parent pointer PR

use crate::cli::context::CommandContext;
use crate::cli::prompt::PromptPolicy;
use crate::cli::style::{Stylize, check, pr_link, spinner_style};
use anstream::println;
use chrono::Utc;
use indicatif::ProgressBar;
use std::time::Duration;
use subflow::decision::{AssumeYes, DecisionPolicy};
use subflow::error::Result;
use subflow::platform::RemotePlatformResolver;
use subflow::pr::{ParentPrOptions, ParentPrOutcome, create_link_pr, create_parent_pr};
use subflow::repo::RepositoryProvider;

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Run `pr link`
pub async fn run_pr_link(ctx: &CommandContext, repository: &str, draft: bool) -> Result<()> {
    let repository = ctx.registry.find(repository)?;
    let repo = ctx.provider.open(&ctx.registry.absolute_path(repository))?;
    let platform = ctx.linked_platform(repository, repo.as_ref()).await?;

    let progress = spinner(format!("Opening PR for {}...", repository.name.emphasis()));
    let outcome = create_link_pr(
        repository,
        repo.as_ref(),
        platform.as_ref(),
        &ctx.config,
        draft || ctx.config.draft,
    )
    .await;
    progress.finish_and_clear();
    let outcome = outcome?;

    let verb = if outcome.created { "Created" } else { "Existing" };
    println!(
        "{} {} PR {} {}",
        check(),
        verb,
        pr_link(&outcome.pr),
        outcome.pr.title.emphasis()
    );
    Ok(())
}

/// Run `pr parent`
pub async fn run_pr_parent(
    ctx: &CommandContext,
    feature: Option<&str>,
    draft: bool,
    yes: bool,
) -> Result<()> {
    let platform = ctx.parent_platform().await?;
    let prompt = PromptPolicy::default();
    let policy: &dyn DecisionPolicy = if yes { &AssumeYes } else { &prompt };
    let options = ParentPrOptions {
        feature_hint: feature,
        draft: draft || ctx.config.draft,
        now: Utc::now(),
    };

    let outcome = create_parent_pr(
        &ctx.registry,
        &ctx.provider,
        platform.as_ref(),
        &RemotePlatformResolver,
        policy,
        &ctx.config,
        &options,
    )
    .await?;

    match outcome {
        ParentPrOutcome::NothingToUpdate => {
            println!("{}", "Every pointer is up to date; nothing to propose.".muted());
        }
        ParentPrOutcome::Declined(changes) => println!(
            "{}",
            format!(
                "Not committed; {} pointer update(s) left pending.",
                changes.len()
            )
            .warn()
        ),
        ParentPrOutcome::Created { pr, changes } => println!(
            "{} Created parent PR {} updating {}",
            check(),
            pr_link(&pr),
            changes.repository_names().join(", ").accent()
        ),
        ParentPrOutcome::Existing { pr, changes } => println!(
            "{} Updated parent PR {} for {}",
            check(),
            pr_link(&pr),
            changes.repository_names().join(", ").accent()
        ),
    }
    Ok(())
}

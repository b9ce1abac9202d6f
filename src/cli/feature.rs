//! Feature commands - start and finish feature branches

use crate::cli::context::CommandContext;
use crate::cli::prompt::PromptPolicy;
use crate::cli::style::{Stylize, check};
use anstream::println;
use subflow::decision::{AssumeYes, DecisionPolicy};
use subflow::error::Result;
use subflow::feature::{finish_feature, start_feature};

/// Run `feature start`
pub fn run_feature_start(
    ctx: &CommandContext,
    repository: &str,
    feature: &str,
    yes: bool,
) -> Result<()> {
    let prompt = PromptPolicy::default();
    let policy: &dyn DecisionPolicy = if yes { &AssumeYes } else { &prompt };
    let started = start_feature(
        &ctx.registry,
        &ctx.provider,
        repository,
        feature,
        &ctx.config,
        policy,
    )?;

    println!(
        "{} {} on {} ({}, from {})",
        check(),
        started.branch.service_name.emphasis(),
        started.branch.branch_name.accent(),
        started.action,
        started.default_branch.muted()
    );
    Ok(())
}

/// Run `feature finish`
pub fn run_feature_finish(ctx: &CommandContext, repository: &str, feature: &str) -> Result<()> {
    let finished = finish_feature(&ctx.registry, &ctx.provider, repository, feature, &ctx.config)?;

    if finished.deleted {
        println!(
            "{} {} back on {}, deleted {}",
            check(),
            finished.branch.service_name.emphasis(),
            finished.default_branch.accent(),
            finished.branch.branch_name.muted()
        );
    } else {
        println!(
            "{} {} back on {} ({} did not exist locally)",
            check(),
            finished.branch.service_name.emphasis(),
            finished.default_branch.accent(),
            finished.branch.branch_name.muted()
        );
    }
    Ok(())
}

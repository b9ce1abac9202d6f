//! Sync command - reconcile every linked repository with its remote

use crate::cli::CliProgress;
use crate::cli::context::CommandContext;
use crate::cli::prompt::PromptPolicy;
use crate::cli::style::{CHECK, Stylize, arrow};
use anstream::println;
use subflow::decision::{AssumeYes, DecisionPolicy};
use subflow::error::Result;
use subflow::sync::{ParentUpdate, ReconcilePlan, SyncOptions, SyncReport, plan_all, reconcile_all};
use subflow::types::Outcome;

/// Options for the sync command
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncArgs {
    /// Stash dirty trees without asking
    pub force: bool,
    /// Show the plan without changing anything
    pub dry_run: bool,
    /// Answer yes to every prompt
    pub yes: bool,
}

/// Run the sync command
///
/// Returns the report so the caller can pick the exit code; `None` for a
/// dry run.
pub fn run_sync(ctx: &CommandContext, args: SyncArgs) -> Result<Option<SyncReport>> {
    let options = SyncOptions::from_config(&ctx.config, args.force);

    if args.dry_run {
        print_plan(ctx, &options);
        return Ok(None);
    }

    println!(
        "{} {} linked repositories against {}",
        "Syncing".emphasis(),
        ctx.registry.repositories().len().accent(),
        options.remote.accent()
    );

    let progress = CliProgress::compact();
    let prompt = PromptPolicy::with_progress(&progress);
    let policy: &dyn DecisionPolicy = if args.yes { &AssumeYes } else { &prompt };
    let report = reconcile_all(&ctx.registry, &ctx.provider, &options, policy, &progress);

    print_summary(&report);
    Ok(Some(report))
}

fn print_plan(ctx: &CommandContext, options: &SyncOptions) {
    println!("{}:", "Sync plan".emphasis());
    for (repository, plan) in plan_all(&ctx.registry, &ctx.provider, options) {
        println!();
        println!("  {}", repository.name.emphasis());
        match plan {
            Ok(ReconcilePlan::Skip { reason }) => {
                println!("    {}", format!("skip: {reason}").warn());
            }
            Ok(ReconcilePlan::Run { steps, .. }) => {
                for step in steps {
                    println!("    {} {step}", arrow());
                }
            }
            Err(e) => println!("    {}", e.to_string().error()),
        }
    }
    println!();
    println!("{}", "Dry run: nothing was changed.".muted());
}

fn print_summary(report: &SyncReport) {
    println!();
    println!(
        "{} {} synced, {} skipped, {} failed",
        format!("{CHECK} Sync complete:").success(),
        report.count(Outcome::Synced).accent(),
        report.count(Outcome::Skipped).accent(),
        report.count(Outcome::Failed).accent()
    );

    match &report.parent {
        ParentUpdate::Unchanged => {}
        ParentUpdate::Pending(changes) => println!(
            "{}",
            format!(
                "Parent pointers not committed for: {}",
                changes.repository_names().join(", ")
            )
            .warn()
        ),
        ParentUpdate::Committed(changes) => println!(
            "{}",
            format!(
                "Committed pointer updates in parent: {}",
                changes.repository_names().join(", ")
            )
            .success()
        ),
        ParentUpdate::Failed(message) => {
            println!("{}", format!("Parent pointer update failed: {message}").error());
        }
    }

    let stashes = report.stashes();
    if !stashes.is_empty() {
        println!(
            "{}",
            "Stashed changes can be restored with `git stash pop` in each repository.".muted()
        );
    }
}

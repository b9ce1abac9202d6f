//! Status command - read-only overview of the linked repositories

use crate::cli::context::CommandContext;
use crate::cli::style::Stylize;
use anstream::println;
use subflow::error::Result;
use subflow::pr::short_revision;
use subflow::sync::{SyncOptions, inspect_all};

/// Run the status command
pub fn run_status(ctx: &CommandContext) -> Result<()> {
    let options = SyncOptions::from_config(&ctx.config, false);
    let statuses = inspect_all(&ctx.registry, &ctx.provider, &options)?;

    if statuses.is_empty() {
        println!("{}", "No linked repositories in .gitmodules".muted());
        return Ok(());
    }

    for status in &statuses {
        let name = &status.repository.name;
        match &status.state {
            Ok(state) => {
                let branch = state
                    .current_branch
                    .clone()
                    .unwrap_or_else(|| format!("detached (default {})", state.default_branch));
                let tree = if state.is_clean {
                    "clean".success().to_string()
                } else {
                    "dirty".warn().to_string()
                };
                let pointer = if status.pointer_moved() {
                    format!(
                        "pointer {} -> {}",
                        status.recorded.as_deref().map_or("(none)", short_revision),
                        status.head.as_deref().map_or("?", short_revision)
                    )
                    .warn()
                    .to_string()
                } else {
                    "pointer up to date".muted().to_string()
                };
                println!(
                    "{} {} {} {}",
                    name.emphasis(),
                    branch.accent(),
                    tree,
                    pointer
                );
            }
            Err(e) => println!("{} {}", name.emphasis(), e.error()),
        }
        println!("  {}", status.repository.path.muted());
    }

    Ok(())
}

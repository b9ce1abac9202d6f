//! Interactive decision policy backed by dialoguer prompts

use crate::cli::CliProgress;
use crate::cli::style::{Stylize, arrow};
use anstream::println;
use dialoguer::{Confirm, Select};
use subflow::decision::{DecisionPolicy, DirtyTreeAction};
use subflow::pr::short_revision;
use subflow::types::{LinkedRepository, PointerChangeSet};
use tracing::warn;

/// Asks the user at every decision point
///
/// When the terminal cannot prompt, each decision falls back to the choice
/// that leaves state untouched. A running spinner is hidden while a prompt
/// is on screen.
#[derive(Clone, Copy, Default)]
pub struct PromptPolicy<'a> {
    progress: Option<&'a CliProgress>,
}

impl<'a> PromptPolicy<'a> {
    /// Prompts that pause the spinner of `progress` while they wait
    pub const fn with_progress(progress: &'a CliProgress) -> Self {
        Self {
            progress: Some(progress),
        }
    }

    fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.progress {
            Some(progress) => progress.suspend(f),
            None => f(),
        }
    }
}

impl DecisionPolicy for PromptPolicy<'_> {
    fn on_dirty_tree(&self, repository: &LinkedRepository) -> DirtyTreeAction {
        let choice = self.suspend(|| {
            Select::new()
                .with_prompt(format!(
                    "{} has uncommitted changes",
                    repository.name.emphasis()
                ))
                .items(&["Stash them and sync", "Skip this repository"])
                .default(1)
                .interact()
        });

        match choice {
            Ok(0) => DirtyTreeAction::Stash,
            Ok(_) => DirtyTreeAction::Skip,
            Err(e) => {
                warn!(error = %e, "cannot prompt, skipping dirty repository");
                DirtyTreeAction::Skip
            }
        }
    }

    fn confirm_branch_switch(&self, repository: &str, branch: &str) -> bool {
        self.suspend(|| {
            Confirm::new()
                .with_prompt(format!(
                    "Branch {} already exists in {}. Switch to it?",
                    branch.accent(),
                    repository.emphasis()
                ))
                .default(false)
                .interact()
        })
        .unwrap_or_else(|e| {
            warn!(error = %e, "cannot prompt, not switching");
            false
        })
    }

    fn confirm_parent_commit(&self, changes: &PointerChangeSet) -> bool {
        self.suspend(|| {
            println!("{}:", "Pointer updates".emphasis());
            for change in &changes.entries {
                println!(
                    "  {} {} {} {} {}",
                    arrow(),
                    change.repository.emphasis(),
                    change
                        .old_revision
                        .as_deref()
                        .map_or("(new)", short_revision)
                        .muted(),
                    arrow(),
                    short_revision(&change.new_revision).accent()
                );
            }

            Confirm::new()
                .with_prompt("Commit these pointer updates in the parent?")
                .default(true)
                .interact()
        })
        .unwrap_or_else(|e| {
            warn!(error = %e, "cannot prompt, not committing");
            false
        })
    }
}

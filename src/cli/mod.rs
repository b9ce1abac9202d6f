//! CLI command implementations

pub mod auth;
pub mod config;
pub mod context;
pub mod feature;
pub mod pr;
pub mod prompt;
pub mod status;
pub mod style;
pub mod sync;

use crate::cli::style::{Stylize, check, cross, spinner_style};
use anstream::println;
use indicatif::ProgressBar;
use std::cell::RefCell;
use std::time::Duration;
use subflow::progress::ProgressCallback;
use subflow::types::{LinkedRepository, Outcome, ReconciliationResult};

/// Exit code when some repositories failed but the report is complete
pub const EXIT_PARTIAL_FAILURE: u8 = 2;

/// Exit code for hard preconditions (not a parent repository, no auth)
pub const EXIT_PRECONDITION: u8 = 3;

/// Progress display: one spinner per repository, replaced by a result line
pub struct CliProgress {
    spinner: RefCell<Option<ProgressBar>>,
}

impl CliProgress {
    /// Spinner while working, one line per finished repository
    pub const fn compact() -> Self {
        Self {
            spinner: RefCell::new(None),
        }
    }

    /// Run `f` with the spinner hidden, e.g. while a prompt waits for input
    pub fn suspend<R>(&self, f: impl FnOnce() -> R) -> R {
        match self.spinner.borrow().as_ref() {
            Some(spinner) => spinner.suspend(f),
            None => f(),
        }
    }

    fn clear_spinner(&self) {
        if let Some(spinner) = self.spinner.borrow_mut().take() {
            spinner.finish_and_clear();
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_repository_start(&self, repository: &LinkedRepository) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(spinner_style());
        spinner.set_message(format!("Syncing {}...", repository.name.emphasis()));
        spinner.enable_steady_tick(Duration::from_millis(80));
        *self.spinner.borrow_mut() = Some(spinner);
    }

    fn on_result(&self, result: &ReconciliationResult) {
        self.clear_spinner();
        let name = &result.repository.name;
        match result.outcome {
            Outcome::Synced => println!("{} {} {}", check(), name.emphasis(), result.detail.muted()),
            Outcome::Skipped => println!(
                "{} {} {}",
                "-".warn(),
                name.emphasis(),
                format!("skipped: {}", result.detail).warn()
            ),
            Outcome::Failed => println!("{} {} {}", cross(), name.emphasis(), result.detail.error()),
        }
        if let Some(stash) = &result.stash {
            println!("  {}", format!("stashed as \"{stash}\"").muted());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> LinkedRepository {
        LinkedRepository {
            name: "services/api".to_string(),
            path: "services/api".to_string(),
            url: "https://github.com/acme/api.git".to_string(),
            branch: None,
        }
    }

    #[test]
    fn test_suspend_without_spinner_runs_closure() {
        let progress = CliProgress::compact();
        assert_eq!(progress.suspend(|| 7), 7);
    }

    #[test]
    fn test_suspend_hides_running_spinner() {
        let progress = CliProgress::compact();
        progress.on_repository_start(&repository());

        let during = progress.suspend(|| progress.spinner.try_borrow_mut().is_err());

        assert!(during, "prompt runs inside the spinner's suspend");
        assert!(progress.spinner.borrow().is_some());
        progress.clear_spinner();
        assert!(progress.spinner.borrow().is_none());
    }
}

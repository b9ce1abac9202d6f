//! Terminal styling helpers
//!
//! Output goes through `anstream`, which strips the ANSI codes when stdout
//! is not a terminal, so styles are applied unconditionally here.

use indicatif::ProgressStyle;
use owo_colors::{OwoColorize, Style, Styled};
use subflow::types::PullRequest;

/// Check mark used in summaries
pub const CHECK: &str = "✓";

/// Cross used for failures
pub const CROSS: &str = "✗";

/// Semantic styles for CLI output
pub trait Stylize: OwoColorize {
    /// Headings and names
    fn emphasis(&self) -> Styled<&Self> {
        self.style(Style::new().bold())
    }

    /// Secondary information
    fn muted(&self) -> Styled<&Self> {
        self.style(Style::new().dimmed())
    }

    /// Values the user cares about (branches, counts)
    fn accent(&self) -> Styled<&Self> {
        self.style(Style::new().cyan())
    }

    /// Completed actions
    fn success(&self) -> Styled<&Self> {
        self.style(Style::new().green())
    }

    /// Skips and soft failures
    fn warn(&self) -> Styled<&Self> {
        self.style(Style::new().yellow())
    }

    /// Hard failures
    fn error(&self) -> Styled<&Self> {
        self.style(Style::new().red().bold())
    }
}

impl<T: OwoColorize> Stylize for T {}

/// Green check mark
pub fn check() -> String {
    CHECK.success().to_string()
}

/// Red cross
pub fn cross() -> String {
    CROSS.error().to_string()
}

/// Dimmed arrow for list items
pub fn arrow() -> String {
    "→".muted().to_string()
}

/// Spinner style shared by long-running steps
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
}

/// `#12` as a clickable link when the terminal supports it, else with the URL
pub fn pr_link(pr: &PullRequest) -> String {
    let label = format!("#{}", pr.number);
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        terminal_link::Link::new(&label, &pr.html_url).to_string()
    } else {
        format!("{label} ({})", pr.html_url)
    }
}

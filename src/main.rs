//! subflow CLI
//!
//! Feature branches and two-stage PRs for git submodule workspaces.

mod cli;

use anstream::eprintln;
use anyhow::Context;
use clap::{Parser, Subcommand};
use cli::context::CommandContext;
use cli::style::Stylize;
use cli::sync::SyncArgs;
use cli::{EXIT_PARTIAL_FAILURE, EXIT_PRECONDITION};
use std::path::PathBuf;
use std::process::ExitCode;
use subflow::error::Error;
use subflow::types::Platform;
use tracing::debug;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser)]
#[command(name = "subflow")]
#[command(about = "Feature branches and two-stage PRs for git submodule workspaces")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path inside the parent repository (defaults to current directory)
    #[arg(long, global = true)]
    path: Option<PathBuf>,

    /// Remote to use instead of the configured one
    #[arg(long, global = true)]
    remote: Option<String>,

    /// More logging (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile every linked repository with its remote
    Sync {
        /// Stash uncommitted changes instead of asking
        #[arg(long)]
        force: bool,

        /// Show what would be done without changing anything
        #[arg(long)]
        dry_run: bool,

        /// Answer yes to every prompt; dirty repositories are skipped, not stashed
        #[arg(long, short)]
        yes: bool,
    },

    /// Show branch, cleanliness and pointer state of every linked repository
    Status,

    /// Manage feature branches in a linked repository
    Feature {
        #[command(subcommand)]
        command: FeatureCommands,
    },

    /// Open PRs for a linked repository or the parent
    Pr {
        #[command(subcommand)]
        command: PrCommands,
    },

    /// Check hosting platform credentials
    Auth {
        #[command(subcommand)]
        platform: AuthCommands,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum FeatureCommands {
    /// Create or resume feature/<name> from the updated default branch
    Start {
        /// Linked repository name (or path)
        repository: String,
        /// Feature name
        name: String,
        /// Switch to an existing local branch without asking
        #[arg(long, short)]
        yes: bool,
    },
    /// Return to the default branch and delete the local feature branch
    Finish {
        /// Linked repository name (or path)
        repository: String,
        /// Feature name
        name: String,
    },
}

#[derive(Subcommand)]
enum PrCommands {
    /// Push the checked out feature branch and open its PR
    Link {
        /// Linked repository name (or path)
        repository: String,
        /// Open as draft
        #[arg(long)]
        draft: bool,
    },
    /// Commit pointer updates on a branch and open a PR against the parent
    Parent {
        /// Feature name; the parent branch becomes feature/<name>
        #[arg(long)]
        feature: Option<String>,
        /// Open as draft
        #[arg(long)]
        draft: bool,
        /// Commit without asking
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum AuthCommands {
    /// Check GitHub authentication
    Github {
        /// GitHub Enterprise host
        #[arg(long, env = "GH_HOST")]
        host: Option<String>,
    },
    /// Check GitLab authentication
    Gitlab {
        /// Self-hosted GitLab host
        #[arg(long, env = "GITLAB_HOST")]
        host: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Write .subflow.toml in the parent repository
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Level from `-v`, unless `RUST_LOG` carries directives of its own
fn log_filter(verbose: u8, rust_log: Option<&str>) -> EnvFilter {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    EnvFilter::builder()
        .with_default_directive(level.into())
        .parse_lossy(rust_log.unwrap_or_default())
}

fn setup_logging(verbose: u8) {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_env_filter(log_filter(verbose, rust_log.as_deref()))
        .init();
}

/// Exit code for an error that stopped a command
fn exit_code_for(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<Error>() {
        Some(e) if e.is_hard_precondition() => ExitCode::from(EXIT_PRECONDITION),
        _ => ExitCode::FAILURE,
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let path = match cli.path {
        Some(path) => path,
        None => std::env::current_dir().context("cannot read current directory")?,
    };
    let remote = cli.remote.as_deref();
    debug!(path = %path.display(), "starting");

    match cli.command {
        Commands::Sync {
            force,
            dry_run,
            yes,
        } => {
            let ctx = CommandContext::new(&path, remote)?;
            let report = cli::sync::run_sync(&ctx, SyncArgs { force, dry_run, yes })?;
            if report.is_some_and(|r| r.is_partial_failure()) {
                return Ok(ExitCode::from(EXIT_PARTIAL_FAILURE));
            }
        }
        Commands::Status => {
            let ctx = CommandContext::new(&path, remote)?;
            cli::status::run_status(&ctx)?;
        }
        Commands::Feature { command } => {
            let ctx = CommandContext::new(&path, remote)?;
            match command {
                FeatureCommands::Start {
                    repository,
                    name,
                    yes,
                } => cli::feature::run_feature_start(&ctx, &repository, &name, yes)?,
                FeatureCommands::Finish { repository, name } => {
                    cli::feature::run_feature_finish(&ctx, &repository, &name)?;
                }
            }
        }
        Commands::Pr { command } => {
            let ctx = CommandContext::new(&path, remote)?;
            match command {
                PrCommands::Link { repository, draft } => {
                    cli::pr::run_pr_link(&ctx, &repository, draft).await?;
                }
                PrCommands::Parent {
                    feature,
                    draft,
                    yes,
                } => cli::pr::run_pr_parent(&ctx, feature.as_deref(), draft, yes).await?,
            }
        }
        Commands::Auth { platform } => match platform {
            AuthCommands::Github { host } => {
                cli::auth::run_auth(Platform::GitHub, host.as_deref()).await?;
            }
            AuthCommands::Gitlab { host } => {
                cli::auth::run_auth(Platform::GitLab, host.as_deref()).await?;
            }
        },
        Commands::Config { command } => match command {
            ConfigCommands::Init { force } => {
                let ctx = CommandContext::new(&path, remote)?;
                cli::config::run_config_init(&ctx, force)?;
            }
        },
    }

    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("{} {err:#}", "error:".error());
            exit_code_for(&err)
        }
    }
}

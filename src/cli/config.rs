//! Config command - write the effective configuration to the project file

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check};
use anstream::println;
use subflow::config::project_config_path;
use subflow::error::{Error, Result};

/// Run `config init`
pub fn run_config_init(ctx: &CommandContext, force: bool) -> Result<()> {
    let path = project_config_path(&ctx.parent_root);
    if path.exists() && !force {
        return Err(Error::Config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    let written = ctx.config.save(&ctx.parent_root)?;
    println!("{} Wrote {}", check(), written.display().accent());
    Ok(())
}

//! Configuration loaded from `subflow.toml`
//!
//! Lookup order: `<parent>/.subflow.toml`, then
//! `<config dir>/subflow/config.toml`, then built-in defaults. Only the
//! first file found is read; files are not merged.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename of the per-project configuration in the parent root
pub const PROJECT_CONFIG_FILE: &str = ".subflow.toml";

/// Directory name under the user's config dir
const APP_DIR: &str = "subflow";

/// Filename of the user-wide configuration
const USER_CONFIG_FILE: &str = "config.toml";

/// subflow settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote every linked repository is reconciled against
    pub remote: String,
    /// Default branch candidates when a repository has no remote `HEAD`
    pub default_branch_fallbacks: Vec<String>,
    /// Open PRs as drafts unless overridden on the command line
    pub draft: bool,
    /// Prefix for parent branches created without a feature hint
    pub parent_branch_prefix: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: "origin".to_string(),
            default_branch_fallbacks: vec!["main".to_string(), "master".to_string()],
            draft: false,
            parent_branch_prefix: "chore/update-links".to_string(),
        }
    }
}

impl Config {
    /// Load configuration for a parent repository
    pub fn load(parent_root: &Path) -> Result<Self> {
        let candidates = [Some(project_config_path(parent_root)), user_config_path()];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config");
                return Self::load_file(&path);
            }
        }
        debug!("no config file, using defaults");
        Ok(Self::default())
    }

    /// Load a specific configuration file
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))?;

        if config.remote.trim().is_empty() {
            return Err(Error::Config(format!(
                "{}: remote must not be empty",
                path.display()
            )));
        }
        Ok(config)
    }

    /// Write this configuration to `<parent>/.subflow.toml`
    pub fn save(&self, parent_root: &Path) -> Result<PathBuf> {
        let path = project_config_path(parent_root);
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
        let content_with_header = format!("# subflow configuration\n\n{content}");

        fs::write(&path, content_with_header)
            .map_err(|e| Error::Config(format!("failed to write {}: {e}", path.display())))?;
        Ok(path)
    }
}

/// Path of the per-project configuration file
pub fn project_config_path(parent_root: &Path) -> PathBuf {
    parent_root.join(PROJECT_CONFIG_FILE)
}

/// Path of the user-wide configuration file, if a config dir exists
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(USER_CONFIG_FILE))
}

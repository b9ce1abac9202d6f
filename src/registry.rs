//! Link registry - linked repositories declared in `.gitmodules`

use crate::error::{Error, Result};
use crate::types::LinkedRepository;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Filename of the submodule configuration in the parent root
pub const GITMODULES_FILE: &str = ".gitmodules";

/// The authoritative list of linked repositories for one parent repository
#[derive(Debug, Clone)]
pub struct LinkRegistry {
    parent_root: PathBuf,
    repositories: Vec<LinkedRepository>,
}

impl LinkRegistry {
    /// Load the registry from `<parent_root>/.gitmodules`
    pub fn load(parent_root: &Path) -> Result<Self> {
        let path = parent_root.join(GITMODULES_FILE);
        if !path.is_file() {
            return Err(Error::NotAParentRepository(parent_root.to_path_buf()));
        }

        let content = fs::read_to_string(&path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        let repositories = parse_gitmodules(&content)?;
        debug!(count = repositories.len(), "loaded link registry");

        Ok(Self {
            parent_root: parent_root.to_path_buf(),
            repositories,
        })
    }

    /// Build a registry from already parsed entries
    pub fn from_repositories(parent_root: &Path, repositories: Vec<LinkedRepository>) -> Self {
        Self {
            parent_root: parent_root.to_path_buf(),
            repositories,
        }
    }

    /// Parent repository root
    pub fn parent_root(&self) -> &Path {
        &self.parent_root
    }

    /// Linked repositories in declaration order
    pub fn repositories(&self) -> &[LinkedRepository] {
        &self.repositories
    }

    /// Registered names, for error messages
    pub fn names(&self) -> Vec<String> {
        self.repositories.iter().map(|r| r.name.clone()).collect()
    }

    /// Look up a linked repository by name, falling back to its path
    pub fn find(&self, name: &str) -> Result<&LinkedRepository> {
        let wanted = name.trim_end_matches('/');
        self.repositories
            .iter()
            .find(|r| r.name == wanted)
            .or_else(|| self.repositories.iter().find(|r| r.path == wanted))
            .ok_or_else(|| Error::NotFound {
                name: name.to_string(),
                known: self.names(),
            })
    }

    /// Absolute working directory of a linked repository
    pub fn absolute_path(&self, repository: &LinkedRepository) -> PathBuf {
        repository.absolute_path(&self.parent_root)
    }
}

/// Parse `.gitmodules` content into linked repositories
///
/// Every `[submodule "<name>"]` section must carry `path` and `url`;
/// `branch` is optional. A missing key is a configuration error rather than
/// a silently dropped entry.
pub fn parse_gitmodules(content: &str) -> Result<Vec<LinkedRepository>> {
    let file: gix::config::File<'static> = content
        .parse()
        .map_err(|e| Error::Config(format!("invalid {GITMODULES_FILE}: {e}")))?;

    let Some(sections) = file.sections_by_name("submodule") else {
        return Ok(Vec::new());
    };

    let mut repositories = Vec::new();
    for section in sections {
        let name = section
            .header()
            .subsection_name()
            .map(ToString::to_string)
            .ok_or_else(|| Error::Config("submodule section without a name".to_string()))?;

        let path = section
            .value("path")
            .map(|v| v.to_string())
            .ok_or_else(|| Error::Config(format!("submodule '{name}' has no path")))?;
        let url = section
            .value("url")
            .map(|v| v.to_string())
            .ok_or_else(|| Error::Config(format!("submodule '{name}' has no url")))?;
        let branch = section.value("branch").map(|v| v.to_string());

        repositories.push(LinkedRepository {
            name,
            path: path.trim_end_matches('/').to_string(),
            url,
            branch,
        });
    }

    Ok(repositories)
}

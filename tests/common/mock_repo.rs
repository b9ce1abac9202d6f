//! In-memory repositories for engine tests
//!
//! Each `MockRepository` shares its state with the test through an
//! `Arc<Mutex<RepoState>>`, so assertions can inspect what the engine did.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use subflow::error::{Error, Result};
use subflow::registry::LinkRegistry;
use subflow::repo::{GitRepository, RepoStatus, RepositoryProvider};
use subflow::types::LinkedRepository;

/// Root used for the parent in mock workspaces
pub const PARENT_ROOT: &str = "/work/parent";

/// Mutable state behind a mock repository
#[derive(Debug, Clone)]
pub struct RepoState {
    pub current_branch: Option<String>,
    pub is_clean: bool,
    pub local_branches: Vec<String>,
    pub remote_branches: Vec<String>,
    pub remote_head: Option<String>,
    pub head: String,
    pub remote_url: Option<String>,
    /// Recorded submodule pointers (parent only)
    pub pointers: HashMap<String, String>,
    /// Recorded pointers in other revisions, keyed by revision then path
    pub pointers_at: HashMap<String, HashMap<String, String>>,
    pub upstreams: HashSet<String>,
    /// Result of `commit_subjects`
    pub subjects: Vec<String>,
    pub stashes: Vec<String>,
    pub staged: Vec<String>,
    /// `(message, paths)` per commit
    pub commits: Vec<(String, Vec<String>)>,
    /// Branches `delete_branch` refuses as unmerged
    pub unmerged: HashSet<String>,
    /// Operation name -> error message
    pub failures: HashMap<String, String>,
    /// Pull refuses to fast-forward
    pub diverged: bool,
    /// Stashing leaves the tree dirty
    pub stash_leaves_dirty: bool,
    /// Log of mutating operations and fetches, e.g. `"pull origin main"`
    pub calls: Vec<String>,
}

impl RepoState {
    /// Clean repository on `main`, in sync with `origin/main`
    pub fn on_main(name: &str) -> Self {
        Self {
            current_branch: Some("main".to_string()),
            is_clean: true,
            local_branches: vec!["main".to_string()],
            remote_branches: vec!["main".to_string()],
            remote_head: Some("main".to_string()),
            head: revision(name, 1),
            remote_url: Some(format!("https://github.com/acme/{name}.git")),
            pointers: HashMap::new(),
            pointers_at: HashMap::new(),
            upstreams: HashSet::from(["main".to_string()]),
            subjects: Vec::new(),
            stashes: Vec::new(),
            staged: Vec::new(),
            commits: Vec::new(),
            unmerged: HashSet::new(),
            failures: HashMap::new(),
            diverged: false,
            stash_leaves_dirty: false,
            calls: Vec::new(),
        }
    }

    /// Make an operation fail with a git error
    pub fn fail(&mut self, operation: &str, message: &str) {
        self.failures
            .insert(operation.to_string(), message.to_string());
    }
}

/// Deterministic 40-character revision for a repository and generation
pub fn revision(name: &str, generation: u32) -> String {
    let seed = format!("{name}{generation}");
    seed.bytes()
        .cycle()
        .take(40)
        .map(|b| char::from(b"0123456789abcdef"[usize::from(b % 16)]))
        .collect()
}

/// Shared handle to a mock repository's state
pub type Handle = Arc<Mutex<RepoState>>;

/// A repository backed by [`RepoState`]
pub struct MockRepository {
    root: PathBuf,
    state: Handle,
}

impl MockRepository {
    fn with<T>(&self, f: impl FnOnce(&mut RepoState) -> T) -> T {
        f(&mut self.state.lock().unwrap())
    }

    fn check(&self, operation: &str) -> Result<()> {
        self.with(|s| match s.failures.get(operation) {
            Some(message) => Err(Error::Git {
                command: operation.to_string(),
                message: message.clone(),
            }),
            None => Ok(()),
        })
    }

    fn log(&self, call: String) {
        self.with(|s| s.calls.push(call));
    }
}

impl GitRepository for MockRepository {
    fn root(&self) -> &Path {
        &self.root
    }

    fn status(&self) -> Result<RepoStatus> {
        self.check("status")?;
        Ok(self.with(|s| RepoStatus {
            is_clean: s.is_clean,
            current_branch: s.current_branch.clone(),
        }))
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.log(format!("fetch {remote}"));
        self.check("fetch")
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        self.log(format!("pull {remote} {branch}"));
        self.check("pull")?;
        if self.with(|s| s.diverged) {
            return Err(Error::Diverged {
                branch: branch.to_string(),
                message: "Not possible to fast-forward, aborting.".to_string(),
            });
        }
        Ok(())
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.log(format!("checkout {branch}"));
        self.check("checkout")?;
        self.with(|s| {
            if !s.local_branches.iter().any(|b| b == branch) {
                return Err(Error::Git {
                    command: format!("checkout {branch}"),
                    message: format!("pathspec '{branch}' did not match"),
                });
            }
            s.current_branch = Some(branch.to_string());
            Ok(())
        })
    }

    fn checkout_tracking(&self, remote: &str, branch: &str) -> Result<()> {
        self.log(format!("checkout --track {remote}/{branch}"));
        self.check("checkout_tracking")?;
        self.with(|s| {
            if !s.remote_branches.iter().any(|b| b == branch) {
                return Err(Error::Git {
                    command: format!("checkout -b {branch}"),
                    message: format!("'{remote}/{branch}' is not a commit"),
                });
            }
            s.local_branches.push(branch.to_string());
            s.upstreams.insert(branch.to_string());
            s.current_branch = Some(branch.to_string());
            Ok(())
        })
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.log(format!("create_branch {name}"));
        self.check("create_branch")?;
        self.with(|s| {
            if s.local_branches.iter().any(|b| b == name) {
                return Err(Error::Git {
                    command: format!("checkout -b {name}"),
                    message: format!("a branch named '{name}' already exists"),
                });
            }
            s.local_branches.push(name.to_string());
            s.current_branch = Some(name.to_string());
            Ok(())
        })
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.log(format!("delete_branch {name}"));
        self.check("delete_branch")?;
        self.with(|s| {
            if s.unmerged.contains(name) {
                return Err(Error::Git {
                    command: format!("branch -d {name}"),
                    message: format!("the branch '{name}' is not fully merged"),
                });
            }
            s.local_branches.retain(|b| b != name);
            Ok(())
        })
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| s.local_branches.clone()))
    }

    fn remote_branches(&self, _remote: &str) -> Result<Vec<String>> {
        Ok(self.with(|s| s.remote_branches.clone()))
    }

    fn remote_head(&self, _remote: &str) -> Result<Option<String>> {
        Ok(self.with(|s| s.remote_head.clone()))
    }

    fn stash(&self, message: &str) -> Result<()> {
        self.log(format!("stash {message}"));
        self.check("stash")?;
        self.with(|s| {
            s.stashes.push(message.to_string());
            if !s.stash_leaves_dirty {
                s.is_clean = true;
            }
        });
        Ok(())
    }

    fn stash_list(&self) -> Result<Vec<String>> {
        Ok(self.with(|s| {
            s.stashes
                .iter()
                .rev()
                .enumerate()
                .map(|(i, m)| format!("stash@{{{i}}}: On main: {m}"))
                .collect()
        }))
    }

    fn add(&self, paths: &[&str]) -> Result<()> {
        self.log(format!("add {}", paths.join(" ")));
        self.check("add")?;
        self.with(|s| s.staged.extend(paths.iter().map(ToString::to_string)));
        Ok(())
    }

    fn commit(&self, message: &str, paths: &[&str]) -> Result<()> {
        self.log("commit".to_string());
        self.check("commit")?;
        self.with(|s| {
            s.commits.push((
                message.to_string(),
                paths.iter().map(ToString::to_string).collect(),
            ));
            s.staged.clear();
        });
        Ok(())
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        let flag = if set_upstream { " -u" } else { "" };
        self.log(format!("push{flag} {remote} {branch}"));
        self.check("push")?;
        self.with(|s| {
            if set_upstream {
                s.upstreams.insert(branch.to_string());
            }
            if !s.remote_branches.iter().any(|b| b == branch) {
                s.remote_branches.push(branch.to_string());
            }
        });
        Ok(())
    }

    fn has_upstream(&self, branch: &str) -> Result<bool> {
        Ok(self.with(|s| s.upstreams.contains(branch)))
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>> {
        Ok(self.with(|s| (name == "origin").then(|| s.remote_url.clone()).flatten()))
    }

    fn head_commit(&self) -> Result<String> {
        self.check("head_commit")?;
        Ok(self.with(|s| s.head.clone()))
    }

    fn recorded_pointer_at(&self, revision: &str, path: &str) -> Result<Option<String>> {
        Ok(self.with(|s| {
            if revision == "HEAD" {
                s.pointers.get(path).cloned()
            } else {
                s.pointers_at.get(revision).and_then(|p| p.get(path)).cloned()
            }
        }))
    }

    fn commit_subjects(&self, base: &str, head: &str) -> Result<Vec<String>> {
        self.log(format!("log {base}..{head}"));
        Ok(self.with(|s| s.subjects.clone()))
    }
}

/// Opens mock repositories registered by path
#[derive(Default)]
pub struct MockProvider {
    repos: Mutex<HashMap<PathBuf, Handle>>,
}

impl MockProvider {
    /// Register a repository at `path`
    pub fn add(&self, path: impl Into<PathBuf>, state: RepoState) -> Handle {
        let handle = Arc::new(Mutex::new(state));
        self.repos
            .lock()
            .unwrap()
            .insert(path.into(), Arc::clone(&handle));
        handle
    }

    /// Forget a repository, as if its directory were missing
    pub fn remove(&self, path: &Path) {
        self.repos.lock().unwrap().remove(path);
    }
}

impl RepositoryProvider for MockProvider {
    fn open(&self, path: &Path) -> Result<Box<dyn GitRepository>> {
        let state = self.repos.lock().unwrap().get(path).cloned();
        match state {
            Some(state) => Ok(Box::new(MockRepository {
                root: path.to_path_buf(),
                state,
            })),
            None => Err(Error::NotARepository {
                path: path.to_path_buf(),
                reason: "directory does not exist".to_string(),
            }),
        }
    }
}

/// A parent with linked repositories under `services/<name>`
///
/// Every recorded pointer starts equal to the linked repository's HEAD.
pub struct MockWorkspace {
    pub registry: LinkRegistry,
    pub provider: MockProvider,
    pub parent: Handle,
    pub repos: HashMap<String, Handle>,
}

impl MockWorkspace {
    /// Build a workspace with the given linked repository names
    pub fn new(names: &[&str]) -> Self {
        let provider = MockProvider::default();
        let root = PathBuf::from(PARENT_ROOT);

        let mut parent_state = RepoState::on_main("parent");
        let mut repositories = Vec::new();
        let mut repos = HashMap::new();

        for name in names {
            let repository = LinkedRepository {
                name: (*name).to_string(),
                path: format!("services/{name}"),
                url: format!("https://github.com/acme/{name}.git"),
                branch: None,
            };
            let state = RepoState::on_main(name);
            parent_state
                .pointers
                .insert(repository.path.clone(), state.head.clone());
            let handle = provider.add(repository.absolute_path(&root), state);
            repos.insert((*name).to_string(), handle);
            repositories.push(repository);
        }

        let parent = provider.add(root.clone(), parent_state);
        Self {
            registry: LinkRegistry::from_repositories(&root, repositories),
            provider,
            parent,
            repos,
        }
    }

    /// State handle of a linked repository
    pub fn repo(&self, name: &str) -> Handle {
        Arc::clone(&self.repos[name])
    }

    /// Move a linked repository's HEAD so it no longer matches the parent
    pub fn advance(&self, name: &str) -> String {
        let new_head = revision(name, 2);
        self.repos[name].lock().unwrap().head = new_head.clone();
        new_head
    }

    /// Logged calls of a linked repository
    pub fn calls(&self, name: &str) -> Vec<String> {
        self.repos[name].lock().unwrap().calls.clone()
    }
}

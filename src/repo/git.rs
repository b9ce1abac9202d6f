//! Git adapter backed by the `git` executable

use super::{GitRepository, RepoStatus, RepositoryProvider};
use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tracing::debug;

/// A repository driven through the `git` command line
#[derive(Debug, Clone)]
pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    /// Open the repository whose working directory is exactly `path`
    ///
    /// The directory must exist and be the top of a git work tree (a `.git`
    /// directory or a submodule's `.git` file). Parent directories are never
    /// searched, so an uninitialized submodule directory is rejected instead
    /// of silently resolving to the parent repository.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.is_dir() {
            return Err(Error::NotARepository {
                path: path.to_path_buf(),
                reason: "directory does not exist".to_string(),
            });
        }

        gix::open(path).map_err(|e| Error::NotARepository {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            root: path.to_path_buf(),
        })
    }

    /// Find the parent repository root starting from `start`
    ///
    /// When `start` is inside a linked repository, the superproject's work
    /// tree is returned.
    pub fn find_parent_root(start: &Path) -> Result<PathBuf> {
        let lookup = Self {
            root: start.to_path_buf(),
        };
        let superproject = lookup.run(&["rev-parse", "--show-superproject-working-tree"])?;
        let superproject = superproject.trim();
        if !superproject.is_empty() {
            return Ok(PathBuf::from(superproject));
        }
        let toplevel = lookup.run(&["rev-parse", "--show-toplevel"])?;
        Ok(PathBuf::from(toplevel.trim()))
    }

    fn output(&self, args: &[&str]) -> Result<Output> {
        debug!(root = %self.root.display(), args = ?args, "running git");
        Command::new("git")
            .args(args)
            .current_dir(&self.root)
            .env("LC_ALL", "C")
            .output()
            .map_err(|e| Error::GitUnavailable(e.to_string()))
    }

    /// Run git and return stdout, mapping a failed exit status to [`Error::Git`]
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Err(Error::Git {
                command: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run git where a failed exit status means "no answer" rather than an error
    fn run_optional(&self, args: &[&str]) -> Result<Option<String>> {
        let output = self.output(args)?;
        if !output.status.success() {
            return Ok(None);
        }
        let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(if stdout.is_empty() { None } else { Some(stdout) })
    }
}

/// Whether a failed pull needs a manual merge rather than a retry
fn is_divergence(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("fast-forward") || lower.contains("diverg") || lower.contains("conflict")
}

fn lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(ToString::to_string)
        .collect()
}

impl GitRepository for GitCli {
    fn root(&self) -> &Path {
        &self.root
    }

    fn status(&self) -> Result<RepoStatus> {
        let porcelain = self.run(&["status", "--porcelain"])?;
        let current_branch = self.run_optional(&["symbolic-ref", "--quiet", "--short", "HEAD"])?;
        Ok(RepoStatus {
            is_clean: porcelain.trim().is_empty(),
            current_branch,
        })
    }

    fn fetch(&self, remote: &str) -> Result<()> {
        self.run(&["fetch", remote]).map(|_| ())
    }

    fn pull(&self, remote: &str, branch: &str) -> Result<()> {
        match self.run(&["pull", "--ff-only", remote, branch]) {
            Err(Error::Git { message, .. }) if is_divergence(&message) => Err(Error::Diverged {
                branch: branch.to_string(),
                message,
            }),
            other => other.map(|_| ()),
        }
    }

    fn checkout(&self, branch: &str) -> Result<()> {
        self.run(&["checkout", branch]).map(|_| ())
    }

    fn checkout_tracking(&self, remote: &str, branch: &str) -> Result<()> {
        let upstream = format!("{remote}/{branch}");
        self.run(&["checkout", "-b", branch, "--track", &upstream])
            .map(|_| ())
    }

    fn create_branch(&self, name: &str) -> Result<()> {
        self.run(&["checkout", "-b", name]).map(|_| ())
    }

    fn delete_branch(&self, name: &str) -> Result<()> {
        self.run(&["branch", "-d", name]).map(|_| ())
    }

    fn local_branches(&self) -> Result<Vec<String>> {
        let out = self.run(&["for-each-ref", "--format=%(refname:short)", "refs/heads/"])?;
        Ok(lines(&out))
    }

    fn remote_branches(&self, remote: &str) -> Result<Vec<String>> {
        let prefix = format!("refs/remotes/{remote}/");
        let out = self.run(&["for-each-ref", "--format=%(refname)", &prefix])?;
        Ok(lines(&out)
            .into_iter()
            .filter_map(|r| r.strip_prefix(&prefix).map(ToString::to_string))
            .filter(|name| name != "HEAD")
            .collect())
    }

    fn remote_head(&self, remote: &str) -> Result<Option<String>> {
        let head_ref = format!("refs/remotes/{remote}/HEAD");
        let prefix = format!("refs/remotes/{remote}/");
        Ok(self
            .run_optional(&["symbolic-ref", "--quiet", &head_ref])?
            .and_then(|target| target.strip_prefix(&prefix).map(ToString::to_string)))
    }

    fn stash(&self, message: &str) -> Result<()> {
        self.run(&["stash", "push", "--include-untracked", "-m", message])
            .map(|_| ())
    }

    fn stash_list(&self) -> Result<Vec<String>> {
        Ok(lines(&self.run(&["stash", "list"])?))
    }

    fn add(&self, paths: &[&str]) -> Result<()> {
        let mut args = vec!["add", "--"];
        args.extend_from_slice(paths);
        self.run(&args).map(|_| ())
    }

    fn commit(&self, message: &str, paths: &[&str]) -> Result<()> {
        let mut args = vec!["commit", "-m", message];
        if !paths.is_empty() {
            args.extend_from_slice(&["--only", "--"]);
            args.extend_from_slice(paths);
        }
        self.run(&args).map(|_| ())
    }

    fn push(&self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.extend_from_slice(&[remote, branch]);
        self.run(&args).map(|_| ())
    }

    fn has_upstream(&self, branch: &str) -> Result<bool> {
        let spec = format!("{branch}@{{upstream}}");
        Ok(self
            .run_optional(&["rev-parse", "--abbrev-ref", "--symbolic-full-name", &spec])?
            .is_some())
    }

    fn remote_url(&self, name: &str) -> Result<Option<String>> {
        self.run_optional(&["remote", "get-url", name])
    }

    fn head_commit(&self) -> Result<String> {
        Ok(self.run(&["rev-parse", "HEAD"])?.trim().to_string())
    }

    fn recorded_pointer_at(&self, revision: &str, path: &str) -> Result<Option<String>> {
        // "<mode> <type> <object>\t<path>"; submodules are "commit" entries
        let out = self.run(&["ls-tree", revision, "--", path])?;
        Ok(out.lines().find_map(|line| {
            let mut fields = line.split_whitespace();
            match (fields.next(), fields.next(), fields.next()) {
                (Some(_mode), Some("commit"), Some(object)) => Some(object.to_string()),
                _ => None,
            }
        }))
    }

    fn commit_subjects(&self, base: &str, head: &str) -> Result<Vec<String>> {
        let range = format!("{base}..{head}");
        Ok(lines(&self.run(&["log", "--format=%s", &range])?))
    }
}

/// Opens [`GitCli`] repositories
#[derive(Debug, Clone, Copy, Default)]
pub struct GitCliProvider;

impl RepositoryProvider for GitCliProvider {
    fn open(&self, path: &Path) -> Result<Box<dyn GitRepository>> {
        Ok(Box::new(GitCli::open(path)?))
    }
}

//! Real git workspaces in temporary directories
//!
//! Layout under one temp dir:
//! - `remotes/<name>.git` - bare remotes
//! - `seed/<name>` - clones used to push "upstream" commits
//! - `parent/` - the parent repository with linked repositories under
//!   `services/<name>`

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// Run git in `dir`, panicking with stderr on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(["-c", "protocol.file.allow=always"])
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("git should run");
    assert!(
        output.status.success(),
        "git {args:?} failed in {}: {}",
        dir.display(),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn set_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Test"]);
    git(dir, &["config", "user.email", "test@example.com"]);
}

/// Temporary parent repository with linked repositories and bare remotes
pub struct TempWorkspace {
    dir: TempDir,
    names: Vec<String>,
}

impl TempWorkspace {
    /// Create a parent with one linked repository per name, all on `main`
    pub fn new(names: &[&str]) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let ws = Self {
            dir,
            names: names.iter().map(ToString::to_string).collect(),
        };

        fs::create_dir_all(ws.root().join("remotes")).unwrap();
        fs::create_dir_all(ws.root().join("seed")).unwrap();

        for name in names {
            let remote = ws.remote(name);
            git(ws.root(), &["init", "--bare", "-b", "main", remote.to_str().unwrap()]);
            let seed = ws.seed(name);
            git(
                ws.root(),
                &["clone", remote.to_str().unwrap(), seed.to_str().unwrap()],
            );
            set_identity(&seed);
            git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
            fs::write(seed.join("README.md"), format!("# {name}\n")).unwrap();
            git(&seed, &["add", "README.md"]);
            git(&seed, &["commit", "-m", &format!("Initial {name}")]);
            git(&seed, &["push", "-u", "origin", "main"]);
        }

        let parent_remote = ws.remote("parent");
        git(
            ws.root(),
            &["init", "--bare", "-b", "main", parent_remote.to_str().unwrap()],
        );

        let parent = ws.parent();
        fs::create_dir_all(&parent).unwrap();
        git(&parent, &["init", "-b", "main"]);
        set_identity(&parent);
        fs::write(parent.join("README.md"), "# parent\n").unwrap();
        git(&parent, &["add", "README.md"]);
        for name in names {
            git(
                &parent,
                &[
                    "submodule",
                    "add",
                    ws.remote(name).to_str().unwrap(),
                    &format!("services/{name}"),
                ],
            );
            let linked = ws.linked(name);
            set_identity(&linked);
            // Some git versions leave the clone detached
            git(&linked, &["checkout", "main"]);
        }
        git(&parent, &["commit", "-m", "Link repositories"]);
        git(
            &parent,
            &["remote", "add", "origin", parent_remote.to_str().unwrap()],
        );
        git(&parent, &["push", "-u", "origin", "main"]);
        git(&parent, &["remote", "set-head", "origin", "main"]);

        ws
    }

    /// Temp dir root
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Parent working directory
    pub fn parent(&self) -> PathBuf {
        self.root().join("parent")
    }

    /// Bare remote of a repository (`parent` for the parent)
    pub fn remote(&self, name: &str) -> PathBuf {
        self.root().join("remotes").join(format!("{name}.git"))
    }

    /// Seed clone of a linked repository's remote
    pub fn seed(&self, name: &str) -> PathBuf {
        self.root().join("seed").join(name)
    }

    /// Linked repository working directory inside the parent
    pub fn linked(&self, name: &str) -> PathBuf {
        self.parent().join("services").join(name)
    }

    /// Push a new commit to a linked repository's remote; returns its hash
    pub fn push_upstream(&self, name: &str, file: &str) -> String {
        let seed = self.seed(name);
        fs::write(seed.join(file), format!("{file}\n")).unwrap();
        git(&seed, &["add", file]);
        git(&seed, &["commit", "-m", &format!("Add {file}")]);
        git(&seed, &["push", "origin", "main"]);
        git(&seed, &["rev-parse", "HEAD"])
    }

    /// Commit a file in a linked repository's working directory
    pub fn commit_linked(&self, name: &str, file: &str, message: &str) -> String {
        let linked = self.linked(name);
        fs::write(linked.join(file), format!("{file}\n")).unwrap();
        git(&linked, &["add", file]);
        git(&linked, &["commit", "-m", message]);
        git(&linked, &["rev-parse", "HEAD"])
    }

    /// HEAD of a directory
    pub fn head(&self, dir: &Path) -> String {
        git(dir, &["rev-parse", "HEAD"])
    }

    /// Branch checked out in a directory (`HEAD` when detached)
    pub fn branch(&self, dir: &Path) -> String {
        git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
    }

    /// Pointer the parent's HEAD records for a linked repository
    pub fn recorded(&self, name: &str) -> String {
        let line = git(
            &self.parent(),
            &["ls-tree", "HEAD", "--", &format!("services/{name}")],
        );
        line.split_whitespace().nth(2).unwrap_or_default().to_string()
    }
}

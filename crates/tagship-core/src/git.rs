use crate::errors::Result;
use crate::process::{Executor, OutputMode};
use std::path::{Path, PathBuf};

/// Version-control operations consumed by the release flow.
pub trait VersionControl {
    /// All tag names in the repository.
    fn list_tags(&self) -> Result<Vec<String>>;
    /// Commit sha a tag points at.
    fn resolve_tag(&self, tag: &str) -> Result<String>;
    /// One-line summaries of commits in `<since>..HEAD` touching `path`.
    fn commits_since(&self, since: &str, path: &Path) -> Result<Vec<String>>;
    /// Unstaged working-tree diff; empty when nothing changed.
    fn diff(&self) -> Result<String>;
    fn stage_all(&self) -> Result<()>;
    fn commit(&self, message: &str) -> Result<()>;
    fn create_tag(&self, tag: &str) -> Result<()>;
    /// Push a single ref (e.g. `refs/tags/foo@1.0.0`) to the upstream remote.
    fn push_ref(&self, refname: &str) -> Result<()>;
    /// Push the current branch to its upstream.
    fn push_branch(&self) -> Result<()>;
}

pub const DEFAULT_REMOTE: &str = "origin";

/// `git` CLI backed implementation.
#[derive(Debug, Clone)]
pub struct SystemGit {
    root: PathBuf,
    executor: Executor,
}

impl SystemGit {
    pub fn new(root: impl Into<PathBuf>, executor: Executor) -> Self {
        Self {
            root: root.into(),
            executor,
        }
    }

    fn query(&self, args: &[&str]) -> Result<String> {
        self.executor.capture("git", args, &self.root)
    }

    fn mutate(&self, args: &[&str]) -> Result<()> {
        self.executor
            .run("git", args, &self.root, OutputMode::Inherit)
    }
}

impl VersionControl for SystemGit {
    fn list_tags(&self) -> Result<Vec<String>> {
        Ok(non_empty_lines(&self.query(&["tag"])?))
    }

    fn resolve_tag(&self, tag: &str) -> Result<String> {
        self.query(&["rev-list", "-n", "1", tag])
    }

    fn commits_since(&self, since: &str, path: &Path) -> Result<Vec<String>> {
        let range = format!("{since}..HEAD");
        let path = path.to_string_lossy();
        let out = self.query(&["--no-pager", "log", &range, "--oneline", "--", &path])?;
        Ok(non_empty_lines(&out))
    }

    fn diff(&self) -> Result<String> {
        self.query(&["diff"])
    }

    fn stage_all(&self) -> Result<()> {
        self.mutate(&["add", "-A"])
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.mutate(&["commit", "-m", message])
    }

    fn create_tag(&self, tag: &str) -> Result<()> {
        self.mutate(&["tag", tag])
    }

    fn push_ref(&self, refname: &str) -> Result<()> {
        self.mutate(&["push", DEFAULT_REMOTE, refname])
    }

    fn push_branch(&self) -> Result<()> {
        self.mutate(&["push"])
    }
}

fn non_empty_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Latest release tag for `package`, by lexicographic order of `<package>@*` tags.
pub fn latest_release_tag(tags: &[String], package: &str) -> Option<String> {
    let prefix = format!("{package}@");
    tags.iter()
        .filter(|tag| tag.starts_with(&prefix))
        .max()
        .cloned()
}

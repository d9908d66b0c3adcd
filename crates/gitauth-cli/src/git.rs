//! Thin wrapper over the `git` executable.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitError {
    #[error("failed to run git: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("{path} is not a git repository")]
    NotARepository { path: PathBuf },

    #[error("git {command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("{name} commit '{rev}' not found")]
    UnknownRevision { name: &'static str, rev: String },

    #[error("start commit {start} is not an ancestor of end commit {end}")]
    NotAncestor { start: String, end: String },
}

/// A repository on disk, driven through `git -C <root>`.
#[derive(Debug, Clone)]
pub struct GitRepo {
    root: PathBuf,
}

impl GitRepo {
    /// Open the repository containing `path` (default: current directory).
    pub fn open(path: Option<&Path>) -> Result<Self, GitError> {
        let root = path.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        let repo = Self { root };
        let output = repo.run(&["rev-parse", "--git-dir"])?;
        if !output.status.success() {
            return Err(GitError::NotARepository { path: repo.root });
        }
        Ok(repo)
    }

    fn run(&self, args: &[&str]) -> Result<Output, GitError> {
        tracing::debug!(root = %self.root.display(), ?args, "running git");
        let output = Command::new("git").arg("-C").arg(&self.root).args(args).output()?;
        if !output.status.success() {
            tracing::debug!(
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git exited unsuccessfully"
            );
        }
        Ok(output)
    }

    fn run_checked(&self, args: &[&str]) -> Result<String, GitError> {
        let output = self.run(args)?;
        if !output.status.success() {
            return Err(GitError::CommandFailed {
                command: args.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    pub fn has_commits(&self) -> Result<bool, GitError> {
        Ok(self.run(&["rev-parse", "--verify", "--quiet", "HEAD"])?.status.success())
    }

    /// Full hash of `rev`, or `None` if it does not resolve.
    pub fn resolve(&self, rev: &str) -> Result<Option<String>, GitError> {
        let output = self.run(&["rev-parse", "--verify", "--quiet", &format!("{rev}^{{commit}}")])?;
        if !output.status.success() {
            return Ok(None);
        }
        Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string()))
    }

    pub fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool, GitError> {
        Ok(self
            .run(&["merge-base", "--is-ancestor", ancestor, descendant])?
            .status
            .success())
    }

    pub fn has_parent(&self, rev: &str) -> Result<bool, GitError> {
        Ok(self
            .run(&["rev-parse", "--verify", "--quiet", &format!("{rev}^")])?
            .status
            .success())
    }

    /// Commit hashes in `range`, newest first.
    pub fn list_commits(&self, range: &str) -> Result<Vec<String>, GitError> {
        let stdout = self.run_checked(&["log", "--format=%H", range])?;
        Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// `git show --numstat --format= <hash>` output.
    pub fn numstat(&self, hash: &str) -> Result<String, GitError> {
        self.run_checked(&["show", "--numstat", "--format=", hash])
    }

    /// Range covering `start` through `end`, including `start` itself.
    pub fn inclusive_range(&self, start: &str, end: &str) -> Result<String, GitError> {
        let start_hash = self.resolve(start)?.ok_or_else(|| GitError::UnknownRevision {
            name: "Start",
            rev: start.to_string(),
        })?;
        let end_hash = self.resolve(end)?.ok_or_else(|| GitError::UnknownRevision {
            name: "End",
            rev: end.to_string(),
        })?;
        if !self.is_ancestor(&start_hash, &end_hash)? {
            return Err(GitError::NotAncestor {
                start: start_hash,
                end: end_hash,
            });
        }

        if self.has_parent(&start_hash)? {
            Ok(format!("{start_hash}^..{end_hash}"))
        } else {
            // root commit: everything reachable from end
            Ok(end_hash)
        }
    }
}

/// `--commits` shortcut: a bare number means the last N commits.
pub fn commits_shortcut(spec: &str) -> String {
    if !spec.is_empty() && spec.bytes().all(|b| b.is_ascii_digit()) {
        format!("HEAD~{spec}..HEAD")
    } else {
        spec.to_string()
    }
}

//! Local repository operations.
//!
//! The few operations that never go through the remote service: repository
//! discovery, user identity, the lockable-attribute probe, dumping file
//! content at a revision, and the working-tree resets used by revert.
//!
//! # Public API
//! - [`LocalRepo`]: trait consumed by workers
//! - [`GitCli`]: implementation on `git2` plus the `git` executable
//! - [`CommitInfo`]: HEAD commit id and summary
//! - [`find_repository_root`]: walk up from a directory to the work tree root

use crate::core::error::{Result, VcsBridgeError};
use git2::{AttrCheckFlags, AttrValue, Repository};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommitInfo {
    pub short_id: String,
    pub summary: String,
}

pub trait LocalRepo: Send + Sync {
    /// Configured user name, if any
    fn user_name(&self) -> Result<Option<String>>;

    /// Which of `patterns` (e.g. `*.uasset`) carry the `lockable` attribute
    fn probe_lockable(&self, patterns: &[String]) -> Result<Vec<String>>;

    /// Write the content of `relative` at `commit` into `destination`
    fn dump_at_revision(&self, commit: &str, relative: &str, destination: &Path) -> Result<()>;

    /// All files under `dir`, tracked or untracked but not ignored
    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>>;

    /// Unstage changes for `files`
    fn reset_index(&self, files: &[PathBuf]) -> Result<()>;

    /// Restore the working copy of `files` from the index
    fn restore_working_copy(&self, files: &[PathBuf]) -> Result<()>;

    /// Hard reset plus removal of untracked files and directories
    fn reset_all(&self) -> Result<()>;

    /// Mark conflicted files as resolved
    fn mark_resolved(&self, files: &[PathBuf]) -> Result<()>;

    fn head_commit(&self) -> Result<Option<CommitInfo>>;
}

/// Find the work tree root containing `start`
pub fn find_repository_root(start: &Path) -> Result<PathBuf> {
    let repo = Repository::discover(start).map_err(|_| VcsBridgeError::NotInGitRepo)?;
    let workdir = repo.workdir().ok_or(VcsBridgeError::NotInGitRepo)?;
    let root = workdir
        .canonicalize()
        .unwrap_or_else(|_| workdir.to_path_buf());
    Ok(root)
}

pub struct GitCli {
    root: PathBuf,
}

impl GitCli {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn open(&self) -> Result<Repository> {
        Ok(Repository::open(&self.root)?)
    }

    /// Run a git command in the work tree and return its stdout
    fn execute_git_command(&self, name: &str, mut cmd: std::process::Command) -> Result<Vec<u8>> {
        cmd.current_dir(&self.root);
        log::debug!("Running git {} in {}", name, self.root.display());

        let output = cmd.output()?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            return Err(VcsBridgeError::cli_failed(name, error_msg.trim()));
        }

        Ok(output.stdout)
    }

    fn git_with_files(&self, name: &str, args: &[&str], files: &[PathBuf]) -> Result<()> {
        if files.is_empty() {
            return Ok(());
        }

        let mut cmd = std::process::Command::new("git");
        cmd.args(args).arg("--");
        for file in files {
            cmd.arg(file);
        }

        self.execute_git_command(name, cmd).map(|_| ())
    }
}

impl LocalRepo for GitCli {
    fn user_name(&self) -> Result<Option<String>> {
        let repo = self.open()?;
        let config = repo.config()?;
        Ok(config.get_string("user.name").ok())
    }

    fn probe_lockable(&self, patterns: &[String]) -> Result<Vec<String>> {
        let repo = self.open()?;
        let mut lockable = Vec::new();

        for pattern in patterns {
            let extension = pattern.trim_start_matches('*');
            let sample = format!("__probe__{}", extension);
            let value = repo.get_attr(
                Path::new(&sample),
                "lockable",
                AttrCheckFlags::FILE_THEN_INDEX,
            )?;
            if matches!(AttrValue::from_string(value), AttrValue::True) {
                lockable.push(extension.to_string());
            }
        }

        Ok(lockable)
    }

    fn dump_at_revision(&self, commit: &str, relative: &str, destination: &Path) -> Result<()> {
        let mut cmd = std::process::Command::new("git");
        cmd.arg("cat-file")
            .arg("--filters")
            .arg(format!("{}:{}", commit, relative));

        let content = self.execute_git_command("cat-file", cmd)?;
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(destination, content)?;
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut cmd = std::process::Command::new("git");
        cmd.args(["ls-files", "--cached", "--others", "--exclude-standard", "-z", "--"])
            .arg(dir);

        let stdout = self.execute_git_command("ls-files", cmd)?;
        let mut files: Vec<PathBuf> = stdout
            .split(|b| *b == 0)
            .filter(|entry| !entry.is_empty())
            .map(|entry| self.root.join(String::from_utf8_lossy(entry).as_ref()))
            .collect();
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn reset_index(&self, files: &[PathBuf]) -> Result<()> {
        self.git_with_files("reset", &["reset", "-q"], files)
    }

    fn restore_working_copy(&self, files: &[PathBuf]) -> Result<()> {
        self.git_with_files("checkout", &["checkout"], files)
    }

    fn reset_all(&self) -> Result<()> {
        let mut cmd = std::process::Command::new("git");
        cmd.args(["reset", "--hard"]);
        self.execute_git_command("reset", cmd)?;

        let mut cmd = std::process::Command::new("git");
        cmd.args(["clean", "-f", "-d"]);
        self.execute_git_command("clean", cmd)?;
        Ok(())
    }

    fn mark_resolved(&self, files: &[PathBuf]) -> Result<()> {
        self.git_with_files("add", &["add"], files)
    }

    fn head_commit(&self) -> Result<Option<CommitInfo>> {
        let repo = self.open()?;
        let head = match repo.head() {
            Ok(head) => head,
            Err(_) => return Ok(None),
        };
        let Some(oid) = head.target() else {
            return Ok(None);
        };
        let commit = repo.find_commit(oid)?;
        let summary = commit.summary().unwrap_or("").to_string();
        Ok(Some(CommitInfo {
            short_id: oid.to_string()[..7].to_string(),
            summary,
        }))
    }
}

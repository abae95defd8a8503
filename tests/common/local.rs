//! Local repository fake backed by a real directory tree

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Instant;
use vcs_bridge::core::error::{Result, VcsBridgeError};
use vcs_bridge::core::local::{CommitInfo, LocalRepo};

pub struct FakeLocal {
    lockable: Vec<String>,
    restore_failures: AtomicU32,
    restore_attempts: Mutex<Vec<Instant>>,
    calls: Mutex<Vec<String>>,
}

impl Default for FakeLocal {
    fn default() -> Self {
        Self {
            lockable: vec![".uasset".to_string()],
            restore_failures: AtomicU32::new(0),
            restore_attempts: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakeLocal {
    /// The next `count` restores fail as if the file were held open
    pub fn fail_restores(&self, count: u32) {
        self.restore_failures.store(count, Ordering::SeqCst);
    }

    pub fn restore_attempts(&self) -> Vec<Instant> {
        self.restore_attempts.lock().unwrap().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }

    fn record(&self, call: impl Into<String>) {
        self.calls.lock().unwrap().push(call.into());
    }
}

fn walk(dir: &Path, files: &mut Vec<PathBuf>) -> std::io::Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, files)?;
        } else {
            files.push(path);
        }
    }
    Ok(())
}

impl LocalRepo for FakeLocal {
    fn user_name(&self) -> Result<Option<String>> {
        Ok(Some("local-user".to_string()))
    }

    fn probe_lockable(&self, _patterns: &[String]) -> Result<Vec<String>> {
        self.record("probe");
        Ok(self.lockable.clone())
    }

    fn dump_at_revision(&self, commit: &str, relative: &str, destination: &Path) -> Result<()> {
        self.record(format!("dump:{}:{}", commit, relative));
        std::fs::write(destination, format!("{} at {}", relative, commit))?;
        Ok(())
    }

    fn list_files(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        if dir.is_dir() {
            walk(dir, &mut files)?;
        }
        files.sort();
        Ok(files)
    }

    fn reset_index(&self, files: &[PathBuf]) -> Result<()> {
        self.record(format!("reset_index:{}", files.len()));
        Ok(())
    }

    fn restore_working_copy(&self, files: &[PathBuf]) -> Result<()> {
        self.restore_attempts.lock().unwrap().push(Instant::now());
        self.record(format!("restore:{}", files.len()));

        let remaining = self.restore_failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.restore_failures.store(remaining - 1, Ordering::SeqCst);
            return Err(VcsBridgeError::cli_failed(
                "checkout",
                "unable to unlink old file: Permission denied",
            ));
        }
        Ok(())
    }

    fn reset_all(&self) -> Result<()> {
        self.record("reset_all");
        Ok(())
    }

    fn mark_resolved(&self, files: &[PathBuf]) -> Result<()> {
        self.record(format!("resolve:{}", files.len()));
        Ok(())
    }

    fn head_commit(&self) -> Result<Option<CommitInfo>> {
        Ok(Some(CommitInfo {
            short_id: "abc1234".to_string(),
            summary: "Initial import".to_string(),
        }))
    }
}

//! Workspaces wired to scripted collaborators.
//!
//! A [`Workspace`] is a temporary repository root with a `Content` directory,
//! a [`FakeBackend`] and a [`FakeLocal`]. It builds worker contexts, commands
//! and providers that all share the same fakes.

#![allow(dead_code)]

use super::backend::FakeBackend;
use super::local::FakeLocal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tempfile::TempDir;
use vcs_bridge::core::command::{Command, CommandId, Concurrency};
use vcs_bridge::core::context::WorkerContext;
use vcs_bridge::core::state::FileStatus;
use vcs_bridge::{Operation, Provider, ProviderConfig};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
    pub backend: Arc<FakeBackend>,
    pub local: Arc<FakeLocal>,
}

impl Workspace {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let root = temp_dir.path().canonicalize()?;
        std::fs::create_dir_all(root.join("Content"))?;

        Ok(Self {
            temp_dir,
            root,
            backend: Arc::new(FakeBackend::default()),
            local: Arc::new(FakeLocal::default()),
        })
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }

    /// Create a file on disk and return its absolute path
    pub fn file(&self, relative: &str) -> anyhow::Result<PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, relative)?;
        Ok(path)
    }

    /// Polling off and only `Content` as content root
    pub fn config(&self, worker_threads: usize) -> ProviderConfig {
        ProviderConfig {
            content_roots: vec![PathBuf::from("Content")],
            lockable_patterns: vec!["*.uasset".to_string()],
            worker_threads,
            poll_interval_secs: 0,
            max_consecutive_failures: 3,
            ..ProviderConfig::default()
        }
    }

    /// A connected context: `.uasset` is lockable and the lock user is `me`
    pub fn context(&self) -> WorkerContext {
        let ctx = WorkerContext::new(self.backend.clone(), self.local.clone(), self.root.clone())
            .with_content_roots(&[PathBuf::from("Content")])
            .with_lock_user(Some("me".to_string()));
        ctx.lockable.register([".uasset"]);
        ctx
    }

    pub fn command(&self, operation: Operation, prior: &[(&Path, FileStatus)]) -> Command {
        let prior_states: HashMap<PathBuf, FileStatus> = prior
            .iter()
            .map(|(path, status)| (path.to_path_buf(), status.clone()))
            .collect();
        Command::new(
            CommandId(NEXT_ID.fetch_add(1, Ordering::SeqCst)),
            operation,
            Concurrency::Asynchronous,
            prior_states,
        )
    }

    pub fn provider(&self, worker_threads: usize) -> Provider {
        Provider::with_collaborators(
            self.config(worker_threads),
            self.root.clone(),
            self.backend.clone(),
            self.local.clone(),
        )
    }

    /// Provider after Connect and the initial full fetch have been drained
    pub fn connected_provider(&self, worker_threads: usize) -> anyhow::Result<Provider> {
        let mut provider = self.provider(worker_threads);
        anyhow::ensure!(provider.init(), "connect failed: {:?}", provider.last_errors());
        provider.wait_idle();
        Ok(provider)
    }
}

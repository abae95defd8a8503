//! Shared state handed to every worker.
//!
//! One [`WorkerContext`] is owned by the provider behind an `Arc` and cloned
//! into each pool task. Everything mutable in it is internally synchronized:
//! the lockable registry, the locked-files cache and the lock user.

use crate::core::backend::Backend;
use crate::core::local::LocalRepo;
use crate::core::lockable::LockableRegistry;
use crate::core::locked_files::LockedFilesCache;
use crate::core::paths::normalize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

pub struct WorkerContext {
    pub backend: Arc<dyn Backend>,
    pub local: Arc<dyn LocalRepo>,
    pub root: PathBuf,
    /// Absolute directories refreshed when a status update names no files
    pub content_roots: Vec<PathBuf>,
    pub lockable_patterns: Vec<String>,
    pub lockable: LockableRegistry,
    pub locked_files: LockedFilesCache,
    configured_lock_user: Option<String>,
    lock_user: RwLock<String>,
}

impl WorkerContext {
    pub fn new(backend: Arc<dyn Backend>, local: Arc<dyn LocalRepo>, root: PathBuf) -> Self {
        Self {
            backend,
            local,
            root,
            content_roots: Vec::new(),
            lockable_patterns: Vec::new(),
            lockable: LockableRegistry::new(),
            locked_files: LockedFilesCache::new(),
            configured_lock_user: None,
            lock_user: RwLock::new(String::new()),
        }
    }

    /// Content roots relative to the repository root
    pub fn with_content_roots(mut self, roots: &[PathBuf]) -> Self {
        self.content_roots = roots.iter().map(|r| normalize(r, &self.root)).collect();
        self
    }

    pub fn with_lockable_patterns(mut self, patterns: Vec<String>) -> Self {
        self.lockable_patterns = patterns;
        self
    }

    pub fn with_lock_user(mut self, user: Option<String>) -> Self {
        if let Some(user) = &user {
            self.set_lock_user(user.clone());
        }
        self.configured_lock_user = user;
        self
    }

    pub fn configured_lock_user(&self) -> Option<&str> {
        self.configured_lock_user.as_deref()
    }

    pub fn lock_user(&self) -> String {
        self.lock_user
            .read()
            .map(|user| user.clone())
            .unwrap_or_default()
    }

    pub fn set_lock_user(&self, user: String) {
        if let Ok(mut current) = self.lock_user.write() {
            *current = user;
        }
    }

    pub fn is_lockable(&self, path: &Path) -> bool {
        self.lockable.is_lockable(path)
    }
}

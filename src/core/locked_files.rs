//! Files we believe we hold a lock on, and who holds it.
//!
//! Lock workers add entries optimistically and the revert worker removes them
//! after unlocking. Status translation overlays this map on snapshots that
//! were not force-refreshed, so a stale snapshot cannot un-lock a file we
//! locked a moment ago.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
pub struct LockedFilesCache {
    files: Mutex<HashMap<PathBuf, String>>,
}

impl LockedFilesCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn guard(&self) -> MutexGuard<'_, HashMap<PathBuf, String>> {
        match self.files.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn add(&self, path: impl Into<PathBuf>, owner: impl Into<String>) {
        self.guard().insert(path.into(), owner.into());
    }

    pub fn remove(&self, path: &Path) -> bool {
        self.guard().remove(path).is_some()
    }

    pub fn owner(&self, path: &Path) -> Option<String> {
        self.guard().get(path).cloned()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.guard().contains_key(path)
    }

    /// Replace the whole map, used after an authoritative status refresh
    pub fn replace_all(&self, files: HashMap<PathBuf, String>) {
        *self.guard() = files;
    }

    pub fn snapshot(&self) -> HashMap<PathBuf, String> {
        self.guard().clone()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let cache = LockedFilesCache::new();
        cache.add("/repo/A.uasset", "alice");
        assert_eq!(cache.owner(Path::new("/repo/A.uasset")).as_deref(), Some("alice"));

        assert!(cache.remove(Path::new("/repo/A.uasset")));
        assert!(!cache.remove(Path::new("/repo/A.uasset")));
        assert!(!cache.contains(Path::new("/repo/A.uasset")));
    }

    #[test]
    fn test_replace_all_drops_old_entries() {
        let cache = LockedFilesCache::new();
        cache.add("/repo/A.uasset", "alice");

        let mut fresh = HashMap::new();
        fresh.insert(PathBuf::from("/repo/B.uasset"), "alice".to_string());
        cache.replace_all(fresh);

        assert!(!cache.contains(Path::new("/repo/A.uasset")));
        assert!(cache.contains(Path::new("/repo/B.uasset")));
    }
}

//! Registry of lockable file extensions.
//!
//! Filled once from the local repository's attributes at connect time and
//! only ever appended to afterwards. Concurrent probes register the same
//! answer, so readers never observe an extension disappearing.

use crate::core::paths::extension_of;
use std::path::Path;
use std::sync::RwLock;

#[derive(Debug, Default)]
pub struct LockableRegistry {
    extensions: RwLock<Vec<String>>,
}

impl LockableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add extensions (`.uasset` or `*.uasset` form). Duplicates are ignored.
    pub fn register<I, S>(&self, extensions: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut known = match self.extensions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        for ext in extensions {
            let ext = ext.as_ref().trim_start_matches('*').to_lowercase();
            if ext.is_empty() {
                continue;
            }
            if !known.contains(&ext) {
                log::debug!("Registered lockable extension {}", ext);
                known.push(ext);
            }
        }
    }

    pub fn is_lockable(&self, path: &Path) -> bool {
        let Some(ext) = extension_of(path) else {
            return false;
        };
        match self.extensions.read() {
            Ok(known) => known.contains(&ext),
            Err(poisoned) => poisoned.into_inner().contains(&ext),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self.extensions.read() {
            Ok(known) => known.is_empty(),
            Err(poisoned) => poisoned.into_inner().is_empty(),
        }
    }

    pub fn extensions(&self) -> Vec<String> {
        match self.extensions.read() {
            Ok(known) => known.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

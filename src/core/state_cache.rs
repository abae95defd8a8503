//! The authoritative per-file state map.
//!
//! Owned by the dispatcher and touched only from the owning thread, so it
//! needs no locking. Entries are created lazily as fully unknown the first
//! time anyone asks about a file.
//!
//! # Public API
//! - [`StateCache`]: entries plus the one-shot ignore-force set
//!
//! # Timestamps
//! A merge refreshes the entry timestamp, except on a file's first
//! observation: then the timestamp is set to the oldest representable time
//! so that the next status query treats the entry as stale.

use crate::core::state::{CachedState, FileStatus, MergeOutcome, Revision};
use chrono::{DateTime, Duration, Utc};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct StateCache {
    states: HashMap<PathBuf, CachedState>,
    ignore_force: HashSet<PathBuf>,
}

impl StateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &Path) -> Option<&CachedState> {
        self.states.get(path)
    }

    pub fn get_or_create(&mut self, path: &Path) -> &mut CachedState {
        self.states
            .entry(path.to_path_buf())
            .or_insert_with(|| CachedState::new(path.to_path_buf()))
    }

    /// Snapshot of the current status, creating the entry if needed
    pub fn status_of(&mut self, path: &Path) -> FileStatus {
        self.get_or_create(path).status.clone()
    }

    /// Merge command deltas. Returns the files whose status changed.
    pub fn merge_states(&mut self, deltas: &HashMap<PathBuf, FileStatus>) -> Vec<PathBuf> {
        let now = Utc::now();
        let mut changed = Vec::new();

        for (path, delta) in deltas {
            let entry = self.get_or_create(path);
            let first_observation = entry.status.is_unknown();

            match entry.status.merge(delta) {
                MergeOutcome::RejectedAdd => {
                    log::debug!(
                        "Ignoring Added state for {}: file is neither unknown nor addable",
                        path.display()
                    );
                    continue;
                }
                MergeOutcome::Changed => changed.push(path.clone()),
                MergeOutcome::Unchanged => {}
            }

            entry.timestamp = if first_observation {
                DateTime::<Utc>::MIN_UTC
            } else {
                now
            };

            // We just got fresh information: a forced refresh can skip it once
            self.ignore_force.insert(path.clone());
        }

        changed.sort();
        changed
    }

    pub fn set_history(&mut self, path: &Path, history: Vec<Revision>) {
        let entry = self.get_or_create(path);
        entry.history = history;
        entry.timestamp = Utc::now();
    }

    pub fn remove_file(&mut self, path: &Path) -> bool {
        self.ignore_force.remove(path);
        self.states.remove(path).is_some()
    }

    pub fn add_ignore_force(&mut self, path: &Path) {
        self.ignore_force.insert(path.to_path_buf());
    }

    pub fn remove_ignore_force(&mut self, path: &Path) -> bool {
        self.ignore_force.remove(path)
    }

    pub fn is_ignored_force(&self, path: &Path) -> bool {
        self.ignore_force.contains(path)
    }

    pub fn files(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self.states.keys().cloned().collect();
        files.sort();
        files
    }

    /// Files among `files` whose entry is missing or older than `max_age`
    pub fn stale_files(&self, files: &[PathBuf], max_age: Duration) -> Vec<PathBuf> {
        let cutoff = Utc::now()
            .checked_sub_signed(max_age)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        files
            .iter()
            .filter(|path| match self.states.get(path.as_path()) {
                Some(entry) => entry.timestamp < cutoff,
                None => true,
            })
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn clear(&mut self) {
        self.states.clear();
        self.ignore_force.clear();
    }
}

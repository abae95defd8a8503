//! Per-file revision-control state and the axis merge rule.
//!
//! A file's status is tracked along four independent axes. Each axis has an
//! `Unset` value meaning "not observed": a delta carrying `Unset` on an axis
//! leaves the cached value for that axis untouched.
//!
//! # Public API
//! - [`FileState`], [`TreeState`], [`LockState`], [`RemoteState`]: the four axes
//! - [`FileStatus`]: one value per axis plus lock owner and head branch
//! - [`MergeOutcome`]: result of merging a delta into a cached status
//! - [`CachedState`]: a cache entry (status, timestamp, history)
//! - [`Revision`]: one entry of a file's history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content-level state of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FileState {
    #[default]
    Unset,
    Unknown,
    Added,
    Modified,
    Deleted,
    Unmerged,
}

/// Position of a file relative to the working tree and index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TreeState {
    #[default]
    Unset,
    NotInRepo,
    Untracked,
    /// Modified in the working tree
    Working,
    Staged,
    Unmodified,
    Ignored,
}

/// Exclusive lock state of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LockState {
    #[default]
    Unset,
    /// The file type does not take locks
    Unlockable,
    NotLocked,
    /// Locked by the current user
    Locked,
    LockedOther,
}

/// State of a file relative to the tracked upstream branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RemoteState {
    #[default]
    Unset,
    UpToDate,
    NotAtHead,
    /// Modified on another status branch
    NotLatest,
}

/// Four-axis status of one file, used both as cached value and as delta
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileStatus {
    pub file: FileState,
    pub tree: TreeState,
    pub lock: LockState,
    pub remote: RemoteState,
    /// Lock owner, meaningful when `lock` is `Locked` or `LockedOther`
    pub lock_user: Option<String>,
    /// Branch the file was modified on, meaningful when `remote` is not current
    pub head_branch: Option<String>,
}

/// Result of [`FileStatus::merge`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    Changed,
    Unchanged,
    /// An `Added` delta arrived for a file that cannot be added
    RejectedAdd,
}

impl FileStatus {
    /// The status of a file nothing has been observed about yet
    pub fn unknown() -> Self {
        Self {
            file: FileState::Unknown,
            tree: TreeState::NotInRepo,
            ..Self::default()
        }
    }

    /// A delta touching only the lock axis
    pub fn with_lock(lock: LockState, lock_user: Option<String>) -> Self {
        Self {
            lock,
            lock_user,
            ..Self::default()
        }
    }

    /// A delta touching only the file and tree axes
    pub fn with_file(file: FileState, tree: TreeState) -> Self {
        Self {
            file,
            tree,
            ..Self::default()
        }
    }

    /// Merge a delta into this status, axis by axis.
    ///
    /// Non-`Unset` axes of `delta` overwrite ours. The lock owner travels with
    /// the lock axis and the head branch with the remote axis. A delta whose
    /// file axis is `Added` is dropped as a whole unless this file is still
    /// unknown or can be added.
    pub fn merge(&mut self, delta: &FileStatus) -> MergeOutcome {
        if delta.file == FileState::Added && !self.is_unknown() && !self.can_add() {
            return MergeOutcome::RejectedAdd;
        }

        if self.overlay(delta) {
            MergeOutcome::Changed
        } else {
            MergeOutcome::Unchanged
        }
    }

    /// Apply the per-axis rule without the `Added` guard. Returns whether
    /// anything changed.
    pub fn overlay(&mut self, delta: &FileStatus) -> bool {
        let before = self.clone();

        if delta.file != FileState::Unset {
            self.file = delta.file;
        }
        if delta.tree != TreeState::Unset {
            self.tree = delta.tree;
        }
        if delta.lock != LockState::Unset {
            self.lock = delta.lock;
            self.lock_user = delta.lock_user.clone();
        }
        if delta.remote != RemoteState::Unset {
            self.remote = delta.remote;
            self.head_branch = delta.head_branch.clone();
        }

        *self != before
    }

    pub fn is_unknown(&self) -> bool {
        self.file == FileState::Unknown && self.tree == TreeState::NotInRepo
    }

    pub fn can_add(&self) -> bool {
        self.tree == TreeState::Untracked
    }

    /// Newly added: staged, or untracked but already locked by us
    pub fn is_added(&self) -> bool {
        self.tree == TreeState::Staged
            || (self.tree == TreeState::Untracked && self.lock == LockState::Locked)
    }

    pub fn is_deleted(&self) -> bool {
        self.file == FileState::Deleted
    }

    pub fn is_conflicted(&self) -> bool {
        self.file == FileState::Unmerged
    }

    pub fn is_modified(&self) -> bool {
        matches!(self.tree, TreeState::Working | TreeState::Staged)
    }

    pub fn is_source_controlled(&self) -> bool {
        !matches!(
            self.tree,
            TreeState::Untracked | TreeState::Ignored | TreeState::NotInRepo
        )
    }

    /// Not behind the head of its branch nor modified on another status branch
    pub fn is_current(&self) -> bool {
        !matches!(self.remote, RemoteState::NotAtHead | RemoteState::NotLatest)
    }

    /// A tracked, lockable, unlocked and current file can be checked out
    pub fn can_checkout(&self) -> bool {
        if matches!(self.tree, TreeState::NotInRepo | TreeState::Untracked) {
            return false;
        }
        if self.lock == LockState::Unlockable {
            return false;
        }
        self.lock == LockState::NotLocked && self.is_current()
    }

    /// Whether the file may be submitted. Lockable files need our lock,
    /// other files need local modifications.
    pub fn can_check_in(&self, lockable: bool) -> bool {
        if self.is_added() {
            return true;
        }
        if !self.is_current() || self.is_conflicted() {
            return false;
        }
        if lockable {
            self.lock == LockState::Locked
        } else {
            self.is_modified()
        }
    }

    pub fn can_revert(&self, lockable: bool) -> bool {
        self.can_check_in(lockable) || self.is_modified()
    }
}

/// One entry in a file's revision history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    pub filename: PathBuf,
    pub commit_id: String,
    pub short_commit_id: String,
    pub revision_number: i32,
    pub user: String,
    pub date: DateTime<Utc>,
    pub action: String,
    pub description: String,
    pub file_size: u64,
}

/// A State Cache entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedState {
    pub path: PathBuf,
    pub status: FileStatus,
    /// When the entry was last refreshed. `DateTime::<Utc>::MIN_UTC` marks an
    /// entry that must be fetched on the next status query.
    pub timestamp: DateTime<Utc>,
    pub history: Vec<Revision>,
}

impl CachedState {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            status: FileStatus::unknown(),
            timestamp: DateTime::<Utc>::MIN_UTC,
            history: Vec::new(),
        }
    }
}

//! User-facing classification of a merged [`FileStatus`].
//!
//! [`classify`] maps the four axes onto one [`DisplayCategory`] using a fixed
//! precedence: the first matching rule wins. Nothing here fails; anything not
//! matched falls through to [`DisplayCategory::None`].
//!
//! # Public API
//! - [`DisplayCategory`]: the categories shown to users
//! - [`classify`]: the precedence function
//! - [`display_name`] / [`DisplayCategory::description`]: text for hosts

use crate::core::state::{FileState, FileStatus, LockState, RemoteState, TreeState};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisplayCategory {
    /// Behind the head of its branch: must be pulled first
    NotAtHead,
    LockedByOther,
    ModifiedOnOtherBranch,
    Added,
    Unmerged,
    Deleted,
    Modified,
    Untracked,
    CheckedOut,
    /// Tracked and available to check out
    Lockable,
    Unmodified,
    None,
}

/// Classify a status. Order matters: a file both locked by someone else and
/// modified on another branch is `LockedByOther`.
pub fn classify(status: &FileStatus) -> DisplayCategory {
    if status.remote == RemoteState::NotAtHead {
        return DisplayCategory::NotAtHead;
    }

    if status.lock == LockState::LockedOther {
        return DisplayCategory::LockedByOther;
    }

    if status.remote == RemoteState::NotLatest {
        return DisplayCategory::ModifiedOnOtherBranch;
    }

    if status.is_added() {
        return DisplayCategory::Added;
    }

    match status.file {
        FileState::Unmerged => return DisplayCategory::Unmerged,
        FileState::Deleted => return DisplayCategory::Deleted,
        FileState::Modified => return DisplayCategory::Modified,
        _ => {}
    }

    if status.tree == TreeState::Untracked {
        return DisplayCategory::Untracked;
    }

    if status.lock == LockState::Locked {
        return DisplayCategory::CheckedOut;
    }

    if status.is_source_controlled() {
        if status.can_checkout() {
            return DisplayCategory::Lockable;
        }
        return DisplayCategory::Unmodified;
    }

    DisplayCategory::None
}

impl DisplayCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayCategory::NotAtHead => "not-at-head",
            DisplayCategory::LockedByOther => "locked-other",
            DisplayCategory::ModifiedOnOtherBranch => "other-branch",
            DisplayCategory::Added => "added",
            DisplayCategory::Unmerged => "conflicted",
            DisplayCategory::Deleted => "deleted",
            DisplayCategory::Modified => "modified",
            DisplayCategory::Untracked => "untracked",
            DisplayCategory::CheckedOut => "checked-out",
            DisplayCategory::Lockable => "lockable",
            DisplayCategory::Unmodified => "unmodified",
            DisplayCategory::None => "unknown",
        }
    }

    /// Longer explanation, suitable for tooltips
    pub fn description(&self) -> &'static str {
        match self {
            DisplayCategory::NotAtHead => "The file(s) are not at the head revision",
            DisplayCategory::LockedByOther => "The file(s) are checked out by another user",
            DisplayCategory::ModifiedOnOtherBranch => {
                "The file(s) were modified on another status branch"
            }
            DisplayCategory::Added => "The file(s) are opened for add",
            DisplayCategory::Unmerged => {
                "The contents of the item conflict with updates received from the repository"
            }
            DisplayCategory::Deleted => "The file(s) are marked for delete",
            DisplayCategory::Modified | DisplayCategory::CheckedOut => {
                "The file(s) are checked out"
            }
            DisplayCategory::Untracked => "Item is not under revision control",
            DisplayCategory::Lockable => "The file(s) are marked locally as read-only",
            DisplayCategory::Unmodified => "The file(s) are unmodified",
            DisplayCategory::None => "Unknown revision control state",
        }
    }
}

impl fmt::Display for DisplayCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Short human-readable label for a status, including lock owner or branch
pub fn display_name(status: &FileStatus) -> String {
    match classify(status) {
        DisplayCategory::NotAtHead => "Not current".to_string(),
        DisplayCategory::LockedByOther => format!(
            "Checked out by: {}",
            status.lock_user.as_deref().unwrap_or("unknown")
        ),
        DisplayCategory::ModifiedOnOtherBranch => format!(
            "Modified in branch: {}",
            status.head_branch.as_deref().unwrap_or("unknown")
        ),
        DisplayCategory::Unmerged => "Conflicted".to_string(),
        DisplayCategory::Added => "Opened for add".to_string(),
        DisplayCategory::Untracked => "Not Under Revision Control".to_string(),
        DisplayCategory::Deleted => "Marked for delete".to_string(),
        DisplayCategory::Modified | DisplayCategory::CheckedOut => "Checked out".to_string(),
        DisplayCategory::Lockable => "Read only".to_string(),
        DisplayCategory::Unmodified => "Unmodified".to_string(),
        DisplayCategory::None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(file: FileState, tree: TreeState, lock: LockState, remote: RemoteState) -> FileStatus {
        FileStatus {
            file,
            tree,
            lock,
            remote,
            lock_user: None,
            head_branch: None,
        }
    }

    const FILE_STATES: [FileState; 6] = [
        FileState::Unset,
        FileState::Unknown,
        FileState::Added,
        FileState::Modified,
        FileState::Deleted,
        FileState::Unmerged,
    ];
    const TREE_STATES: [TreeState; 7] = [
        TreeState::Unset,
        TreeState::NotInRepo,
        TreeState::Untracked,
        TreeState::Working,
        TreeState::Staged,
        TreeState::Unmodified,
        TreeState::Ignored,
    ];
    const LOCK_STATES: [LockState; 5] = [
        LockState::Unset,
        LockState::Unlockable,
        LockState::NotLocked,
        LockState::Locked,
        LockState::LockedOther,
    ];

    #[test]
    fn test_not_at_head_wins_over_everything() {
        for file in FILE_STATES {
            for tree in TREE_STATES {
                for lock in LOCK_STATES {
                    let s = status(file, tree, lock, RemoteState::NotAtHead);
                    assert_eq!(classify(&s), DisplayCategory::NotAtHead, "{:?}", s);
                }
            }
        }
    }

    #[test]
    fn test_locked_other_beats_other_branch() {
        let s = status(
            FileState::Modified,
            TreeState::Working,
            LockState::LockedOther,
            RemoteState::NotLatest,
        );
        assert_eq!(classify(&s), DisplayCategory::LockedByOther);
    }

    #[test]
    fn test_other_branch_beats_added() {
        let s = status(
            FileState::Added,
            TreeState::Staged,
            LockState::Locked,
            RemoteState::NotLatest,
        );
        assert_eq!(classify(&s), DisplayCategory::ModifiedOnOtherBranch);
    }

    #[test]
    fn test_untracked_and_locked_is_added() {
        let s = status(
            FileState::Unknown,
            TreeState::Untracked,
            LockState::Locked,
            RemoteState::Unset,
        );
        assert_eq!(classify(&s), DisplayCategory::Added);
    }

    #[test]
    fn test_file_axis_mirrors_category() {
        let base = |file| status(file, TreeState::Working, LockState::Locked, RemoteState::UpToDate);
        assert_eq!(classify(&base(FileState::Unmerged)), DisplayCategory::Unmerged);
        assert_eq!(classify(&base(FileState::Deleted)), DisplayCategory::Deleted);
        assert_eq!(classify(&base(FileState::Modified)), DisplayCategory::Modified);
    }

    #[test]
    fn test_untracked_before_checked_out() {
        let untracked = status(
            FileState::Unknown,
            TreeState::Untracked,
            LockState::NotLocked,
            RemoteState::UpToDate,
        );
        assert_eq!(classify(&untracked), DisplayCategory::Untracked);

        let locked = status(
            FileState::Unknown,
            TreeState::Unmodified,
            LockState::Locked,
            RemoteState::UpToDate,
        );
        assert_eq!(classify(&locked), DisplayCategory::CheckedOut);
    }

    #[test]
    fn test_tracked_lockable_vs_unmodified() {
        let lockable = status(
            FileState::Unknown,
            TreeState::Unmodified,
            LockState::NotLocked,
            RemoteState::UpToDate,
        );
        assert_eq!(classify(&lockable), DisplayCategory::Lockable);

        let plain = status(
            FileState::Unknown,
            TreeState::Unmodified,
            LockState::Unlockable,
            RemoteState::UpToDate,
        );
        assert_eq!(classify(&plain), DisplayCategory::Unmodified);
    }

    #[test]
    fn test_unknown_falls_through_to_none() {
        assert_eq!(classify(&FileStatus::unknown()), DisplayCategory::None);
        let ignored = status(
            FileState::Unknown,
            TreeState::Ignored,
            LockState::Unset,
            RemoteState::Unset,
        );
        assert_eq!(classify(&ignored), DisplayCategory::None);
    }

    #[test]
    fn test_display_name_includes_owner_and_branch() {
        let mut s = status(
            FileState::Unknown,
            TreeState::Unmodified,
            LockState::LockedOther,
            RemoteState::UpToDate,
        );
        s.lock_user = Some("bob".to_string());
        assert_eq!(display_name(&s), "Checked out by: bob");

        s.lock = LockState::NotLocked;
        s.remote = RemoteState::NotLatest;
        s.head_branch = Some("release".to_string());
        assert_eq!(display_name(&s), "Modified in branch: release");
    }
}

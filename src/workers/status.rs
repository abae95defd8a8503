//! Status translation plus the Fetch and UpdateStatus workers.
//!
//! [`run_update_status`] is shared by most workers: it turns one repository
//! status snapshot from the service into per-file deltas for a set of files.

use crate::core::backend::{LfsLock, RepoStatus};
use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::operation::OperationKind;
use crate::core::paths::{absolute_from_root, is_under, relative_to_root};
use crate::core::state::{FileState, FileStatus, LockState, RemoteState, Revision, TreeState};
use crate::workers::report_error;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Resolve `files` to concrete repository files, fetch status and record a
/// delta per file. With `fetch_remote` the service is asked for a fresh
/// snapshot and our lock cache is rebuilt from it.
pub fn run_update_status(
    ctx: &WorkerContext,
    command: &mut Command,
    files: &[PathBuf],
    fetch_remote: bool,
) -> bool {
    let targets = expand_targets(ctx, command, files);
    if targets.is_empty() {
        return true;
    }

    let status = match ctx.backend.get_status(fetch_remote) {
        Ok(status) => status,
        Err(e) => {
            report_error(command, "update status", &e);
            return false;
        }
    };

    if fetch_remote {
        let ours = status
            .locks_ours
            .iter()
            .map(|lock| {
                let owner = lock
                    .owner_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| ctx.lock_user());
                (absolute_from_root(&ctx.root, &lock.path), owner)
            })
            .collect();
        ctx.locked_files.replace_all(ours);
    }

    let index = StatusIndex::new(&ctx.root, &status);
    let locked_by_us = ctx.locked_files.snapshot();
    let lock_user = ctx.lock_user();

    for file in targets {
        if command.is_cancelled() {
            log::debug!("Status update cancelled");
            break;
        }

        let mut delta = index.tree_delta(&file, file.exists());

        if ctx.is_lockable(&file) {
            if let Some(owner) = index.theirs.get(&file) {
                delta.lock = LockState::LockedOther;
                delta.lock_user = Some(owner.clone());
            } else if let Some(owner) = index.ours.get(&file).or(locked_by_us.get(&file)) {
                delta.lock = LockState::Locked;
                delta.lock_user = Some(if owner.is_empty() {
                    lock_user.clone()
                } else {
                    owner.clone()
                });
            } else {
                delta.lock = LockState::NotLocked;
            }
        } else {
            delta.lock = LockState::Unlockable;
        }

        if index.upstream.contains(&file) {
            delta.remote = RemoteState::NotAtHead;
            delta.head_branch = Some(status.remote_branch.clone());
        } else {
            delta.remote = RemoteState::UpToDate;
        }

        command.add_delta(file, delta);
    }

    true
}

/// Keep files under the repository root, expanding directories
fn expand_targets(ctx: &WorkerContext, command: &mut Command, files: &[PathBuf]) -> Vec<PathBuf> {
    let mut targets = Vec::new();

    for file in files {
        if !is_under(file, &ctx.root) {
            log::debug!("'{}' is outside repository", file.display());
            continue;
        }
        if file.is_dir() {
            match ctx.local.list_files(file) {
                Ok(listed) => targets.extend(listed),
                Err(e) => report_error(command, "list files", &e),
            }
        } else {
            targets.push(file.clone());
        }
    }

    targets.sort();
    targets.dedup();
    targets
}

/// A status snapshot keyed by absolute path
struct StatusIndex {
    modified: HashSet<PathBuf>,
    untracked: HashSet<PathBuf>,
    conflicts: HashSet<PathBuf>,
    upstream: HashSet<PathBuf>,
    ours: HashMap<PathBuf, String>,
    theirs: HashMap<PathBuf, String>,
}

impl StatusIndex {
    fn new(root: &Path, status: &RepoStatus) -> Self {
        let abs = |p: &String| absolute_from_root(root, p);
        let locks = |locks: &[LfsLock]| {
            locks
                .iter()
                .map(|l| {
                    (
                        absolute_from_root(root, &l.path),
                        l.owner_name().unwrap_or_default().to_string(),
                    )
                })
                .collect::<HashMap<_, _>>()
        };

        let ours = locks(&status.locks_ours);
        let mut theirs = locks(&status.locks_theirs);
        // Our own locks are never reported as someone else's
        theirs.retain(|path, _| !ours.contains_key(path));

        Self {
            modified: status.modified_files.iter().map(|f| abs(&f.path)).collect(),
            untracked: status.untracked_files.iter().map(|f| abs(&f.path)).collect(),
            conflicts: status.conflicts.iter().map(abs).collect(),
            upstream: status.modified_upstream.iter().map(abs).collect(),
            ours,
            theirs,
        }
    }

    fn tree_delta(&self, file: &Path, exists: bool) -> FileStatus {
        let mut delta = FileStatus::default();

        if self.conflicts.contains(file) {
            delta.file = FileState::Unmerged;
            delta.tree = TreeState::Working;
            return delta;
        }

        let found = if self.modified.contains(file) {
            delta.tree = TreeState::Working;
            delta.file = FileState::Modified;
            true
        } else if self.untracked.contains(file) {
            delta.tree = TreeState::Untracked;
            delta.file = FileState::Unknown;
            true
        } else {
            false
        };

        if found {
            if !exists {
                delta.file = FileState::Deleted;
            }
        } else {
            delta.file = FileState::Unknown;
            delta.tree = if exists {
                TreeState::Unmodified
            } else {
                TreeState::NotInRepo
            };
        }

        delta
    }
}

pub fn execute_fetch(ctx: &WorkerContext, command: &mut Command) -> bool {
    let update_status = matches!(
        command.operation.kind,
        OperationKind::Fetch {
            update_status: true
        }
    );

    if !update_status {
        return match ctx.backend.get_status(true) {
            Ok(_) => true,
            Err(e) => {
                report_error(command, "fetch", &e);
                false
            }
        };
    }

    let roots = ctx.content_roots.clone();
    run_update_status(ctx, command, &roots, true)
}

pub fn execute_update_status(ctx: &WorkerContext, command: &mut Command) -> bool {
    let update_history = matches!(
        command.operation.kind,
        OperationKind::UpdateStatus {
            update_history: true
        }
    );

    let files = if command.files().is_empty() {
        ctx.content_roots.clone()
    } else {
        command.files().to_vec()
    };

    let mut success = run_update_status(ctx, command, &files, false);

    if success && update_history && !command.files().is_empty() {
        let mut updated: Vec<PathBuf> = command.output.states.keys().cloned().collect();
        updated.sort();
        for file in updated {
            if command.is_cancelled() {
                break;
            }
            let Some(relative) = relative_to_root(&file, &ctx.root) else {
                continue;
            };
            match ctx.backend.file_history(&relative) {
                Ok(revisions) => {
                    let history = revisions
                        .into_iter()
                        .map(|r| Revision {
                            filename: file.clone(),
                            short_commit_id: if r.short_commit_id.is_empty() {
                                r.commit_id.chars().take(7).collect()
                            } else {
                                r.short_commit_id
                            },
                            commit_id: r.commit_id,
                            revision_number: r.revision_number,
                            user: r.user_name,
                            date: r.date,
                            action: r.action,
                            description: r.description,
                            file_size: r.file_size,
                        })
                        .collect();
                    command.output.histories.insert(file, history);
                }
                Err(e) => {
                    report_error(command, &format!("get history of {}", relative), &e);
                    success = false;
                }
            }
        }
    }

    match ctx.local.head_commit() {
        Ok(commit) => command.output.commit = commit,
        Err(e) => log::debug!("Could not read HEAD commit: {}", e),
    }

    success
}

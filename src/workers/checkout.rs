//! Lock-class workers: CheckOut and MarkForAdd.
//!
//! Locks are optimistic. Every lockable file the service does not list as a
//! failure is marked `Locked` by us right away, without waiting for a status
//! refresh to confirm it.

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::paths::{matches_reported, relative_to_root};
use crate::core::state::{FileState, FileStatus, LockState, TreeState};
use crate::workers::report_error;
use std::path::PathBuf;

/// Lock the lockable subset of `files`.
///
/// Files the service reports as failed keep their prior state and get one
/// error message each. Returns false on a transport error or when any file
/// failed.
pub(crate) fn lock_files(ctx: &WorkerContext, command: &mut Command, files: &[PathBuf]) -> bool {
    let lockable: Vec<(PathBuf, String)> = files
        .iter()
        .filter(|f| ctx.is_lockable(f))
        .filter_map(|f| relative_to_root(f, &ctx.root).map(|rel| (f.clone(), rel)))
        .collect();

    if lockable.is_empty() {
        log::debug!("No lockable files among {} file(s)", files.len());
        return true;
    }

    let relative: Vec<String> = lockable.iter().map(|(_, rel)| rel.clone()).collect();
    let batch = match ctx.backend.lock(&relative) {
        Ok(batch) => batch,
        Err(e) => {
            report_error(command, "lock files", &e);
            return false;
        }
    };

    let user = ctx.lock_user();
    let mut success = true;

    for (file, rel) in lockable {
        let failure = batch
            .failures
            .iter()
            .find(|f| matches_reported(&file, &ctx.root, &f.path));

        match failure {
            Some(failure) => {
                command.add_error(format!(
                    "Failed to lock asset {}: {}",
                    rel, failure.reason
                ));
                success = false;
            }
            None => {
                ctx.locked_files.add(file.clone(), user.clone());
                command.add_delta(
                    file,
                    FileStatus::with_lock(LockState::Locked, Some(user.clone())),
                );
            }
        }
    }

    success
}

pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let files = command.files().to_vec();
    lock_files(ctx, command, &files)
}

/// Lock new lockable files and mark add-eligible files as `Added`
pub fn execute_mark_for_add(ctx: &WorkerContext, command: &mut Command) -> bool {
    let files = command.files().to_vec();
    if files.is_empty() {
        return true;
    }

    let success = lock_files(ctx, command, &files);

    for file in files {
        let prior = command.prior_state(&file);
        if !prior.is_unknown() && !prior.can_add() {
            log::debug!("{} cannot be added", file.display());
            continue;
        }

        if ctx.is_lockable(&file) && !ctx.locked_files.contains(&file) {
            continue;
        }

        command.add_delta(file, FileStatus::with_file(FileState::Added, TreeState::Unset));
    }

    success
}

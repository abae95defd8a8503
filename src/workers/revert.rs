//! The Revert worker.
//!
//! Target files are split by what they need:
//! - missing and tracked: reverted through the service
//! - existing and newly added (or modified): unstaged from the index
//! - existing and previously tracked: restored in the working copy, retried
//!   while another process still holds the file
//!
//! Locks held on the targets are released afterwards. Unlock failures are
//! logged and never fail the command.

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::paths::{matches_reported, relative_all};
use crate::core::state::{FileStatus, LockState};
use crate::workers::report_error;
use crate::workers::status::run_update_status;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

pub(crate) const RESTORE_ATTEMPTS: u32 = 10;
pub(crate) const RESTORE_BACKOFF: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
struct RevertPlan {
    missing: Vec<PathBuf>,
    all_existing: Vec<PathBuf>,
    other_than_added: Vec<PathBuf>,
    /// Missing files we only hold a lock on
    untracked_missing_locked: Vec<PathBuf>,
}

impl RevertPlan {
    fn build(ctx: &WorkerContext, command: &Command, files: &[PathBuf]) -> Self {
        let mut plan = Self::default();

        for file in files {
            let state = command.prior_state(file);
            let lockable = ctx.is_lockable(file);

            if file.exists() {
                if state.is_added() {
                    plan.all_existing.push(file.clone());
                } else if state.is_modified() {
                    plan.other_than_added.push(file.clone());
                    plan.all_existing.push(file.clone());
                } else if state.can_revert(lockable) {
                    plan.other_than_added.push(file.clone());
                }
            } else if state.can_revert(lockable) && !state.is_modified() {
                plan.untracked_missing_locked.push(file.clone());
            } else if state.is_source_controlled() && !state.is_deleted() {
                plan.missing.push(file.clone());
            } else if state.is_deleted() {
                plan.other_than_added.push(file.clone());
            }
        }

        plan
    }

    fn touched(&self) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = self
            .missing
            .iter()
            .chain(&self.all_existing)
            .chain(&self.other_than_added)
            .chain(&self.untracked_missing_locked)
            .cloned()
            .collect();
        files.sort();
        files.dedup();
        files
    }
}

pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let revert_all = command.files().is_empty();
    let files: Vec<PathBuf> = if revert_all {
        let mut all: Vec<PathBuf> = command.prior_states.keys().cloned().collect();
        all.sort();
        all
    } else {
        command.files().to_vec()
    };

    let plan = RevertPlan::build(ctx, command, &files);
    log::debug!("Revert plan: {:?}", plan);

    let success = if revert_all {
        match ctx.local.reset_all() {
            Ok(()) => true,
            Err(e) => {
                report_error(command, "revert all files", &e);
                false
            }
        }
    } else {
        revert_files(ctx, command, &plan)
    };

    let targets = if revert_all { plan.touched() } else { files };
    let unlocked = release_locks(ctx, command, &targets);

    run_update_status(ctx, command, &targets, false);

    for file in unlocked {
        command.add_delta(file, FileStatus::with_lock(LockState::NotLocked, None));
    }

    success
}

fn revert_files(ctx: &WorkerContext, command: &mut Command, plan: &RevertPlan) -> bool {
    let mut success = true;

    if !plan.missing.is_empty() {
        let relative = relative_all(&plan.missing, &ctx.root);
        if let Err(e) = ctx.backend.revert(&relative) {
            report_error(command, "revert missing files", &e);
            success = false;
        }
    }

    if !plan.all_existing.is_empty() {
        if let Err(e) = ctx.local.reset_index(&plan.all_existing) {
            report_error(command, "reset files", &e);
            success = false;
        }
    }

    if !plan.other_than_added.is_empty() && !restore_with_retry(ctx, command, &plan.other_than_added)
    {
        success = false;
    }

    success
}

/// The host may still hold files from a just-completed operation, so the
/// restore is retried a bounded number of times.
fn restore_with_retry(ctx: &WorkerContext, command: &mut Command, files: &[PathBuf]) -> bool {
    let mut attempt = 1;
    loop {
        match ctx.local.restore_working_copy(files) {
            Ok(()) => return true,
            Err(e) if attempt < RESTORE_ATTEMPTS && !command.is_cancelled() => {
                log::debug!(
                    "Restore attempt {}/{} failed: {}",
                    attempt,
                    RESTORE_ATTEMPTS,
                    e
                );
                attempt += 1;
                thread::sleep(RESTORE_BACKOFF);
            }
            Err(e) => {
                report_error(command, "restore files", &e);
                return false;
            }
        }
    }
}

/// Unlock the targets we hold locks on. Returns the files actually unlocked.
fn release_locks(ctx: &WorkerContext, command: &Command, files: &[PathBuf]) -> Vec<PathBuf> {
    let locked: Vec<PathBuf> = files
        .iter()
        .filter(|f| {
            ctx.locked_files.contains(f) || command.prior_state(f).lock == LockState::Locked
        })
        .cloned()
        .collect();

    if locked.is_empty() {
        return Vec::new();
    }

    let relative = relative_all(&locked, &ctx.root);
    let batch = match ctx.backend.unlock(&relative) {
        Ok(batch) => batch,
        Err(e) => {
            log::warn!("Failed to unlock {} file(s): {}", locked.len(), e);
            return Vec::new();
        }
    };

    let mut unlocked = Vec::new();
    for file in locked {
        match batch
            .failures
            .iter()
            .find(|f| matches_reported(&file, &ctx.root, &f.path))
        {
            Some(failure) => {
                log::warn!("Failed to unlock {}: {}", file.display(), failure.reason)
            }
            None => {
                ctx.locked_files.remove(&file);
                unlocked.push(file);
            }
        }
    }
    unlocked
}

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::state::{FileState, FileStatus, TreeState};
use crate::workers::checkout::lock_files;
use crate::workers::status::run_update_status;

/// Lock the files, then delete them from disk.
///
/// A file the OS refuses to delete is a hard failure and gets no delta.
pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let files = command.files().to_vec();
    if files.is_empty() {
        return true;
    }

    if !lock_files(ctx, command, &files) {
        return false;
    }

    let mut success = true;
    let mut deleted = Vec::new();

    for file in files {
        match std::fs::remove_file(&file) {
            Ok(()) => {
                log::debug!("Deleted {}", file.display());
                command.add_delta(
                    file.clone(),
                    FileStatus::with_file(FileState::Deleted, TreeState::Unset),
                );
                deleted.push(file);
            }
            Err(e) => {
                command.add_error(format!("Failed to delete {}: {}", file.display(), e));
                success = false;
            }
        }
    }

    if !deleted.is_empty() {
        success &= run_update_status(ctx, command, &deleted, false);
    }

    success
}

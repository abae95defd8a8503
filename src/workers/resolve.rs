use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::workers::report_error;
use crate::workers::status::run_update_status;

/// Mark conflicted files as resolved and refresh their status
pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let files = command.files().to_vec();

    let resolved = match ctx.local.mark_resolved(&files) {
        Ok(()) => true,
        Err(e) => {
            report_error(command, "resolve", &e);
            false
        }
    };

    run_update_status(ctx, command, &files, false);
    resolved
}

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::operation::OperationKind;
use crate::core::paths::relative_all;
use crate::workers::report_error;
use crate::workers::status::run_update_status;

pub(crate) const COMMIT_SUCCESSFUL: &str = "Commit successful!";

/// Submit the files. Deleted files leave the cache once the submit lands.
pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let message = match &command.operation.kind {
        OperationKind::CheckIn { message } => message.clone(),
        _ => String::new(),
    };
    let files = command.files().to_vec();
    let relative = relative_all(&files, &ctx.root);

    // Not retried: a submit that failed ambiguously may still have landed
    if let Err(e) = ctx.backend.submit(&message, &relative) {
        report_error(command, "submit", &e);
        return false;
    }

    for file in &files {
        if command.prior_state(file).is_deleted() {
            command.output.removals.push(file.clone());
        }
    }

    command.add_info(COMMIT_SUCCESSFUL);

    match ctx.local.head_commit() {
        Ok(commit) => command.output.commit = commit,
        Err(e) => log::debug!("Could not read HEAD commit: {}", e),
    }

    let remaining: Vec<_> = files
        .into_iter()
        .filter(|f| !command.output.removals.contains(f))
        .collect();
    run_update_status(ctx, command, &remaining, false);

    true
}

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::operation::OperationKind;
use crate::workers::checkout::lock_files;

/// The copy itself is done by the host. We only lock the destination.
pub fn execute(ctx: &WorkerContext, command: &mut Command) -> bool {
    let OperationKind::Copy { destination } = &command.operation.kind else {
        return false;
    };
    let destination = destination.clone();

    lock_files(ctx, command, &[destination])
}

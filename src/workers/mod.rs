//! One worker per operation kind.
//!
//! [`Worker`] is the fixed registration table: each [`OperationKind`] maps to
//! exactly one variant, and [`Worker::execute`] dispatches to the routine in
//! the matching module. Workers never return errors. They record messages
//! and deltas on the command and return whether the operation succeeded.

pub mod check_in;
pub mod checkout;
pub mod connect;
pub mod copy;
pub mod delete;
pub mod resolve;
pub mod revert;
pub mod status;

use crate::core::command::Command;
use crate::core::context::WorkerContext;
use crate::core::error::VcsBridgeError;
use crate::core::operation::OperationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Worker {
    Connect,
    CheckOut,
    MarkForAdd,
    Delete,
    CheckIn,
    Revert,
    Resolve,
    Copy,
    Fetch,
    UpdateStatus,
}

impl Worker {
    pub fn for_operation(kind: &OperationKind) -> Self {
        match kind {
            OperationKind::Connect => Worker::Connect,
            OperationKind::CheckOut => Worker::CheckOut,
            OperationKind::MarkForAdd => Worker::MarkForAdd,
            OperationKind::Delete => Worker::Delete,
            OperationKind::CheckIn { .. } => Worker::CheckIn,
            OperationKind::Revert => Worker::Revert,
            OperationKind::Resolve => Worker::Resolve,
            OperationKind::Copy { .. } => Worker::Copy,
            OperationKind::Fetch { .. } => Worker::Fetch,
            OperationKind::UpdateStatus { .. } => Worker::UpdateStatus,
        }
    }

    pub fn execute(&self, ctx: &WorkerContext, command: &mut Command) -> bool {
        match self {
            Worker::Connect => connect::execute(ctx, command),
            Worker::CheckOut => checkout::execute(ctx, command),
            Worker::MarkForAdd => checkout::execute_mark_for_add(ctx, command),
            Worker::Delete => delete::execute(ctx, command),
            Worker::CheckIn => check_in::execute(ctx, command),
            Worker::Revert => revert::execute(ctx, command),
            Worker::Resolve => resolve::execute(ctx, command),
            Worker::Copy => copy::execute(ctx, command),
            Worker::Fetch => status::execute_fetch(ctx, command),
            Worker::UpdateStatus => status::execute_update_status(ctx, command),
        }
    }
}

pub(crate) const SERVICE_UNAVAILABLE: &str =
    "Revision control service unavailable. Please make sure it's running and try again.";

/// Record a collaborator failure on the command. Transport failures get one
/// generic message; everything else keeps its detail.
pub(crate) fn report_error(command: &mut Command, action: &str, err: &VcsBridgeError) {
    log::warn!("{} failed: {}", action, err);
    if err.is_transport() {
        command.add_error(SERVICE_UNAVAILABLE);
    } else {
        command.add_error(format!("Failed to {}: {}", action, err));
    }
}

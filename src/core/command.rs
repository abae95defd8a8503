//! A queued unit of work and the results it carries back.
//!
//! A [`Command`] is built on the owning thread, moved to a pool thread for
//! execution, and moved back through the completion channel. Its output is
//! only read by the dispatcher's drain step.
//!
//! # Public API
//! - [`Command`], [`CommandOutput`]: the work item and its mutable results
//! - [`CommandId`], [`Concurrency`], [`CommandState`], [`CommandResult`]
//! - [`CommandReport`], [`CommandCallback`]: what completion callbacks receive

use crate::core::local::CommitInfo;
use crate::core::operation::Operation;
use crate::core::state::{FileStatus, Revision};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandId(pub u64);

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Concurrency {
    /// Block the caller until the command has been drained
    Synchronous,
    Asynchronous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandState {
    Queued = 0,
    Running = 1,
    Completed = 2,
    Cancelled = 3,
}

impl CommandState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => CommandState::Running,
            2 => CommandState::Completed,
            3 => CommandState::Cancelled,
            _ => CommandState::Queued,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandResult {
    Succeeded,
    Failed,
    Cancelled,
}

/// Lifecycle flags shared between the queue entry and the executing command
#[derive(Debug, Default)]
pub struct CommandFlags {
    state: AtomicU8,
    cancel_requested: AtomicBool,
}

impl CommandFlags {
    pub fn state(&self) -> CommandState {
        CommandState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: CommandState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Request cancellation. Returns false once execution has completed.
    pub fn cancel(&self) -> bool {
        if self.state() == CommandState::Completed {
            return false;
        }
        self.cancel_requested.store(true, Ordering::Release);
        true
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_requested.load(Ordering::Acquire)
    }
}

/// Everything a worker produces
#[derive(Debug, Default)]
pub struct CommandOutput {
    pub success: bool,
    pub info_messages: Vec<String>,
    pub error_messages: Vec<String>,
    /// Per-file deltas to merge into the State Cache
    pub states: HashMap<PathBuf, FileStatus>,
    /// Files to drop from the State Cache after the merge
    pub removals: Vec<PathBuf>,
    pub histories: HashMap<PathBuf, Vec<Revision>>,
    pub commit: Option<CommitInfo>,
}

pub struct Command {
    pub id: CommandId,
    pub operation: Operation,
    pub concurrency: Concurrency,
    /// Cached status of the targeted files when the command was submitted
    pub prior_states: HashMap<PathBuf, FileStatus>,
    pub flags: Arc<CommandFlags>,
    pub output: CommandOutput,
}

impl Command {
    pub fn new(
        id: CommandId,
        operation: Operation,
        concurrency: Concurrency,
        prior_states: HashMap<PathBuf, FileStatus>,
    ) -> Self {
        Self {
            id,
            operation,
            concurrency,
            prior_states,
            flags: Arc::new(CommandFlags::default()),
            output: CommandOutput::default(),
        }
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.operation.files
    }

    /// Checked by workers between remote calls
    pub fn is_cancelled(&self) -> bool {
        self.flags.is_cancelled()
    }

    pub fn prior_state(&self, path: &PathBuf) -> FileStatus {
        self.prior_states
            .get(path)
            .cloned()
            .unwrap_or_else(FileStatus::unknown)
    }

    /// Record a delta. Several deltas for one file combine axis by axis.
    pub fn add_delta(&mut self, path: PathBuf, delta: FileStatus) {
        self.output
            .states
            .entry(path)
            .or_default()
            .overlay(&delta);
    }

    pub fn add_info(&mut self, message: impl Into<String>) {
        self.output.info_messages.push(message.into());
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.output.error_messages.push(message.into());
    }

    pub fn report(&self, result: CommandResult) -> CommandReport {
        CommandReport {
            id: self.id,
            operation: self.operation.clone(),
            result,
            info_messages: self.output.info_messages.clone(),
            error_messages: self.output.error_messages.clone(),
        }
    }
}

/// Handed to completion callbacks on the owning thread
#[derive(Debug, Clone)]
pub struct CommandReport {
    pub id: CommandId,
    pub operation: Operation,
    pub result: CommandResult,
    pub info_messages: Vec<String>,
    pub error_messages: Vec<String>,
}

impl CommandReport {
    pub fn succeeded(&self) -> bool {
        self.result == CommandResult::Succeeded
    }
}

pub type CommandCallback = Box<dyn FnOnce(&CommandReport)>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::state::{FileState, LockState, TreeState};

    fn command() -> Command {
        Command::new(
            CommandId(1),
            Operation::check_out(vec![PathBuf::from("/repo/A.uasset")]),
            Concurrency::Asynchronous,
            HashMap::new(),
        )
    }

    #[test]
    fn test_deltas_combine_per_axis() {
        let mut cmd = command();
        let path = PathBuf::from("/repo/A.uasset");
        cmd.add_delta(path.clone(), FileStatus::with_file(FileState::Deleted, TreeState::Unset));
        cmd.add_delta(
            path.clone(),
            FileStatus::with_lock(LockState::Locked, Some("me".to_string())),
        );

        let delta = &cmd.output.states[&path];
        assert_eq!(delta.file, FileState::Deleted);
        assert_eq!(delta.tree, TreeState::Unset);
        assert_eq!(delta.lock, LockState::Locked);
    }

    #[test]
    fn test_cancel_after_completion_is_refused() {
        let cmd = command();
        assert_eq!(cmd.flags.state(), CommandState::Queued);
        assert!(cmd.flags.cancel());
        assert!(cmd.is_cancelled());

        let other = command();
        other.flags.set_state(CommandState::Completed);
        assert!(!other.flags.cancel());
        assert!(!other.is_cancelled());
    }

    #[test]
    fn test_unknown_prior_state_defaults() {
        let cmd = command();
        assert!(cmd.prior_state(&PathBuf::from("/repo/A.uasset")).is_unknown());
    }
}

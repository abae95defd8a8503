//! Core of the revision-control bridge.
//!
//! This module holds the state model, the command queue and its dispatcher,
//! the collaborators the workers talk to, and the host-facing provider.

pub mod backend;
pub mod classify;
pub mod colors;
pub mod command;
pub mod config;
pub mod context;
pub mod dirs;
pub mod dispatcher;
pub mod error;
pub mod local;
pub mod lockable;
pub mod locked_files;
pub mod operation;
pub mod output;
pub mod paths;
pub mod poller;
pub mod provider;
pub mod state;
pub mod state_cache;

// === Error handling ===
pub use error::{Result, VcsBridgeError};

// === State model ===
// Four independent axes per file, merged with "Unset means don't touch"
pub use state::{
    CachedState, FileState, FileStatus, LockState, MergeOutcome, RemoteState, Revision, TreeState,
};
pub use state_cache::StateCache;

// === Classification ===
pub use classify::{classify, display_name, DisplayCategory};

// === Commands and dispatch ===
pub use command::{
    Command, CommandCallback, CommandId, CommandReport, CommandResult, CommandState, Concurrency,
};
pub use dispatcher::Dispatcher;
pub use operation::{Operation, OperationKind};

// === Collaborators ===
pub use backend::{Backend, HttpBackend, LockBatch, LockFailure, RepoStatus};
pub use context::WorkerContext;
pub use local::{CommitInfo, GitCli, LocalRepo};

// === Host facade ===
pub use config::ProviderConfig;
pub use provider::{CacheUsage, Provider, StatusSummary, Submission};

// === Output formatting ===
pub use output::{print_error, print_info, print_report, print_section_header, print_success};

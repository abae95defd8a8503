//! vcs-bridge - a revision-control integration layer for editor hosts.
//!
//! Operations run on background threads while the host's own thread drains
//! their results one at a time and merges them into a per-file state cache.
//!
//! # Public API
//! The main interface is re-exported from the [`core`] module:
//! - [`Provider`]: the host-facing facade
//! - [`Operation`], [`Concurrency`], [`CommandReport`]: submitting work
//! - [`FileStatus`], [`DisplayCategory`], [`classify`]: reading state
//! - [`Backend`], [`LocalRepo`]: collaborator seams
//! - [`VcsBridgeError`], [`Result`]

pub mod commands;
pub mod core;
pub mod workers;

pub use core::{
    classify,
    display_name,
    // Collaborators
    Backend,
    CacheUsage,
    CachedState,
    CommandId,
    CommandReport,
    CommandResult,
    Concurrency,
    DisplayCategory,
    // State model
    FileState,
    FileStatus,
    GitCli,
    HttpBackend,
    LocalRepo,
    LockState,
    // Dispatch
    Operation,
    OperationKind,
    // Host facade
    Provider,
    ProviderConfig,
    RemoteState,
    Result,
    Revision,
    Submission,
    TreeState,
    // Error handling
    VcsBridgeError,
};

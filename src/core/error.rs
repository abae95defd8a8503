//! Domain-specific error types and error handling utilities.
//!
//! This module defines [`VcsBridgeError`], the error type returned by every
//! collaborator call (remote service, local git, configuration). Workers never
//! propagate these upwards: they turn them into per-command messages.
//!
//! # Public API
//! - [`VcsBridgeError`]: Main error enum covering all failure modes
//! - [`Result<T>`]: Type alias for `std::result::Result<T, VcsBridgeError>`
//!
//! # Error Categories
//! - **Repository**: not inside a repository, git2 library errors, CLI failures
//! - **Remote service**: transport failures, HTTP status failures, bad payloads
//! - **Provider**: disabled provider, failed commands
//! - **Configuration**: read and parse failures of the settings file

use std::path::PathBuf;
use thiserror::Error;

/// Domain-specific error types for vcs-bridge
#[derive(Error, Debug)]
pub enum VcsBridgeError {
    // Repository errors
    #[error("Not in a git repository")]
    NotInGitRepo,

    #[error("Git repository error: {0}")]
    GitRepo(#[from] git2::Error),

    #[error("git {command} failed: {stderr}")]
    CliFailed { command: String, stderr: String },

    // File operation errors
    #[error("File does not exist: {path}")]
    FileNotFound { path: PathBuf },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Remote service errors
    #[error("Revision control service unavailable: {reason}")]
    ServiceUnavailable { reason: String },

    #[error("Request to '{endpoint}' failed with status {status}: {body}")]
    HttpStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Provider errors
    #[error("Revision control is disabled")]
    ProviderDisabled,

    #[error("{operation} failed")]
    CommandFailed { operation: String },

    // Configuration errors
    #[error("Could not find configuration directory")]
    ConfigDirectoryNotFound,

    #[error("Failed to read config file '{path}': {source}")]
    ConfigReadFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file '{path}': {source}")]
    ConfigParseFailed {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using VcsBridgeError
pub type Result<T> = std::result::Result<T, VcsBridgeError>;

impl VcsBridgeError {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a failed git CLI invocation error
    pub fn cli_failed(command: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self::CliFailed {
            command: command.into(),
            stderr: stderr.into(),
        }
    }

    /// Create a transport failure error
    pub fn service_unavailable(reason: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            reason: reason.into(),
        }
    }

    /// Create an HTTP status failure error
    pub fn http_status(endpoint: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            endpoint: endpoint.into(),
            status,
            body: body.into(),
        }
    }

    /// A command that ran but reported failure
    pub fn command_failed(operation: impl Into<String>) -> Self {
        Self::CommandFailed {
            operation: operation.into(),
        }
    }

    /// Create a config read failed error
    pub fn config_read_failed(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigReadFailed {
            path: path.into(),
            source,
        }
    }

    /// Create a config parse failed error
    pub fn config_parse_failed(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::ConfigParseFailed {
            path: path.into(),
            source,
        }
    }

    /// True for failures where the remote service could not be reached at all
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }
}

//! Operation requests issued by the host or by background polling.
//!
//! An [`Operation`] is an immutable description of intent: what to do and
//! to which files. An empty file list means "all known files" for the kinds
//! that support it.

use std::fmt;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationKind {
    Connect,
    /// Lock files for editing
    CheckOut,
    MarkForAdd,
    Delete,
    /// Submit with a commit message
    CheckIn { message: String },
    Revert,
    Resolve,
    /// Copy a file to `destination`; locks the destination
    Copy { destination: PathBuf },
    /// Poll the remote, optionally refreshing the status of all content
    Fetch { update_status: bool },
    UpdateStatus { update_history: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub kind: OperationKind,
    pub files: Vec<PathBuf>,
}

impl Operation {
    pub fn new(kind: OperationKind, files: Vec<PathBuf>) -> Self {
        Self { kind, files }
    }

    pub fn connect() -> Self {
        Self::new(OperationKind::Connect, Vec::new())
    }

    pub fn check_out(files: Vec<PathBuf>) -> Self {
        Self::new(OperationKind::CheckOut, files)
    }

    pub fn mark_for_add(files: Vec<PathBuf>) -> Self {
        Self::new(OperationKind::MarkForAdd, files)
    }

    pub fn delete(files: Vec<PathBuf>) -> Self {
        Self::new(OperationKind::Delete, files)
    }

    pub fn check_in(message: impl Into<String>, files: Vec<PathBuf>) -> Self {
        Self::new(
            OperationKind::CheckIn {
                message: message.into(),
            },
            files,
        )
    }

    pub fn revert(files: Vec<PathBuf>) -> Self {
        Self::new(OperationKind::Revert, files)
    }

    pub fn resolve(files: Vec<PathBuf>) -> Self {
        Self::new(OperationKind::Resolve, files)
    }

    pub fn copy(source: PathBuf, destination: PathBuf) -> Self {
        Self::new(OperationKind::Copy { destination }, vec![source])
    }

    pub fn fetch(update_status: bool) -> Self {
        Self::new(OperationKind::Fetch { update_status }, Vec::new())
    }

    pub fn update_status(files: Vec<PathBuf>, update_history: bool) -> Self {
        Self::new(OperationKind::UpdateStatus { update_history }, files)
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    /// Status refreshes count toward the consecutive-failure health check
    pub fn is_status_refresh(&self) -> bool {
        matches!(
            self.kind,
            OperationKind::Fetch { .. } | OperationKind::UpdateStatus { .. }
        )
    }
}

impl OperationKind {
    pub fn name(&self) -> &'static str {
        match self {
            OperationKind::Connect => "Connect",
            OperationKind::CheckOut => "CheckOut",
            OperationKind::MarkForAdd => "MarkForAdd",
            OperationKind::Delete => "Delete",
            OperationKind::CheckIn { .. } => "CheckIn",
            OperationKind::Revert => "Revert",
            OperationKind::Resolve => "Resolve",
            OperationKind::Copy { .. } => "Copy",
            OperationKind::Fetch { .. } => "Fetch",
            OperationKind::UpdateStatus { .. } => "UpdateStatus",
        }
    }

    pub fn in_progress_text(&self) -> &'static str {
        match self {
            OperationKind::Connect => "Connecting to revision control...",
            OperationKind::CheckOut => "Checking out file(s)...",
            OperationKind::MarkForAdd => "Marking file(s) for add...",
            OperationKind::Delete => "Deleting file(s)...",
            OperationKind::CheckIn { .. } => "Submitting file(s)...",
            OperationKind::Revert => "Reverting file(s)...",
            OperationKind::Resolve => "Resolving file(s)...",
            OperationKind::Copy { .. } => "Copying file(s)...",
            OperationKind::Fetch { .. } => "Fetching from remote origin...",
            OperationKind::UpdateStatus { .. } => "Updating file status...",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} file(s))", self.name(), self.files.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Operation::check_in("msg", vec![]).name(), "CheckIn");
        assert_eq!(Operation::fetch(true).name(), "Fetch");
        assert_eq!(
            Operation::copy("/a".into(), "/b".into()).to_string(),
            "Copy (1 file(s))"
        );
    }

    #[test]
    fn test_status_refresh_kinds() {
        assert!(Operation::fetch(false).is_status_refresh());
        assert!(Operation::update_status(vec![], true).is_status_refresh());
        assert!(!Operation::revert(vec![]).is_status_refresh());
    }
}

//! Path helpers for file identities.
//!
//! Cache keys are absolute, lexically normalized paths. The remote service
//! speaks repository-relative paths with forward slashes, so that users with
//! clones in different places produce the same lock paths.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and resolve `.` and `..` lexically.
/// The file does not need to exist.
pub fn normalize(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut out = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

pub fn is_under(path: &Path, root: &Path) -> bool {
    path.starts_with(root)
}

/// Repository-relative path with forward slashes, or `None` outside the root
pub fn relative_to_root(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}

pub fn relative_all(paths: &[PathBuf], root: &Path) -> Vec<String> {
    paths
        .iter()
        .filter_map(|p| relative_to_root(p, root))
        .collect()
}

/// Turn a path reported by the service back into a cache key
pub fn absolute_from_root(root: &Path, relative: &str) -> PathBuf {
    let trimmed = relative.trim_start_matches('/');
    normalize(&root.join(trimmed.replace('\\', "/")), root)
}

/// Whether `path` is the file the service reported as `reported`
pub fn matches_reported(path: &Path, root: &Path, reported: &str) -> bool {
    let reported = reported.replace('\\', "/");
    let reported = reported.trim_start_matches('/');
    match relative_to_root(path, root) {
        Some(relative) => relative == reported,
        None => false,
    }
}

/// File extension including the leading dot, e.g. `.uasset`
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy().to_lowercase()))
}

use crate::core::error::VcsBridgeError;
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "vcs-bridge";

pub fn get_config_directory() -> Result<PathBuf, VcsBridgeError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".config"))
                    .ok_or(VcsBridgeError::ConfigDirectoryNotFound)
            })?,
        "macos" => dirs::home_dir()
            .ok_or(VcsBridgeError::ConfigDirectoryNotFound)?
            .join("Library/Application Support"),
        _ => dirs::config_dir().ok_or(VcsBridgeError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR_NAME))
}

pub fn get_cache_directory() -> Result<PathBuf, VcsBridgeError> {
    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".cache"))
                    .ok_or(VcsBridgeError::ConfigDirectoryNotFound)
            })?,
        "macos" => dirs::home_dir()
            .ok_or(VcsBridgeError::ConfigDirectoryNotFound)?
            .join("Library/Caches"),
        _ => dirs::cache_dir().ok_or(VcsBridgeError::ConfigDirectoryNotFound)?,
    };

    Ok(base.join(APP_DIR_NAME))
}

/// Where revision dumps for diffing are written
pub fn get_diff_directory() -> Result<PathBuf, VcsBridgeError> {
    Ok(get_cache_directory()?.join("diffs"))
}

//! XDG Base Directory paths for loopers.
//!
//! The CLI uses XDG locations on every platform so the record cache and
//! exported reports sit in predictable places. Config files are located by
//! the CLI itself.

use std::path::PathBuf;

const APP: &str = "loopers";

/// `$<var>/loopers` when the variable is set, else `~/<fallback>/loopers`.
fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    match std::env::var_os(var) {
        Some(value) if !value.is_empty() => PathBuf::from(value).join(APP),
        _ => dirs::home_dir()
            .map(|home| home.join(fallback))
            .unwrap_or_else(|| PathBuf::from(fallback))
            .join(APP),
    }
}

/// Get the loopers cache directory.
///
/// Returns `$XDG_CACHE_HOME/loopers` if set, otherwise `~/.cache/loopers`.
/// Fetched record pools live here; deleting it only costs a re-import.
pub fn cache_dir() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

/// Get the loopers data directory.
///
/// Returns `$XDG_DATA_HOME/loopers` if set, otherwise `~/.local/share/loopers`.
/// Exported reports go here unless a path is given.
pub fn data_dir() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
}

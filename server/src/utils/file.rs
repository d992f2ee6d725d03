//! Path helpers

use std::path::{Path, PathBuf};

/// Expand a user-supplied path to an absolute path.
///
/// `~` and `~/...` resolve against the home directory, relative paths
/// against the current directory. Absolute paths pass through unchanged.
///
/// ```text
/// expand_path("~/.catalog")  // -> /home/user/.catalog
/// expand_path("./catalog.db") // -> /current/dir/./catalog.db
/// expand_path("/var/db")     // -> /var/db
/// ```
pub fn expand_path(path: &str) -> PathBuf {
    let path = path.trim();

    if path.is_empty() {
        return current_dir();
    }

    let expanded = match path.strip_prefix('~') {
        Some("") => dirs::home_dir().unwrap_or_else(|| PathBuf::from(path)),
        Some(rest) if rest.starts_with('/') || rest.starts_with('\\') => dirs::home_dir()
            .map(|home| home.join(&rest[1..]))
            .unwrap_or_else(|| PathBuf::from(path)),
        _ => PathBuf::from(path),
    };

    if expanded.is_relative() {
        current_dir().join(expanded)
    } else {
        expanded
    }
}

/// Make sure the parent directory of a file exists
pub async fn ensure_parent_dir(file: &Path) -> std::io::Result<()> {
    match file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

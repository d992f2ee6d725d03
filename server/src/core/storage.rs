//! Platform-aware data storage directory management
//!
//! ## Platform Paths
//!
//! | Type | Windows | macOS | Linux |
//! |------|---------|-------|-------|
//! | Data | `%APPDATA%\Catalog\` | `~/Library/Application Support/Catalog/` | `$XDG_DATA_HOME/catalog/` |

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;

use super::config::AppConfig;
use super::constants::{APP_DOT_FOLDER, APP_NAME, ENV_DATA_DIR, SQLITE_DB_FILENAME};
use crate::utils::file::{ensure_parent_dir, expand_path};

/// Application storage manager
#[derive(Debug, Clone)]
pub struct AppStorage {
    data_dir: PathBuf,
    database_path: PathBuf,
}

impl AppStorage {
    /// Initialize storage with platform-appropriate data directory
    pub async fn init(config: &AppConfig) -> Result<Self> {
        let data_dir = Self::resolve_data_dir();

        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        // Canonicalize requires the path to exist
        let data_dir = data_dir.canonicalize().unwrap_or(data_dir);

        let database_path = config
            .database
            .path
            .clone()
            .unwrap_or_else(|| data_dir.join(SQLITE_DB_FILENAME));

        ensure_parent_dir(&database_path).await.with_context(|| {
            format!(
                "Failed to create database directory: {}",
                database_path.display()
            )
        })?;

        tracing::debug!(
            data_dir = %data_dir.display(),
            database = %database_path.display(),
            "Storage initialized"
        );

        Ok(Self {
            data_dir,
            database_path,
        })
    }

    /// Resolve data directory from env var or platform default
    pub fn resolve_data_dir() -> PathBuf {
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            return expand_path(&dir);
        }

        if let Some(proj_dirs) = ProjectDirs::from("", "", APP_NAME) {
            return proj_dirs.data_dir().to_path_buf();
        }

        // Fallback to local .catalog
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        cwd.join(APP_DOT_FOLDER)
    }

    /// Get the data directory path
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// SQLite database file
    pub fn database_path(&self) -> &Path {
        &self.database_path
    }

    /// Create AppStorage for testing with a specific data directory
    #[cfg(test)]
    pub fn init_for_test(data_dir: PathBuf) -> Self {
        let database_path = data_dir.join(SQLITE_DB_FILENAME);
        Self {
            data_dir,
            database_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cli::CliConfig;

    #[test]
    fn test_resolve_data_dir_not_empty() {
        let path = AppStorage::resolve_data_dir();
        assert!(!path.as_os_str().is_empty());
    }

    #[test]
    fn test_database_path_in_data_dir() {
        let storage = AppStorage::init_for_test(PathBuf::from("/tmp/catalog-data"));
        assert_eq!(storage.data_dir(), Path::new("/tmp/catalog-data"));
        assert_eq!(
            storage.database_path(),
            Path::new("/tmp/catalog-data/catalog.db")
        );
    }

    #[tokio::test]
    async fn test_init_with_explicit_database_path() {
        let dir = tempfile::tempdir().unwrap();
        let db = dir.path().join("nested/products.db");
        let cli = CliConfig {
            database: Some(db.clone()),
            ..Default::default()
        };
        let config = AppConfig::load(&cli).unwrap();

        let storage = AppStorage::init(&config).await.unwrap();
        assert_eq!(storage.database_path(), db.as_path());
        assert!(dir.path().join("nested").is_dir());
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::filters::{FieldSpec, QueryCompiler, UnknownFieldPolicy, ValueType};
use crate::utils::file::expand_path;

use super::cli::CliConfig;
use super::constants::{
    APP_DOT_FOLDER, CONFIG_FILE_NAME, DEFAULT_CATALOG_TABLE, DEFAULT_DOCUMENT_COLUMN,
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SELECT_COLUMNS,
};

// =============================================================================
// File Config Structs (JSON deserialization)
// =============================================================================

/// Server configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Database configuration section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct DatabaseFileConfig {
    /// SQLite database file (defaults to the data directory)
    pub path: Option<String>,
}

/// Search behavior section
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchFileConfig {
    pub unknown_fields: Option<UnknownFieldPolicy>,
}

/// Catalog schema section: field registry and sortable whitelist
#[derive(Debug, Default, Clone, Deserialize)]
pub struct CatalogFileConfig {
    pub table: Option<String>,
    pub document_column: Option<String>,
    pub columns: Option<Vec<String>>,
    pub fields: Option<BTreeMap<String, FieldSpec>>,
    pub sortable: Option<BTreeMap<String, String>>,
}

/// Root config file structure
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    pub server: Option<ServerFileConfig>,
    pub database: Option<DatabaseFileConfig>,
    pub search: Option<SearchFileConfig>,
    pub catalog: Option<CatalogFileConfig>,
    #[serde(flatten)]
    pub extra: serde_json::Value,
}

impl FileConfig {
    /// Load configuration from a JSON file
    fn load_from_file(path: &Path) -> Result<Self> {
        tracing::debug!(path = %path.display(), "Loading config file");
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        tracing::trace!(config = ?config, "Parsed config file");
        Ok(config)
    }

    /// Warn about unknown fields in the config
    fn warn_unknown_fields(&self) {
        if let serde_json::Value::Object(map) = &self.extra
            && !map.is_empty()
        {
            let keys_str: String = map
                .keys()
                .map(|k| k.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            tracing::warn!(
                fields = %keys_str,
                "Unknown fields in config file (possible typos)"
            );
        }
    }

    /// Merge another FileConfig into this one (other takes precedence)
    fn merge(&mut self, other: FileConfig) {
        if let Some(server) = other.server {
            let current = self.server.get_or_insert_with(ServerFileConfig::default);
            if server.host.is_some() {
                tracing::trace!(host = ?server.host, "Merging server.host");
                current.host = server.host;
            }
            if server.port.is_some() {
                tracing::trace!(port = ?server.port, "Merging server.port");
                current.port = server.port;
            }
        }

        if let Some(database) = other.database {
            let current = self.database.get_or_insert_with(DatabaseFileConfig::default);
            if database.path.is_some() {
                tracing::trace!(path = ?database.path, "Merging database.path");
                current.path = database.path;
            }
        }

        if let Some(search) = other.search {
            let current = self.search.get_or_insert_with(SearchFileConfig::default);
            if search.unknown_fields.is_some() {
                tracing::trace!(policy = ?search.unknown_fields, "Merging search.unknown_fields");
                current.unknown_fields = search.unknown_fields;
            }
        }

        if let Some(catalog) = other.catalog {
            let current = self.catalog.get_or_insert_with(CatalogFileConfig::default);
            if catalog.table.is_some() {
                current.table = catalog.table;
            }
            if catalog.document_column.is_some() {
                current.document_column = catalog.document_column;
            }
            if catalog.columns.is_some() {
                current.columns = catalog.columns;
            }
            // Registry maps merge per entry
            if let Some(fields) = catalog.fields {
                tracing::trace!(count = fields.len(), "Merging catalog.fields");
                current.fields.get_or_insert_with(BTreeMap::new).extend(fields);
            }
            if let Some(sortable) = catalog.sortable {
                tracing::trace!(count = sortable.len(), "Merging catalog.sortable");
                current
                    .sortable
                    .get_or_insert_with(BTreeMap::new)
                    .extend(sortable);
            }
        }
    }
}

// =============================================================================
// Resolved Config Structs
// =============================================================================

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    /// Explicit database file; `None` means `<data dir>/catalog.db`
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SearchConfig {
    pub unknown_fields: UnknownFieldPolicy,
}

/// Catalog schema as seen by the filter compiler
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub table: String,
    pub document_column: String,
    pub columns: Vec<String>,
    pub fields: BTreeMap<String, FieldSpec>,
    pub sortable: BTreeMap<String, String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_CATALOG_TABLE.to_string(),
            document_column: DEFAULT_DOCUMENT_COLUMN.to_string(),
            columns: DEFAULT_SELECT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            fields: default_fields(),
            sortable: default_sortable(),
        }
    }
}

/// Built-in registry matching the `products` schema
fn default_fields() -> BTreeMap<String, FieldSpec> {
    [
        ("name", "name", ValueType::String),
        ("category", "category", ValueType::String),
        ("price", "price", ValueType::Number),
        ("ram", "ram_gb", ValueType::Number),
        ("storage", "storage_gb", ValueType::Number),
        ("gpu", "gpu", ValueType::String),
        ("cpu", "cpu", ValueType::String),
        ("brand", "brand", ValueType::String),
        ("screen_inches", "screen_in", ValueType::Number),
        ("battery_mAh", "battery_mah", ValueType::Number),
        ("in_stock", "in_stock", ValueType::Boolean),
    ]
    .into_iter()
    .map(|(name, column, value_type)| (name.to_string(), FieldSpec::column(column, value_type)))
    .collect()
}

fn default_sortable() -> BTreeMap<String, String> {
    [
        ("id", "id"),
        ("name", "name"),
        ("price", "price"),
        ("ram", "ram_gb"),
        ("screen_inches", "screen_in"),
    ]
    .into_iter()
    .map(|(name, column)| (name.to_string(), column.to_string()))
    .collect()
}

/// Application configuration (resolved from all sources)
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub search: SearchConfig,
    pub catalog: CatalogConfig,
}

impl AppConfig {
    /// Load configuration from all sources
    ///
    /// Priority (lowest to highest):
    /// 1. Defaults
    /// 2. Profile directory config (~/.catalog/catalog.json)
    /// 3. Local directory config OR CLI-specified config path
    /// 4. CLI arguments (which include env var fallbacks via clap)
    pub fn load(cli: &CliConfig) -> Result<Self> {
        tracing::debug!("Loading application configuration");
        tracing::trace!(cli = ?cli, "CLI config");

        let mut file_config = FileConfig::default();
        let mut found_configs: Vec<String> = Vec::new();

        if let Some(profile_path) = get_profile_config_path()
            && profile_path.exists()
        {
            let profile_config = FileConfig::load_from_file(&profile_path)?;
            profile_config.warn_unknown_fields();
            file_config.merge(profile_config);
            found_configs.push(profile_path.display().to_string());
        }

        let overlay_path = if let Some(ref path) = cli.config {
            let expanded = expand_path(&path.to_string_lossy());
            if !expanded.exists() {
                anyhow::bail!("Config file not found: {}", expanded.display());
            }
            Some(expanded)
        } else {
            let local = PathBuf::from(CONFIG_FILE_NAME);
            if local.exists() { Some(local) } else { None }
        };

        if let Some(path) = overlay_path {
            let overlay_config = FileConfig::load_from_file(&path)?;
            overlay_config.warn_unknown_fields();
            file_config.merge(overlay_config);
            found_configs.push(path.display().to_string());
        }

        tracing::debug!(configs = ?found_configs, "Config files loaded");

        let config = Self::from_sources(cli, file_config);
        config.validate()?;

        tracing::debug!(
            host = %config.server.host,
            port = config.server.port,
            unknown_fields = %config.search.unknown_fields,
            fields = config.catalog.fields.len(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Layer defaults -> file config -> CLI/env overrides
    fn from_sources(cli: &CliConfig, file_config: FileConfig) -> Self {
        let file_server = file_config.server.unwrap_or_default();
        let file_database = file_config.database.unwrap_or_default();
        let file_search = file_config.search.unwrap_or_default();
        let file_catalog = file_config.catalog.unwrap_or_default();

        let host = cli
            .host
            .clone()
            .or(file_server.host)
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = cli.port.or(file_server.port).unwrap_or(DEFAULT_PORT);

        let path = cli
            .database
            .as_ref()
            .map(|p| expand_path(&p.to_string_lossy()))
            .or_else(|| file_database.path.map(|p| expand_path(&p)));

        let unknown_fields = cli
            .unknown_fields
            .or(file_search.unknown_fields)
            .unwrap_or_default();

        let defaults = CatalogConfig::default();
        let mut fields = defaults.fields;
        if let Some(extra) = file_catalog.fields {
            fields.extend(extra);
        }
        let mut sortable = defaults.sortable;
        if let Some(extra) = file_catalog.sortable {
            sortable.extend(extra);
        }
        let catalog = CatalogConfig {
            table: file_catalog.table.unwrap_or(defaults.table),
            document_column: file_catalog
                .document_column
                .unwrap_or(defaults.document_column),
            columns: file_catalog.columns.unwrap_or(defaults.columns),
            fields,
            sortable,
        };

        Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig { path },
            search: SearchConfig { unknown_fields },
            catalog,
        }
    }

    /// Validate the configuration for consistency and correctness
    fn validate(&self) -> Result<()> {
        if self.server.host.is_empty() {
            anyhow::bail!("Configuration error: server.host must not be empty");
        }

        if self.server.port == 0 {
            anyhow::bail!("Configuration error: server.port must be greater than 0");
        }

        // Everything the compiler writes into SQL text must be a safe identifier
        QueryCompiler::from_config(&self.catalog, &self.search)
            .map_err(|e| anyhow::anyhow!("Configuration error: catalog: {}", e))?;

        if self.search.unknown_fields == UnknownFieldPolicy::Permissive {
            tracing::debug!(
                document_column = %self.catalog.document_column,
                "Unknown filter fields resolve to document attributes"
            );
        }

        Ok(())
    }
}

fn get_profile_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(APP_DOT_FOLDER).join(CONFIG_FILE_NAME))
}

/// Check if the host binds to all network interfaces
pub fn is_all_interfaces(host: &str) -> bool {
    host == "0.0.0.0" || host == "::" || host == "[::]"
}

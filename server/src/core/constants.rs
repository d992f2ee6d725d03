// =============================================================================
// Application Identity
// =============================================================================

/// Application name in title case (for display and platform directories)
pub const APP_NAME: &str = "Catalog";

/// Application name in lowercase (for paths and identifiers)
pub const APP_NAME_LOWER: &str = "catalog";

/// Unix-style dotfile folder name
pub const APP_DOT_FOLDER: &str = ".catalog";

// =============================================================================
// Configuration Files
// =============================================================================

/// Config file name
pub const CONFIG_FILE_NAME: &str = "catalog.json";

/// Environment variable for config file path
pub const ENV_CONFIG: &str = "CATALOG_CONFIG";

// =============================================================================
// Environment Variables - Server
// =============================================================================

/// Environment variable for server host
pub const ENV_HOST: &str = "CATALOG_HOST";

/// Environment variable for server port
pub const ENV_PORT: &str = "CATALOG_PORT";

/// Environment variable for log level/filter
pub const ENV_LOG: &str = "CATALOG_LOG";

// =============================================================================
// Server Defaults
// =============================================================================

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 3000;

/// Default request body limit (1MB)
pub const DEFAULT_BODY_LIMIT: usize = 1024 * 1024;

/// Graceful shutdown timeout in seconds
pub const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// Environment Variables - Storage
// =============================================================================

/// Environment variable to override data directory
pub const ENV_DATA_DIR: &str = "CATALOG_DATA_DIR";

/// Environment variable for the SQLite database file path
pub const ENV_DATABASE_PATH: &str = "CATALOG_DATABASE_PATH";

// =============================================================================
// SQLite
// =============================================================================

/// Database file name inside the data directory
pub const SQLITE_DB_FILENAME: &str = "catalog.db";

/// Maximum pool connections
pub const SQLITE_MAX_CONNECTIONS: u32 = 8;

/// Busy timeout in seconds
pub const SQLITE_BUSY_TIMEOUT_SECS: u64 = 5;

/// Page cache size (negative = KiB)
pub const SQLITE_CACHE_SIZE: &str = "-16000";

/// Rows per INSERT transaction when seeding
pub const SEED_BATCH_SIZE: usize = 1000;

// =============================================================================
// Search
// =============================================================================

/// Environment variable for the unknown-field policy (strict or permissive)
pub const ENV_UNKNOWN_FIELDS: &str = "CATALOG_UNKNOWN_FIELDS";

/// Maximum number of filters in one request
pub const MAX_FILTERS: usize = 50;

/// Maximum number of values in one IN list
pub const MAX_IN_VALUES: usize = 100;

/// Maximum length of a column name or dynamic attribute name
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Default page number
pub const DEFAULT_PAGE: i64 = 1;

/// Default items per page
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Smallest accepted page size
pub const MIN_PAGE_SIZE: i64 = 1;

/// Largest accepted page size
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// Catalog Defaults
// =============================================================================

/// Products table
pub const DEFAULT_CATALOG_TABLE: &str = "products";

/// JSON document column holding per-product specifications
pub const DEFAULT_DOCUMENT_COLUMN: &str = "specs";

/// Columns returned for each product row
pub const DEFAULT_SELECT_COLUMNS: &[&str] = &["id", "name", "category", "price", "specs"];

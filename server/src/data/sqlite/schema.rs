//! SQLite schema definitions

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Complete schema SQL
pub const SCHEMA: &str = r#"
-- =============================================================================
-- Infrastructure: Schema version tracking
-- =============================================================================
CREATE TABLE IF NOT EXISTS schema_version (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    version INTEGER NOT NULL,
    applied_at INTEGER NOT NULL,
    description TEXT
);

-- =============================================================================
-- Products
-- Structured columns back the registry; everything else lives in `specs`.
-- =============================================================================
CREATE TABLE IF NOT EXISTS products (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL CHECK(length(name) >= 1),
    category TEXT NOT NULL,
    brand TEXT,
    price REAL NOT NULL CHECK(price >= 0),
    cpu TEXT,
    gpu TEXT,
    ram_gb INTEGER,
    storage_gb INTEGER,
    screen_in REAL,
    battery_mah INTEGER,
    in_stock INTEGER NOT NULL DEFAULT 1 CHECK(in_stock IN (0, 1)),
    specs TEXT NOT NULL DEFAULT '{}' CHECK(json_valid(specs))
);

CREATE INDEX IF NOT EXISTS idx_products_category ON products(category);
CREATE INDEX IF NOT EXISTS idx_products_brand ON products(brand);
CREATE INDEX IF NOT EXISTS idx_products_price ON products(price);
CREATE INDEX IF NOT EXISTS idx_products_ram ON products(ram_gb);
CREATE INDEX IF NOT EXISTS idx_products_gpu ON products(gpu);
"#;

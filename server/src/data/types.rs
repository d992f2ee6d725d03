//! Catalog row types shared by the repository and the search service

use serde::{Deserialize, Serialize};

/// One result row, keyed by selected column name
///
/// Rows are decoded generically because the selected column list is
/// configurable.
pub type CatalogRow = serde_json::Map<String, serde_json::Value>;

/// Product to insert into the `products` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category: String,
    pub brand: Option<String>,
    pub price: f64,
    pub cpu: Option<String>,
    pub gpu: Option<String>,
    pub ram_gb: Option<i64>,
    pub storage_gb: Option<i64>,
    pub screen_in: Option<f64>,
    pub battery_mah: Option<i64>,
    pub in_stock: bool,
    /// Free-form attributes, stored as JSON text
    pub specs: serde_json::Value,
}

impl NewProduct {
    /// Minimal product with no structured attributes
    pub fn new(name: impl Into<String>, category: impl Into<String>, price: f64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            brand: None,
            price,
            cpu: None,
            gpu: None,
            ram_gb: None,
            storage_gb: None,
            screen_in: None,
            battery_mah: None,
            in_stock: true,
            specs: serde_json::Value::Object(Default::default()),
        }
    }
}

//! Synthetic catalog generator
//!
//! Produces products from per-category templates. Structured columns are
//! filled where the category has them; `specs` carries the same attributes
//! plus sparse extras (weight, color) that only exist as document attributes.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde_json::{Map, Value};

use crate::core::constants::SEED_BATCH_SIZE;
use crate::data::{CatalogRepository, DataError, NewProduct};

struct CategoryTemplate {
    category: &'static str,
    ram_gb: &'static [i64],
    storage_gb: &'static [i64],
    gpu: &'static [&'static str],
    cpu: &'static [&'static str],
    screen_in: &'static [f64],
    battery_mah: &'static [i64],
    brand: &'static [&'static str],
    price: (f64, f64),
    weight_kg: (f64, f64),
}

const CPUS: &[&str] = &[
    "Intel i5",
    "Intel i7",
    "Intel i9",
    "AMD Ryzen 5",
    "AMD Ryzen 7",
    "AMD Ryzen 9",
];

const COLORS: &[&str] = &["black", "silver", "white", "blue", "graphite"];

const TEMPLATES: &[CategoryTemplate] = &[
    CategoryTemplate {
        category: "laptop",
        ram_gb: &[8, 16, 32, 64],
        storage_gb: &[256, 512, 1024, 2048],
        gpu: &[
            "Intel Iris",
            "RTX 3050",
            "RTX 3060",
            "RTX 4070",
            "RTX 4080",
            "AMD Radeon",
        ],
        cpu: CPUS,
        screen_in: &[13.3, 14.0, 15.6, 16.0, 17.3],
        battery_mah: &[],
        brand: &["Dell", "HP", "Lenovo", "Apple", "Asus", "MSI", "Acer"],
        price: (500.0, 3000.0),
        weight_kg: (1.0, 3.5),
    },
    CategoryTemplate {
        category: "phone",
        ram_gb: &[4, 6, 8, 12, 16],
        storage_gb: &[64, 128, 256, 512, 1024],
        gpu: &[],
        cpu: &[],
        screen_in: &[5.5, 6.1, 6.4, 6.7, 6.9],
        battery_mah: &[3000, 4000, 4500, 5000, 6000],
        brand: &["Apple", "Samsung", "Google", "OnePlus", "Xiaomi", "Oppo"],
        price: (200.0, 1500.0),
        weight_kg: (0.15, 0.25),
    },
    CategoryTemplate {
        category: "tablet",
        ram_gb: &[4, 6, 8, 12, 16],
        storage_gb: &[64, 128, 256, 512],
        gpu: &[],
        cpu: &[],
        screen_in: &[8.0, 10.1, 11.0, 12.9],
        battery_mah: &[5000, 7000, 8000, 10000],
        brand: &["Apple", "Samsung", "Microsoft", "Amazon", "Lenovo"],
        price: (150.0, 1200.0),
        weight_kg: (0.3, 0.8),
    },
    CategoryTemplate {
        category: "desktop",
        ram_gb: &[8, 16, 32, 64, 128],
        storage_gb: &[512, 1024, 2048, 4096],
        gpu: &[
            "RTX 3060",
            "RTX 3070",
            "RTX 4070",
            "RTX 4080",
            "RTX 4090",
            "AMD RX 7900",
        ],
        cpu: CPUS,
        screen_in: &[],
        battery_mah: &[],
        brand: &["Dell", "HP", "Lenovo", "Custom Build", "Alienware"],
        price: (600.0, 5000.0),
        weight_kg: (5.0, 15.0),
    },
];

/// Product generator over any RNG
pub struct CatalogGenerator<R: Rng> {
    rng: R,
    generated: u64,
}

impl CatalogGenerator<StdRng> {
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// Reproducible sequence
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> CatalogGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self { rng, generated: 0 }
    }

    pub fn product(&mut self) -> NewProduct {
        self.generated += 1;
        let template = &TEMPLATES[self.rng.gen_range(0..TEMPLATES.len())];

        let brand = pick(&mut self.rng, template.brand);
        let ram_gb = pick(&mut self.rng, template.ram_gb);
        let storage_gb = pick(&mut self.rng, template.storage_gb);
        let gpu = pick(&mut self.rng, template.gpu);
        let cpu = pick(&mut self.rng, template.cpu);
        let screen_in = pick(&mut self.rng, template.screen_in);
        let battery_mah = pick(&mut self.rng, template.battery_mah);

        let mut specs = Map::new();
        insert_some(&mut specs, "brand", brand);
        insert_some(&mut specs, "ram", ram_gb);
        insert_some(&mut specs, "storage", storage_gb);
        insert_some(&mut specs, "gpu", gpu);
        insert_some(&mut specs, "cpu", cpu);
        insert_some(&mut specs, "screen_size", screen_in);
        insert_some(&mut specs, "battery_mah", battery_mah);

        // Sparse: present on roughly half / a third of products
        if self.rng.gen_bool(0.5) {
            let (lo, hi) = template.weight_kg;
            let weight = round_to(self.rng.gen_range(lo..hi), 2);
            specs.insert("weight_kg".to_string(), Value::from(weight));
        }
        if let Some(color) = pick(&mut self.rng, COLORS)
            && self.rng.gen_bool(0.35)
        {
            specs.insert("color".to_string(), Value::from(color));
        }

        let (lo, hi) = template.price;
        let price = round_to(self.rng.gen_range(lo..hi), 2);

        NewProduct {
            name: format!(
                "{}-{}-{}",
                brand.unwrap_or("Generic"),
                template.category,
                self.generated
            ),
            category: template.category.to_string(),
            brand: brand.map(str::to_string),
            price,
            cpu: cpu.map(str::to_string),
            gpu: gpu.map(str::to_string),
            ram_gb,
            storage_gb,
            screen_in,
            battery_mah,
            in_stock: self.rng.gen_bool(0.9),
            specs: Value::Object(specs),
        }
    }

    pub fn batch(&mut self, count: usize) -> Vec<NewProduct> {
        (0..count).map(|_| self.product()).collect()
    }
}

fn pick<T: Copy, R: Rng>(rng: &mut R, options: &[T]) -> Option<T> {
    options.choose(rng).copied()
}

fn insert_some<T: Into<Value>>(specs: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        specs.insert(key.to_string(), value.into());
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Insert `count` generated products in batches, optionally clearing first
pub async fn seed_catalog<R: Rng>(
    repository: &dyn CatalogRepository,
    generator: &mut CatalogGenerator<R>,
    count: usize,
    reset: bool,
) -> Result<u64, DataError> {
    if reset {
        let removed = repository.clear_products().await?;
        tracing::info!(removed, "Cleared existing products");
    }

    let mut inserted = 0u64;
    let mut remaining = count;
    while remaining > 0 {
        let size = remaining.min(SEED_BATCH_SIZE);
        let batch = generator.batch(size);
        inserted += repository.insert_products(&batch).await?;
        remaining -= size;
        tracing::debug!(inserted, total = count, "Seed batch written");
    }

    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::data::SqliteService;

    #[test]
    fn test_seeded_generator_is_reproducible() {
        let a = CatalogGenerator::seeded(7).batch(20);
        let b = CatalogGenerator::seeded(7).batch(20);
        assert_eq!(a, b);
    }

    #[test]
    fn test_products_follow_templates() {
        let mut generator = CatalogGenerator::seeded(42);
        for product in generator.batch(200) {
            let template = TEMPLATES
                .iter()
                .find(|t| t.category == product.category)
                .unwrap();
            assert!(product.price >= template.price.0 && product.price <= template.price.1);
            assert_eq!(product.gpu.is_some(), !template.gpu.is_empty());
            assert_eq!(product.battery_mah.is_some(), !template.battery_mah.is_empty());
            assert!(product.specs.is_object());
            let brand = product.brand.as_deref().unwrap_or("Generic");
            assert!(product.name.starts_with(&format!("{}-{}-", brand, product.category)));
        }
    }

    #[test]
    fn test_sparse_attributes_vary() {
        let products = CatalogGenerator::seeded(1).batch(200);
        let with_weight = products
            .iter()
            .filter(|p| p.specs.get("weight_kg").is_some())
            .count();
        assert!(with_weight > 0 && with_weight < products.len());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(12.3456, 2), 12.35);
        assert_eq!(round_to(0.004, 2), 0.0);
    }

    #[tokio::test]
    async fn test_seed_catalog_batches_and_reset() {
        let db = Arc::new(SqliteService::in_memory().await.unwrap());
        let mut generator = CatalogGenerator::seeded(3);

        let inserted = seed_catalog(&db, &mut generator, SEED_BATCH_SIZE + 5, false)
            .await
            .unwrap();
        assert_eq!(inserted, (SEED_BATCH_SIZE + 5) as u64);

        let inserted = seed_catalog(&db, &mut generator, 10, true).await.unwrap();
        assert_eq!(inserted, 10);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 10);
    }
}

//! Product repository for SQLite operations
//!
//! Executes compiled search statements. Statement text comes from the filter
//! compiler; every client value is bound, never interpolated.

use serde_json::Value;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::{Column, Executor, Row, SqlitePool, TypeInfo, ValueRef};

use crate::data::filters::{Scalar, SqlPlan};
use crate::data::sqlite::SqliteError;
use crate::data::types::{CatalogRow, NewProduct};

/// Bind plan params in placeholder order
fn bind_params<'q>(
    mut query: Query<'q, Sqlite, SqliteArguments<'q>>,
    params: &'q [Scalar],
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    for param in params {
        query = match param {
            Scalar::Integer(v) => query.bind(*v),
            Scalar::Float(v) => query.bind(*v),
            Scalar::Text(v) => query.bind(v.as_str()),
            Scalar::Bool(v) => query.bind(*v),
        };
    }
    query
}

/// Decode a row by the storage class of each value
fn decode_row(row: &SqliteRow) -> Result<CatalogRow, sqlx::Error> {
    let mut out = CatalogRow::new();
    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;
        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::from(row.try_get::<i64, _>(index)?),
                "REAL" | "NUMERIC" => Value::from(row.try_get::<f64, _>(index)?),
                "TEXT" => Value::from(row.try_get::<String, _>(index)?),
                // BLOB
                _ => Value::Null,
            }
        };
        out.insert(column.name().to_string(), value);
    }
    Ok(out)
}

/// Run a compiled row statement
pub async fn fetch_rows<'c, E>(executor: E, plan: &SqlPlan) -> Result<Vec<CatalogRow>, SqliteError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let rows = bind_params(sqlx::query(&plan.sql), &plan.params)
        .fetch_all(executor)
        .await?;

    let decoded = rows
        .iter()
        .map(decode_row)
        .collect::<Result<Vec<_>, _>>()?;

    tracing::trace!(rows = decoded.len(), "Fetched catalog rows");
    Ok(decoded)
}

/// Run a compiled `SELECT COUNT(*)` statement
pub async fn count_rows<'c, E>(executor: E, plan: &SqlPlan) -> Result<u64, SqliteError>
where
    E: Executor<'c, Database = Sqlite>,
{
    let row = bind_params(sqlx::query(&plan.sql), &plan.params)
        .fetch_one(executor)
        .await?;
    let count: i64 = row.try_get(0)?;
    Ok(count.max(0) as u64)
}

/// Run the count and row statements inside one read transaction.
///
/// SQLite pins the snapshot at the first read, so the total always describes
/// the same data as the returned page even while writers commit.
pub async fn fetch_page(
    pool: &SqlitePool,
    rows: &SqlPlan,
    count: &SqlPlan,
) -> Result<(u64, Vec<CatalogRow>), SqliteError> {
    let mut tx = pool.begin().await?;
    let total = count_rows(&mut *tx, count).await?;
    let page = fetch_rows(&mut *tx, rows).await?;
    tx.commit().await?;
    Ok((total, page))
}

/// Insert products in one transaction
pub async fn insert_products(pool: &SqlitePool, products: &[NewProduct]) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;
    let mut inserted = 0u64;

    for product in products {
        let result = sqlx::query(
            r#"
            INSERT INTO products (
                name, category, brand, price, cpu, gpu, ram_gb, storage_gb,
                screen_in, battery_mah, in_stock, specs
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&product.name)
        .bind(&product.category)
        .bind(&product.brand)
        .bind(product.price)
        .bind(&product.cpu)
        .bind(&product.gpu)
        .bind(product.ram_gb)
        .bind(product.storage_gb)
        .bind(product.screen_in)
        .bind(product.battery_mah)
        .bind(product.in_stock)
        .bind(product.specs.to_string())
        .execute(&mut *tx)
        .await?;
        inserted += result.rows_affected();
    }

    tx.commit().await?;
    Ok(inserted)
}

/// Delete every product and restart id numbering
pub async fn clear_products(pool: &SqlitePool) -> Result<u64, SqliteError> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("DELETE FROM products").execute(&mut *tx).await?;
    sqlx::query("DELETE FROM sqlite_sequence WHERE name = 'products'")
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::core::config::{CatalogConfig, SearchConfig};
    use crate::data::filters::{FilterRequest, QueryCompiler};
    use crate::data::sqlite::SqliteService;

    fn laptop(name: &str, price: f64, ram: i64, gpu: &str, specs: Value) -> NewProduct {
        NewProduct {
            brand: Some("Acme".to_string()),
            gpu: Some(gpu.to_string()),
            ram_gb: Some(ram),
            specs,
            ..NewProduct::new(name, "laptop", price)
        }
    }

    async fn seeded() -> SqliteService {
        let service = SqliteService::in_memory().await.unwrap();
        let products = vec![
            laptop("Alpha 14", 999.0, 16, "RTX3060", json!({"weight_kg": 1.4, "color": "silver"})),
            laptop("Beta 16", 1499.0, 32, "RTX4070", json!({"weight_kg": 2.3, "color": "black"})),
            laptop("Gamma 13", 699.0, 8, "Iris Xe", json!({"weight_kg": 1.1})),
            NewProduct {
                in_stock: false,
                ..laptop("Delta 17", 2199.0, 64, "RTX4090", json!({"weight_kg": 3.2}))
            },
        ];
        assert_eq!(insert_products(service.pool(), &products).await.unwrap(), 4);
        service
    }

    fn compile(body: Value) -> crate::data::filters::CompiledSearch {
        let request: FilterRequest = serde_json::from_value(body).unwrap();
        QueryCompiler::from_config(&CatalogConfig::default(), &SearchConfig::default())
            .unwrap()
            .compile(&request)
            .unwrap()
    }

    fn names(rows: &[CatalogRow]) -> Vec<&str> {
        rows.iter().filter_map(|r| r["name"].as_str()).collect()
    }

    #[tokio::test]
    async fn test_structured_filter_with_sort() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "ram", "op": "GE", "value": 16}],
            "sort": {"field": "price", "direction": "desc"}
        }));

        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Delta 17", "Beta 16", "Alpha 14"]);
        assert_eq!(count_rows(service.pool(), &search.count).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_rows_decode_by_type() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "name", "op": "EQ", "value": "Alpha 14"}]
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row["id"], json!(1));
        assert_eq!(row["category"], json!("laptop"));
        assert_eq!(row["price"], json!(999.0));
        assert!(row["specs"].is_string());
    }

    #[tokio::test]
    async fn test_in_and_like() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [
                {"field": "gpu", "op": "IN", "value": ["RTX3060", "RTX4070", "Iris Xe"]},
                {"field": "name", "op": "LIKE", "value": "a 1"}
            ],
            "sort": {"field": "name"}
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Alpha 14", "Beta 16", "Gamma 13"]);
    }

    #[tokio::test]
    async fn test_dynamic_attribute_numeric_compare() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "weight_kg", "op": "LE", "value": 2.5}],
            "sort": {"field": "price"}
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Gamma 13", "Alpha 14", "Beta 16"]);
    }

    #[tokio::test]
    async fn test_dynamic_attribute_equality() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "color", "op": "EQ", "value": "black"}]
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Beta 16"]);
    }

    #[tokio::test]
    async fn test_boolean_filter() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "in_stock", "op": "EQ", "value": false}]
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Delta 17"]);
    }

    #[tokio::test]
    async fn test_pagination_window_and_total() {
        let service = seeded().await;
        let search = compile(json!({"sort": {"field": "price"}, "page": 2, "pageSize": 3}));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Delta 17"]);
        assert_eq!(count_rows(service.pool(), &search.count).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_hostile_value_is_inert() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "name", "op": "EQ", "value": "x'; DROP TABLE products; --"}]
        }));
        let rows = fetch_rows(service.pool(), &search.rows).await.unwrap();
        assert!(rows.is_empty());

        let all = compile(json!({}));
        assert_eq!(count_rows(service.pool(), &all.count).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_fetch_page_returns_total_and_window() {
        let service = seeded().await;
        let search = compile(json!({
            "filters": [{"field": "ram", "op": "GE", "value": 16}],
            "sort": {"field": "price"},
            "pageSize": 2
        }));
        let (total, rows) = fetch_page(service.pool(), &search.rows, &search.count)
            .await
            .unwrap();
        assert_eq!(total, 3);
        assert_eq!(names(&rows), vec!["Alpha 14", "Beta 16"]);
    }

    #[tokio::test]
    async fn test_read_transaction_ignores_concurrent_insert() {
        let dir = tempfile::tempdir().unwrap();
        let service = SqliteService::open(&dir.path().join("catalog.db"))
            .await
            .unwrap();
        insert_products(service.pool(), &[NewProduct::new("Solo", "tablet", 10.0)])
            .await
            .unwrap();
        let all = compile(json!({}));

        let mut tx = service.pool().begin().await.unwrap();
        assert_eq!(count_rows(&mut *tx, &all.count).await.unwrap(), 1);

        insert_products(service.pool(), &[NewProduct::new("Duo", "tablet", 20.0)])
            .await
            .unwrap();

        let rows = fetch_rows(&mut *tx, &all.rows).await.unwrap();
        assert_eq!(names(&rows), vec!["Solo"]);
        tx.commit().await.unwrap();

        assert_eq!(count_rows(service.pool(), &all.count).await.unwrap(), 2);
        service.close().await;
    }

    #[tokio::test]
    async fn test_clear_products_resets_ids() {
        let service = seeded().await;
        assert_eq!(clear_products(service.pool()).await.unwrap(), 4);

        insert_products(service.pool(), &[NewProduct::new("Solo", "tablet", 10.0)])
            .await
            .unwrap();
        let id: i64 = sqlx::query_scalar("SELECT id FROM products")
            .fetch_one(service.pool())
            .await
            .unwrap();
        assert_eq!(id, 1);
    }
}

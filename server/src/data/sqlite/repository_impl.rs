//! CatalogRepository trait implementation for SQLite

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::data::error::DataError;
use crate::data::filters::SqlPlan;
use crate::data::traits::CatalogRepository;
use crate::data::types::{CatalogRow, NewProduct};

use super::SqliteService;
use super::SqliteError;
use super::repositories::product;

/// Race a query against the caller's cancellation token
async fn cancellable<T>(
    cancel: Option<&CancellationToken>,
    query: impl Future<Output = Result<T, SqliteError>>,
) -> Result<T, DataError> {
    match cancel {
        Some(token) => tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracing::debug!("Catalog query cancelled");
                Err(DataError::Cancelled)
            }
            result = query => result.map_err(Into::into),
        },
        None => query.await.map_err(Into::into),
    }
}

#[async_trait]
impl CatalogRepository for Arc<SqliteService> {
    async fn fetch_rows(
        &self,
        plan: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CatalogRow>, DataError> {
        cancellable(cancel, product::fetch_rows(self.pool(), plan)).await
    }

    async fn count_rows(
        &self,
        plan: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64, DataError> {
        cancellable(cancel, product::count_rows(self.pool(), plan)).await
    }

    async fn fetch_page(
        &self,
        rows: &SqlPlan,
        count: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<(u64, Vec<CatalogRow>), DataError> {
        cancellable(cancel, product::fetch_page(self.pool(), rows, count)).await
    }

    async fn insert_products(&self, products: &[NewProduct]) -> Result<u64, DataError> {
        product::insert_products(self.pool(), products)
            .await
            .map_err(Into::into)
    }

    async fn clear_products(&self) -> Result<u64, DataError> {
        product::clear_products(self.pool())
            .await
            .map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::Scalar;

    fn count_all() -> SqlPlan {
        SqlPlan {
            sql: "SELECT COUNT(*) FROM products".to_string(),
            params: vec![],
        }
    }

    #[tokio::test]
    async fn test_count_without_token() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        service
            .insert_products(&[NewProduct::new("Pad", "tablet", 199.0)])
            .await
            .unwrap();
        assert_eq!(service.count_rows(&count_all(), None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_token_short_circuits() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        let token = CancellationToken::new();
        token.cancel();

        let err = service
            .count_rows(&count_all(), Some(&token))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());

        let plan = SqlPlan {
            sql: "SELECT id FROM products LIMIT ? OFFSET ?".to_string(),
            params: vec![Scalar::Integer(20), Scalar::Integer(0)],
        };
        let err = service.fetch_rows(&plan, Some(&token)).await.unwrap_err();
        assert!(matches!(err, DataError::Cancelled));
    }

    #[tokio::test]
    async fn test_live_token_runs_query() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        let token = CancellationToken::new();
        assert_eq!(
            service.count_rows(&count_all(), Some(&token)).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_fetch_page() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        service
            .insert_products(&[
                NewProduct::new("Pad", "tablet", 199.0),
                NewProduct::new("Slate", "tablet", 299.0),
            ])
            .await
            .unwrap();
        let rows = SqlPlan {
            sql: "SELECT name FROM products ORDER BY price LIMIT ? OFFSET ?".to_string(),
            params: vec![Scalar::Integer(1), Scalar::Integer(1)],
        };

        let (total, page) = service.fetch_page(&rows, &count_all(), None).await.unwrap();
        assert_eq!(total, 2);
        assert_eq!(page.len(), 1);
        assert_eq!(page[0]["name"], "Slate");

        let token = CancellationToken::new();
        token.cancel();
        let err = service
            .fetch_page(&rows, &count_all(), Some(&token))
            .await
            .unwrap_err();
        assert!(err.is_cancelled());
    }

    #[tokio::test]
    async fn test_sql_error_maps_to_sqlite() {
        let service = Arc::new(SqliteService::in_memory().await.unwrap());
        let plan = SqlPlan {
            sql: "SELECT COUNT(*) FROM missing_table".to_string(),
            params: vec![],
        };
        let err = service.count_rows(&plan, None).await.unwrap_err();
        assert!(matches!(err, DataError::Sqlite(_)));
    }
}

//! Repository traits for database backends
//!
//! The search service only talks to `CatalogRepository`; SQLite implements it
//! and tests substitute their own.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::data::error::DataError;
use crate::data::filters::SqlPlan;
use crate::data::types::{CatalogRow, NewProduct};

/// Repository trait for catalog operations
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Run a compiled row statement.
    ///
    /// Resolves to `DataError::Cancelled` as soon as `cancel` fires; the
    /// statement is dropped and its connection returned to the pool.
    async fn fetch_rows(
        &self,
        plan: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<Vec<CatalogRow>, DataError>;

    /// Run a compiled count statement
    async fn count_rows(
        &self,
        plan: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<u64, DataError>;

    /// Run the count and row statements of one search and return
    /// `(total, rows)`.
    ///
    /// The default runs both concurrently with no shared snapshot, so a write
    /// landing in between can make the total disagree with the page. Backends
    /// with read transactions override it.
    async fn fetch_page(
        &self,
        rows: &SqlPlan,
        count: &SqlPlan,
        cancel: Option<&CancellationToken>,
    ) -> Result<(u64, Vec<CatalogRow>), DataError> {
        tokio::try_join!(self.count_rows(count, cancel), self.fetch_rows(rows, cancel))
    }

    /// Insert products, returning how many rows were written
    async fn insert_products(&self, products: &[NewProduct]) -> Result<u64, DataError>;

    /// Delete all products
    async fn clear_products(&self) -> Result<u64, DataError>;
}

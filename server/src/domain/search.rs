//! Catalog search service
//!
//! Compiles a request, runs the count and row statements against one
//! snapshot and attaches pagination metadata. Compilation is synchronous and
//! fails before any storage call is made.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::data::filters::{
    CompiledSearch, FilterError, FilterRequest, Pagination, QueryCompiler, paginate,
};
use crate::data::{CatalogRepository, CatalogRow, DataError};

#[derive(Error, Debug)]
pub enum SearchError {
    /// The request itself is invalid (client error)
    #[error(transparent)]
    Filter(#[from] FilterError),

    /// The statements failed or were cancelled (server side)
    #[error("Search execution failed: {0}")]
    Execution(#[from] DataError),
}

/// One page of results
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub rows: Vec<CatalogRow>,
    pub total: u64,
    pub pagination: Pagination,
}

pub struct SearchService {
    compiler: QueryCompiler,
    repository: Arc<dyn CatalogRepository>,
}

impl SearchService {
    pub fn new(compiler: QueryCompiler, repository: Arc<dyn CatalogRepository>) -> Self {
        Self {
            compiler,
            repository,
        }
    }

    /// Compile without executing
    pub fn explain(&self, request: &FilterRequest) -> Result<CompiledSearch, FilterError> {
        self.compiler.compile(request)
    }

    pub async fn search(
        &self,
        request: &FilterRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<SearchPage, SearchError> {
        let compiled = self.compiler.compile(request)?;

        tracing::debug!(
            sql = %compiled.rows.sql,
            params = compiled.rows.params.len(),
            "Executing catalog search"
        );

        let (total, rows) = self
            .repository
            .fetch_page(&compiled.rows, &compiled.count, cancel)
            .await?;

        let document_column = self.compiler.registry().document_column();
        let rows = rows
            .into_iter()
            .map(|row| decode_document(row, document_column))
            .collect();

        let pagination = paginate(compiled.page.page, compiled.page.page_size, total);

        Ok(SearchPage {
            rows,
            total,
            pagination,
        })
    }
}

/// Replace the stored JSON text of the document column with its parsed value
fn decode_document(mut row: CatalogRow, document_column: &str) -> CatalogRow {
    let parsed = match row.get(document_column) {
        Some(serde_json::Value::String(text)) => serde_json::from_str(text).ok(),
        _ => None,
    };
    if let Some(value) = parsed {
        row.insert(document_column.to_string(), value);
    }
    row
}

//! Shared API types
//!
//! Error envelope and the search response body.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::data::CatalogRow;
use crate::data::filters::FilterError;
use crate::domain::{SearchError, SearchPage};

/// Error body: `{"error": message, "code": CODE}`
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

/// Standard API error response
#[derive(Debug)]
pub enum ApiError {
    BadRequest { code: String, message: String },
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Storage failures are logged here and never described to the client
    pub fn from_data(e: crate::data::DataError) -> Self {
        if e.is_cancelled() {
            tracing::warn!("Search cancelled before completion");
        } else {
            tracing::error!(error = %e, transient = e.is_transient(), "Search execution failed");
        }
        Self::internal("Search failed")
    }
}

impl From<FilterError> for ApiError {
    fn from(e: FilterError) -> Self {
        tracing::debug!(code = e.code(), error = %e, "Rejected search request");
        Self::bad_request(e.code(), e.to_string())
    }
}

impl From<SearchError> for ApiError {
    fn from(e: SearchError) -> Self {
        match e {
            SearchError::Filter(e) => e.into(),
            SearchError::Execution(e) => Self::from_data(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::BadRequest { code, message } => (StatusCode::BAD_REQUEST, code, message),
            Self::Internal { message } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL".to_string(),
                message,
            ),
        };
        (
            status,
            Json(ErrorResponse {
                error: message,
                code,
            }),
        )
            .into_response()
    }
}

/// Pagination metadata in response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: i64,
    pub page_size: i64,
    /// Rows matching the filters across all pages
    pub total: u64,
    pub pages: u64,
}

/// Search response body
#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    #[schema(value_type = Vec<Object>)]
    pub data: Vec<CatalogRow>,
    pub pagination: PaginationMeta,
}

impl From<SearchPage> for SearchResponse {
    fn from(page: SearchPage) -> Self {
        Self {
            data: page.rows,
            pagination: PaginationMeta {
                page: page.pagination.page,
                page_size: page.pagination.page_size,
                total: page.total,
                pages: page.pagination.total_pages,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;
    use crate::data::DataError;
    use crate::data::filters::{Pagination, ResolutionError};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_filter_error_is_bad_request() {
        let err: ApiError = SearchError::Filter(FilterError::Resolution(
            ResolutionError::UnknownField {
                field: "weight_kg".to_string(),
            },
        ))
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["code"], "UNKNOWN_FIELD");
        assert!(body["error"].as_str().unwrap().contains("weight_kg"));
    }

    #[tokio::test]
    async fn test_execution_error_hides_details() {
        let err: ApiError =
            SearchError::Execution(DataError::from_sqlite(sqlx::Error::PoolTimedOut)).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(
            body,
            serde_json::json!({"error": "Search failed", "code": "INTERNAL"})
        );
    }

    #[test]
    fn test_search_response_from_page() {
        let response = SearchResponse::from(SearchPage {
            rows: vec![],
            total: 41,
            pagination: Pagination {
                page: 3,
                page_size: 20,
                offset: 40,
                total_pages: 3,
            },
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json["pagination"],
            serde_json::json!({"page": 3, "pageSize": 20, "total": 41, "pages": 3})
        );
        assert_eq!(json["data"], serde_json::json!([]));
    }
}

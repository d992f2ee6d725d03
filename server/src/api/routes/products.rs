//! Product search endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use tokio_util::sync::CancellationToken;

use crate::api::extractors::ValidatedJson;
use crate::api::types::{ApiError, ErrorResponse, SearchResponse};
use crate::data::filters::FilterRequest;
use crate::domain::SearchService;

#[derive(Clone)]
pub struct ProductsApiState {
    pub search: Arc<SearchService>,
    /// Root token; each request searches under a child of it
    pub cancel: CancellationToken,
}

pub fn routes(search: Arc<SearchService>, cancel: CancellationToken) -> Router<()> {
    let state = ProductsApiState { search, cancel };

    Router::new()
        .route("/search", post(search_products))
        .with_state(state)
}

/// Search the catalog with structured filters
#[utoipa::path(
    post,
    path = "/api/v1/products/search",
    tag = "products",
    request_body = FilterRequest,
    responses(
        (status = 200, description = "One page of matching products", body = SearchResponse),
        (status = 400, description = "Invalid filters, sort or body", body = ErrorResponse),
        (status = 500, description = "Search failed", body = ErrorResponse)
    )
)]
pub async fn search_products(
    State(state): State<ProductsApiState>,
    ValidatedJson(request): ValidatedJson<FilterRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let cancel = state.cancel.child_token();
    let page = state.search.search(&request, Some(&cancel)).await?;
    Ok(Json(page.into()))
}

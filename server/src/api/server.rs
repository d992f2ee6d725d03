//! API server initialization

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{self, AllowedOrigins};
use super::openapi::{openapi_json, swagger_ui_html};
use super::routes::{health, products};
use crate::core::CoreApp;
use crate::core::constants::DEFAULT_BODY_LIMIT;
use crate::data::SqliteService;
use crate::domain::SearchService;

pub struct ApiServer {
    app: CoreApp,
    allowed_origins: AllowedOrigins,
}

impl ApiServer {
    pub fn new(app: CoreApp) -> Self {
        let allowed_origins = AllowedOrigins::new(&app.config.server.host, app.config.server.port);
        Self {
            app,
            allowed_origins,
        }
    }

    /// Returns CoreApp for graceful shutdown
    pub async fn start(self) -> Result<CoreApp> {
        let Self {
            app,
            allowed_origins,
        } = self;

        let shutdown = app.shutdown.clone();
        let addr = SocketAddr::new(app.config.server.host.parse()?, app.config.server.port);

        let router = build_router(
            app.search.clone(),
            app.database.clone(),
            shutdown.cancellation_token(),
            &allowed_origins,
        );

        let listener = TcpListener::bind(addr).await?;
        tracing::debug!(%addr, "HTTP server listening");
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.wait())
            .await?;

        Ok(app)
    }
}

/// Full application router. Search is served under the versioned API path
/// and under the unversioned `/products/search` alias.
pub fn build_router(
    search: Arc<SearchService>,
    database: Arc<SqliteService>,
    cancel: CancellationToken,
    allowed_origins: &AllowedOrigins,
) -> Router {
    let product_routes = products::routes(search, cancel);

    Router::new()
        .route("/api/v1/health", get(health::health).with_state(database))
        .route("/api/openapi.json", get(openapi_json))
        .route("/api/docs", get(swagger_ui_html))
        .route("/api/docs/", get(swagger_ui_html))
        .nest("/api/v1/products", product_routes.clone())
        .nest("/products", product_routes)
        .fallback(middleware::handle_404)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(middleware::cors(allowed_origins))
        .layer(DefaultBodyLimit::max(DEFAULT_BODY_LIMIT))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::core::config::{CatalogConfig, SearchConfig};
    use crate::data::filters::QueryCompiler;
    use crate::data::{CatalogRepository, NewProduct, SqliteService};

    async fn test_router() -> Router {
        let db = Arc::new(SqliteService::in_memory().await.unwrap());
        db.insert_products(&[
            NewProduct::new("Acer-laptop-1", "laptop", 700.0),
            NewProduct::new("Apple-phone-2", "phone", 999.0),
        ])
        .await
        .unwrap();
        let compiler =
            QueryCompiler::from_config(&CatalogConfig::default(), &SearchConfig::default())
                .unwrap();
        let search = Arc::new(SearchService::new(compiler, Arc::new(db.clone())));
        build_router(
            search,
            db,
            CancellationToken::new(),
            &AllowedOrigins::new("127.0.0.1", 3000),
        )
    }

    async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn search_request(path: &str, body: Value) -> Request<Body> {
        Request::post(path)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::get("/api/v1/health").body(Body::empty()).unwrap();
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_versioned_and_alias_paths_agree() {
        let filters = json!({"filters": [{"field": "category", "op": "EQ", "value": "phone"}]});
        let (status_v1, body_v1) = send(
            test_router().await,
            search_request("/api/v1/products/search", filters.clone()),
        )
        .await;
        let (status_alias, body_alias) =
            send(test_router().await, search_request("/products/search", filters)).await;

        assert_eq!(status_v1, StatusCode::OK);
        assert_eq!(status_alias, StatusCode::OK);
        assert_eq!(body_v1, body_alias);
        assert_eq!(body_v1["data"][0]["name"], "Apple-phone-2");
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let request = Request::get("/api/v1/nope").body(Body::empty()).unwrap();
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_search_requires_post() {
        let request = Request::get("/api/v1/products/search")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_openapi_served() {
        let request = Request::get("/api/openapi.json").body(Body::empty()).unwrap();
        let (status, body) = send(test_router().await, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["info"]["title"], "Catalog Search API");
    }
}

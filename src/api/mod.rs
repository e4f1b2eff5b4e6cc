//! REST API layer: route handlers, DTOs, and router composition.
//!
//! Puzzle endpoints are mounted under `/api`; `/health` and the static
//! `/uploads` directory sit at the root.

pub mod dto;
pub mod handlers;
pub mod openapi;

use std::path::PathBuf;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::config::ServerConfig;

/// HTTP-level settings applied by [`build_app`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    /// Directory served under `/uploads`.
    pub upload_dir: PathBuf,
    /// Largest accepted request body, in bytes.
    pub max_upload_bytes: usize,
    /// Requests running longer than this get `408 Request Timeout`.
    pub request_timeout: Duration,
}

impl HttpSettings {
    /// Settings with the default body limit (10 MiB) and timeout (30 s).
    #[must_use]
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            max_upload_bytes: 10 * 1024 * 1024,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&ServerConfig> for HttpSettings {
    fn from(config: &ServerConfig) -> Self {
        Self {
            upload_dir: config.upload_dir.clone(),
            max_upload_bytes: config.max_upload_bytes,
            request_timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Builds the complete API router with all REST endpoints.
pub fn build_router() -> Router<AppState> {
    Router::new()
        .nest("/api", handlers::routes())
        .merge(handlers::system::routes())
}

/// Builds the full application: REST routes, static image serving, the
/// middleware stack from [`with_middleware`], and (with the `swagger-ui`
/// feature) the interactive API docs.
pub fn build_app(state: AppState, settings: &HttpSettings) -> Router {
    let router = build_router().nest_service("/uploads", ServeDir::new(&settings.upload_dir));

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", openapi::api_doc()),
    );

    with_middleware(router, settings).with_state(state)
}

/// Wraps `router` in tracing, CORS, request timeout and body limit layers.
pub fn with_middleware<S>(router: Router<S>, settings: &HttpSettings) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(TimeoutLayer::new(settings.request_timeout))
            .layer(DefaultBodyLimit::max(settings.max_upload_bytes)),
    )
}

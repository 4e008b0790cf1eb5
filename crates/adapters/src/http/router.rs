use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::middleware;
use axum::routing::get;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::health_handler::{healthz, readyz};
use super::metrics_handler::metrics;
use super::middleware::admission::admission_middleware;
use super::openapi::ApiDoc;
use super::query_handler::query;
use super::state::AppState;
use super::stats_handler::stats;

/// Maximum request body size (64 KiB). Every endpoint is a GET; anything
/// larger is junk.
const MAX_BODY_SIZE: usize = 64 * 1024;

/// Outer deadline across all routes, including handler time.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Preflight cache lifetime advertised to browsers.
const CORS_MAX_AGE: Duration = Duration::from_secs(300);

/// Build the Axum router with all routes.
///
/// Routes fall into two groups:
/// 1. **Ops** (no CORS): `/healthz`, `/readyz`, `/metrics`
/// 2. **API** (CORS when configured): `/api/v1/stats`, `/api/v1/query` —
///    the query route additionally passes through admission control
pub fn build_router(state: Arc<AppState>, swagger_ui: bool, cors_origin: Option<&str>) -> Router {
    let ops_routes = Router::new()
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        .route("/metrics", get(metrics));

    let query_routes = Router::new()
        .route("/api/v1/query", get(query))
        .layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            admission_middleware,
        ));

    let api_routes = {
        let r = Router::new()
            .route("/api/v1/stats", get(stats))
            .merge(query_routes)
            .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

        match cors_origin.and_then(cors_layer) {
            Some(cors) => r.layer(cors),
            None => r,
        }
    };

    let router = ops_routes
        .merge(api_routes)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT));

    let router = if swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    router.with_state(state)
}

/// CORS for browser callers: GET/OPTIONS with Content-Type and Accept,
/// from one configured origin (or any, for `*`). An unparseable origin
/// is logged and CORS is left off rather than half-configured.
fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let allow_origin = if origin == "*" {
        AllowOrigin::any()
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(e) => {
                tracing::warn!(error = %e, origin, "invalid CORS origin, headers disabled");
                return None;
            }
        }
    };

    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .max_age(CORS_MAX_AGE),
    )
}

use std::sync::Arc;

use application::admission_service::AdmissionService;
use application::search_service::SearchService;
use application::stats_refresh::StatsCache;
use infrastructure::metrics::ApiMetrics;

/// Shared application state for the REST API server.
///
/// Passed to Axum handlers via `State(Arc<AppState>)`.
pub struct AppState {
    pub metrics: Arc<ApiMetrics>,
    pub search_service: Arc<SearchService>,
    pub admission_service: Arc<AdmissionService>,
    pub stats_cache: Arc<StatsCache>,
}

impl AppState {
    pub fn new(
        metrics: Arc<ApiMetrics>,
        search_service: Arc<SearchService>,
        admission_service: Arc<AdmissionService>,
        stats_cache: Arc<StatsCache>,
    ) -> Self {
        Self {
            metrics,
            search_service,
            admission_service,
            stats_cache,
        }
    }
}

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;
use utoipa::ToSchema;

use super::state::AppState;

#[derive(Serialize, ToSchema)]
pub struct StatsResponse {
    /// Total rows in the domain table.
    pub domains: i64,
    /// Distinct eTLDs observed.
    pub etlds: i64,
}

/// `GET /api/v1/stats` — cached aggregate counts.
///
/// Served from the background-refreshed snapshot; never queries the store
/// on the request path. All zeros until the first refresh completes.
#[utoipa::path(
    get, path = "/api/v1/stats",
    tag = "Ledger",
    responses(
        (status = 200, description = "Aggregate ledger counts", body = StatsResponse),
    )
)]
pub async fn stats(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let snapshot = state.stats_cache.snapshot();
    Json(StatsResponse {
        domains: snapshot.domains,
        etlds: snapshot.etlds,
    })
}

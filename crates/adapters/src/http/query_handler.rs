use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use domain::search::entity::DomainRecord;

use super::error::ApiError;
use super::state::AppState;

// ── Query parameters DTO ────────────────────────────────────────────

#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Substring to match against domain names (3..=255 bytes).
    pub query: Option<String>,
    /// Resume before this `first_seen` timestamp (seconds since epoch,
    /// inclusive). Values <= 0 are treated as absent.
    pub from_time: Option<i64>,
    /// Exclude ids >= this value; only honored together with `from_time`.
    pub last_id: Option<u64>,
    /// Page size (default and max 1000; out-of-range values are clamped).
    pub limit: Option<i64>,
}

// ── Response DTOs ───────────────────────────────────────────────────

#[derive(Serialize, ToSchema)]
pub struct QueryResponse {
    pub results: Vec<DomainRecordBody>,
    /// Minimum `id` on this page; pass back as `last_id` for the next
    /// page. `u64::MAX` when the page is empty.
    pub last: u64,
}

#[derive(Serialize, ToSchema)]
pub struct DomainRecordBody {
    pub domain: String,
    pub etld: String,
    pub first_seen: i64,
    pub last_seen: i64,
    pub id: u64,
}

impl From<DomainRecord> for DomainRecordBody {
    fn from(r: DomainRecord) -> Self {
        Self {
            domain: r.domain,
            etld: r.etld,
            first_seen: r.first_seen,
            last_seen: r.last_seen,
            id: r.id,
        }
    }
}

// ── Handler ─────────────────────────────────────────────────────────

/// `GET /api/v1/query` — paginated substring search over the ledger.
#[utoipa::path(
    get, path = "/api/v1/query",
    tag = "Ledger",
    params(SearchParams),
    responses(
        (status = 200, description = "One page of matching records", body = QueryResponse),
        (status = 400, description = "Invalid filter or query failure (plain text)", content_type = "text/plain"),
        (status = 429, description = "Throttled (plain text)", content_type = "text/plain"),
    )
)]
pub async fn query(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<QueryResponse>, ApiError> {
    let filter = params.query.unwrap_or_default();
    let page = state
        .search_service
        .search(&filter, params.from_time, params.last_id, params.limit)
        .await?;

    Ok(Json(QueryResponse {
        results: page.records.into_iter().map(Into::into).collect(),
        last: page.last,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_serializes_with_wire_field_names() {
        let resp = QueryResponse {
            results: vec![DomainRecordBody {
                domain: "a.com.au".to_string(),
                etld: "com.au".to_string(),
                first_seen: 100,
                last_seen: 200,
                id: 7,
            }],
            last: 7,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["last"], 7);
        assert_eq!(json["results"][0]["domain"], "a.com.au");
        assert_eq!(json["results"][0]["etld"], "com.au");
        assert_eq!(json["results"][0]["first_seen"], 100);
        assert_eq!(json["results"][0]["last_seen"], 200);
        assert_eq!(json["results"][0]["id"], 7);
    }

    #[test]
    fn empty_page_sentinel_survives_json() {
        let resp = QueryResponse {
            results: vec![],
            last: u64::MAX,
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["last"], u64::MAX);
    }
}

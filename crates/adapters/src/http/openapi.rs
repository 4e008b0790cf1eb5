use utoipa::OpenApi;

use super::health_handler::{HealthResponse, ReadyResponse};
use super::query_handler::{DomainRecordBody, QueryResponse};
use super::stats_handler::StatsResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Domain Ledger API",
        description = "Read-only query API over the ledger of observed domain registrations."
    ),
    paths(
        super::query_handler::query,
        super::stats_handler::stats,
        super::health_handler::healthz,
        super::health_handler::readyz,
        super::metrics_handler::metrics,
    ),
    components(schemas(
        QueryResponse,
        DomainRecordBody,
        StatsResponse,
        HealthResponse,
        ReadyResponse,
    )),
    tags(
        (name = "Ledger", description = "Search and aggregate endpoints"),
        (name = "Health", description = "Liveness and readiness probes"),
        (name = "Observability", description = "Prometheus metrics"),
    )
)]
pub struct ApiDoc;

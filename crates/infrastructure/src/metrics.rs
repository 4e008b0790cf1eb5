use ports::secondary::metrics_port::{AdmissionMetrics, QueryMetrics, StatsMetrics};
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets_range};
use prometheus_client::registry::Registry;

// ── Label types ─────────────────────────────────────────────────────

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct DecisionLabels {
    pub decision: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ResultLabels {
    pub result: String,
}

// ── API metrics registry ────────────────────────────────────────────

/// Prometheus metrics registry for the query API.
///
/// All metric families use interior mutability (atomics), so recording
/// metrics only requires `&self`. The registry itself is NOT Clone —
/// wrap in `Arc` for multi-task sharing.
pub struct ApiMetrics {
    registry: Registry,
    pub queries_total: Family<OutcomeLabels, Counter>,
    pub query_duration_seconds: Histogram,
    pub admission_decisions_total: Family<DecisionLabels, Counter>,
    pub tracked_clients: Gauge,
    pub stats_refreshes_total: Family<ResultLabels, Counter>,
    pub ledger_domains: Gauge,
    pub ledger_etlds: Gauge,
}

impl ApiMetrics {
    /// Create a new metrics registry with all metrics registered under
    /// the `ledgerd` prefix.
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("ledgerd");

        let queries_total = Family::<OutcomeLabels, Counter>::default();
        registry.register(
            "queries",
            "Search queries by outcome (ok, invalid, failed)",
            queries_total.clone(),
        );

        // Exponential buckets from 1ms to 10s; the store deadline is 5s.
        let query_duration_seconds = Histogram::new(exponential_buckets_range(0.001, 10.0, 12));
        registry.register(
            "query_duration_seconds",
            "Store query latency in seconds",
            query_duration_seconds.clone(),
        );

        let admission_decisions_total = Family::<DecisionLabels, Counter>::default();
        registry.register(
            "admission_decisions",
            "Admission control decisions (admitted, throttled)",
            admission_decisions_total.clone(),
        );

        let tracked_clients = Gauge::default();
        registry.register(
            "tracked_clients",
            "Client IPs currently tracked by the admission engine",
            tracked_clients.clone(),
        );

        let stats_refreshes_total = Family::<ResultLabels, Counter>::default();
        registry.register(
            "stats_refreshes",
            "Stats cache refresh attempts (success, failure)",
            stats_refreshes_total.clone(),
        );

        let ledger_domains = Gauge::default();
        registry.register(
            "ledger_domains",
            "Total domain rows at the last successful refresh",
            ledger_domains.clone(),
        );

        let ledger_etlds = Gauge::default();
        registry.register(
            "ledger_etlds",
            "Distinct eTLDs at the last successful refresh",
            ledger_etlds.clone(),
        );

        Self {
            registry,
            queries_total,
            query_duration_seconds,
            admission_decisions_total,
            tracked_clients,
            stats_refreshes_total,
            ledger_domains,
            ledger_etlds,
        }
    }

    /// Encode all registered metrics to `OpenMetrics` text format.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        prometheus_client::encoding::text::encode(&mut buffer, &self.registry)
            .expect("encoding metrics to string should not fail");
        buffer
    }
}

impl Default for ApiMetrics {
    fn default() -> Self {
        Self::new()
    }
}

// ── Sub-trait implementations ──────────────────────────────────────

impl QueryMetrics for ApiMetrics {
    fn record_query(&self, outcome: &str) {
        self.queries_total
            .get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    fn observe_query_duration(&self, duration_seconds: f64) {
        self.query_duration_seconds.observe(duration_seconds);
    }
}

impl AdmissionMetrics for ApiMetrics {
    fn record_admission(&self, decision: &str) {
        self.admission_decisions_total
            .get_or_create(&DecisionLabels {
                decision: decision.to_string(),
            })
            .inc();
    }

    fn set_tracked_clients(&self, count: u64) {
        self.tracked_clients
            .set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

impl StatsMetrics for ApiMetrics {
    fn record_stats_refresh(&self, result: &str) {
        self.stats_refreshes_total
            .get_or_create(&ResultLabels {
                result: result.to_string(),
            })
            .inc();
    }

    fn set_ledger_counts(&self, domains: i64, etlds: i64) {
        self.ledger_domains.set(domains);
        self.ledger_etlds.set(etlds);
    }
}

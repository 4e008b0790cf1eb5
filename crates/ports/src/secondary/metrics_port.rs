// Focused sub-traits for recording Prometheus metrics, grouped by concern.
//
// All methods take `&self` because the underlying implementation uses
// atomic operations (interior mutability via `prometheus-client`).
//
// Default implementations are no-ops, allowing test mocks to implement
// only the sub-traits relevant to the service under test.

// ── Search query metrics ────────────────────────────────────────────

pub trait QueryMetrics: Send + Sync {
    /// Record a search query outcome: `ok`, `invalid`, or `failed`.
    fn record_query(&self, _outcome: &str) {}

    /// Observe a store query duration in seconds.
    fn observe_query_duration(&self, _duration_seconds: f64) {}
}

// ── Admission control metrics ───────────────────────────────────────

pub trait AdmissionMetrics: Send + Sync {
    /// Record an admission decision: `admitted` or `throttled`.
    fn record_admission(&self, _decision: &str) {}

    /// Set the number of client IPs currently tracked by the engine.
    fn set_tracked_clients(&self, _count: u64) {}
}

// ── Stats refresh metrics ───────────────────────────────────────────

pub trait StatsMetrics: Send + Sync {
    /// Record a stats refresh attempt: `success` or `failure`.
    fn record_stats_refresh(&self, _result: &str) {}

    /// Mirror the last good snapshot into gauges.
    fn set_ledger_counts(&self, _domains: i64, _etlds: i64) {}
}

// ── Composite super-trait ──────────────────────────────────────────

/// Unified metrics port composing all concern-specific sub-traits.
///
/// Services accept `Arc<dyn MetricsPort>` for full access. The sub-traits
/// provide default no-op implementations so that test mocks only need to
/// override the methods they care about.
pub trait MetricsPort: QueryMetrics + AdmissionMetrics + StatsMetrics {}

/// Blanket implementation: any type implementing all sub-traits
/// automatically implements `MetricsPort`.
impl<T> MetricsPort for T where T: QueryMetrics + AdmissionMetrics + StatsMetrics {}

use std::sync::Arc;
use std::time::{Duration, Instant};

use domain::common::error::LedgerError;
use domain::search::entity::SearchPage;
use domain::search::query::SearchQuery;
use ports::secondary::ledger_store::LedgerStore;
use ports::secondary::metrics_port::MetricsPort;

/// Application-level search service.
///
/// Validates caller input, runs the store query under a deadline, and
/// derives the continuation cursor. Store failure detail is logged here
/// and never reaches the caller.
pub struct SearchService {
    store: Arc<dyn LedgerStore>,
    metrics: Arc<dyn MetricsPort>,
    query_timeout: Duration,
}

impl SearchService {
    pub fn new(
        store: Arc<dyn LedgerStore>,
        metrics: Arc<dyn MetricsPort>,
        query_timeout: Duration,
    ) -> Self {
        Self {
            store,
            metrics,
            query_timeout,
        }
    }

    /// Run one paginated search. Returns `InvalidQuery` for bad input and
    /// the opaque `QueryFailed` for any store error or timeout.
    pub async fn search(
        &self,
        filter: &str,
        from_time: Option<i64>,
        last_id: Option<u64>,
        limit: Option<i64>,
    ) -> Result<SearchPage, LedgerError> {
        let query = match SearchQuery::parse(filter, from_time, last_id, limit) {
            Ok(query) => query,
            Err(e) => {
                self.metrics.record_query("invalid");
                return Err(e.into());
            }
        };

        let started = Instant::now();
        let result = tokio::time::timeout(self.query_timeout, self.store.search(&query)).await;
        self.metrics
            .observe_query_duration(started.elapsed().as_secs_f64());

        let records = match result {
            Ok(Ok(records)) => records,
            Ok(Err(e)) => {
                tracing::error!(error = %e, "store query failed");
                self.metrics.record_query("failed");
                return Err(LedgerError::QueryFailed);
            }
            Err(_) => {
                tracing::error!(
                    timeout_secs = self.query_timeout.as_secs(),
                    "store query timed out"
                );
                self.metrics.record_query("failed");
                return Err(LedgerError::QueryFailed);
            }
        };

        self.metrics.record_query("ok");
        Ok(SearchPage::from_records(records))
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use domain::common::error::LedgerError;
use domain::stats::entity::StatsSnapshot;
use ports::secondary::ledger_store::LedgerStore;
use ports::secondary::metrics_port::MetricsPort;
use tokio_util::sync::CancellationToken;

/// Shared cache of aggregate ledger counts.
///
/// The snapshot is replaced wholesale by the refresh task; on refresh
/// failure the previous snapshot is retained so readers keep seeing the
/// last good counts. `warm` flips once the first refresh succeeds and
/// gates readiness.
pub struct StatsCache {
    snapshot: RwLock<StatsSnapshot>,
    warm: AtomicBool,
}

impl StatsCache {
    pub fn new() -> Self {
        Self {
            snapshot: RwLock::new(StatsSnapshot::default()),
            warm: AtomicBool::new(false),
        }
    }

    /// Current snapshot; all zeros until the first successful refresh.
    pub fn snapshot(&self) -> StatsSnapshot {
        // The snapshot is Copy with no cross-field invariant a panicked
        // writer could break, so a poisoned lock is read through.
        *self
            .snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether at least one refresh has completed successfully.
    pub fn is_warm(&self) -> bool {
        self.warm.load(Ordering::Relaxed)
    }

    fn replace(&self, snapshot: StatsSnapshot) {
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = snapshot;
        self.warm.store(true, Ordering::Relaxed);
    }
}

impl Default for StatsCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Run both count queries and replace the cached snapshot only when both
/// succeed. Either failure leaves the cache untouched.
pub async fn refresh_once(
    store: &dyn LedgerStore,
    cache: &StatsCache,
    metrics: &Arc<dyn MetricsPort>,
) -> Result<(), LedgerError> {
    let counts = async {
        let domains = store.count_domains().await?;
        let etlds = store.count_etlds().await?;
        Ok::<_, domain::search::error::StoreError>((domains, etlds))
    }
    .await;

    match counts {
        Ok((domains, etlds)) => {
            cache.replace(StatsSnapshot { domains, etlds });
            metrics.record_stats_refresh("success");
            metrics.set_ledger_counts(domains, etlds);
            Ok(())
        }
        Err(e) => {
            metrics.record_stats_refresh("failure");
            Err(LedgerError::StatsRefreshFailed(e.to_string()))
        }
    }
}

/// Background refresh loop: one immediate pass, then one per interval
/// until cancelled. Failed passes are logged and the loop keeps going.
pub async fn run_refresh_loop(
    store: Arc<dyn LedgerStore>,
    cache: Arc<StatsCache>,
    metrics: Arc<dyn MetricsPort>,
    refresh_interval: Duration,
    cancel_token: CancellationToken,
) {
    if let Err(e) = refresh_once(store.as_ref(), &cache, &metrics).await {
        tracing::warn!(error = %e, "initial stats refresh failed");
    }

    let mut interval = tokio::time::interval(refresh_interval);
    // First tick completes immediately; the initial pass already ran.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                tracing::info!("stats refresh loop stopping");
                return;
            }
            _ = interval.tick() => {
                if let Err(e) = refresh_once(store.as_ref(), &cache, &metrics).await {
                    tracing::warn!(error = %e, "stats refresh failed, keeping previous snapshot");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;

    use domain::search::entity::DomainRecord;
    use domain::search::error::StoreError;
    use domain::search::query::SearchQuery;
    use ports::test_utils::{FailingStore, MemoryLedgerStore, NoopMetrics, make_record};

    fn noop() -> Arc<dyn MetricsPort> {
        Arc::new(NoopMetrics)
    }

    #[tokio::test]
    async fn cache_starts_cold_and_zeroed() {
        let cache = StatsCache::new();
        assert!(!cache.is_warm());
        assert_eq!(cache.snapshot(), StatsSnapshot::default());
    }

    #[tokio::test]
    async fn successful_refresh_warms_cache() {
        let store = MemoryLedgerStore::new(vec![
            make_record("a.com.au", 1, 100, 100),
            make_record("b.net.au", 2, 200, 200),
        ]);
        let cache = StatsCache::new();

        refresh_once(&store, &cache, &noop()).await.unwrap();

        assert!(cache.is_warm());
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.domains, 2);
        assert_eq!(snapshot.etlds, 2);
    }

    #[tokio::test]
    async fn failed_refresh_retains_previous_snapshot() {
        let cache = StatsCache::new();
        let good = MemoryLedgerStore::new(vec![make_record("a.com.au", 1, 100, 100)]);
        refresh_once(&good, &cache, &noop()).await.unwrap();

        let err = refresh_once(&FailingStore, &cache, &noop())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::StatsRefreshFailed(_)));

        // Last good counts survive the failure.
        assert!(cache.is_warm());
        assert_eq!(cache.snapshot().domains, 1);
    }

    /// Domain count succeeds, eTLD count fails.
    struct HalfFailingStore(MemoryLedgerStore);

    impl LedgerStore for HalfFailingStore {
        fn search<'a>(
            &'a self,
            query: &'a SearchQuery,
        ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainRecord>, StoreError>> + Send + 'a>>
        {
            self.0.search(query)
        }

        fn count_domains(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
            self.0.count_domains()
        }

        fn count_etlds(
            &self,
        ) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
            FailingStore.count_etlds()
        }
    }

    #[tokio::test]
    async fn partial_count_failure_retains_full_snapshot() {
        let cache = StatsCache::new();
        let good = MemoryLedgerStore::new(vec![make_record("a.com.au", 1, 100, 100)]);
        refresh_once(&good, &cache, &noop()).await.unwrap();

        let half = HalfFailingStore(MemoryLedgerStore::new(vec![
            make_record("a.com.au", 1, 100, 100),
            make_record("b.net.au", 2, 200, 200),
        ]));
        assert!(refresh_once(&half, &cache, &noop()).await.is_err());

        // Neither count moved, even though one query succeeded.
        let snapshot = cache.snapshot();
        assert_eq!(snapshot.domains, 1);
        assert_eq!(snapshot.etlds, 1);
    }

    #[tokio::test]
    async fn failed_refresh_never_warms_cold_cache() {
        let cache = StatsCache::new();
        assert!(refresh_once(&FailingStore, &cache, &noop()).await.is_err());
        assert!(!cache.is_warm());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_refreshes_once_per_interval_and_stops_on_cancel() {
        let store: Arc<dyn LedgerStore> =
            Arc::new(MemoryLedgerStore::new(vec![make_record("a.com.au", 1, 100, 100)]));
        let cache = Arc::new(StatsCache::new());
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(run_refresh_loop(
            Arc::clone(&store),
            Arc::clone(&cache),
            noop(),
            Duration::from_secs(60),
            cancel.clone(),
        ));

        // The immediate first pass warms the cache without advancing time.
        tokio::task::yield_now().await;
        assert!(cache.is_warm());

        tokio::time::advance(Duration::from_secs(61)).await;
        tokio::task::yield_now().await;

        cancel.cancel();
        handle.await.unwrap();
    }
}

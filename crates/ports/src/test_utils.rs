use std::collections::BTreeSet;
use std::future::Future;
use std::pin::Pin;

use domain::search::entity::DomainRecord;
use domain::search::error::StoreError;
use domain::search::query::{Cursor, SearchQuery};

use crate::secondary::ledger_store::LedgerStore;
use crate::secondary::metrics_port::{AdmissionMetrics, QueryMetrics, StatsMetrics};

/// No-op implementation of all metrics sub-traits for use in tests.
///
/// All methods inherit the default no-op implementations from the sub-traits.
pub struct NoopMetrics;

impl QueryMetrics for NoopMetrics {}
impl AdmissionMetrics for NoopMetrics {}
impl StatsMetrics for NoopMetrics {}

/// In-memory `LedgerStore` with SQL `LIKE` semantics, so search behavior
/// is testable without PostgreSQL.
pub struct MemoryLedgerStore {
    rows: Vec<DomainRecord>,
}

impl MemoryLedgerStore {
    pub fn new(rows: Vec<DomainRecord>) -> Self {
        Self { rows }
    }

    fn matching(&self, query: &SearchQuery) -> Vec<DomainRecord> {
        let mut rows: Vec<DomainRecord> = self
            .rows
            .iter()
            .filter(|r| like_match(query.pattern.as_bytes(), r.domain.as_bytes()))
            .filter(|r| match query.cursor {
                Cursor::Latest => true,
                Cursor::Before { from_time } => r.first_seen <= from_time,
                Cursor::BeforeExcluding { from_time, last_id } => {
                    r.first_seen <= from_time && r.id < last_id
                }
            })
            .cloned()
            .collect();

        rows.sort_by(|a, b| {
            b.first_seen
                .cmp(&a.first_seen)
                .then(b.last_seen.cmp(&a.last_seen))
                .then(b.id.cmp(&a.id))
        });
        rows.truncate(usize::try_from(query.limit).unwrap_or(usize::MAX));
        rows
    }
}

impl LedgerStore for MemoryLedgerStore {
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainRecord>, StoreError>> + Send + 'a>> {
        let rows = self.matching(query);
        Box::pin(async move { Ok(rows) })
    }

    fn count_domains(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        let count = self.rows.len() as i64;
        Box::pin(async move { Ok(count) })
    }

    fn count_etlds(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        let etlds: BTreeSet<&str> = self.rows.iter().map(|r| r.etld.as_str()).collect();
        let count = etlds.len() as i64;
        Box::pin(async move { Ok(count) })
    }
}

/// Store double whose every operation fails, for error-path and
/// stats-retention tests.
pub struct FailingStore;

impl LedgerStore for FailingStore {
    fn search<'a>(
        &'a self,
        _query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainRecord>, StoreError>> + Send + 'a>> {
        Box::pin(async { Err(StoreError::Backend("injected failure".to_string())) })
    }

    fn count_domains(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        Box::pin(async { Err(StoreError::Backend("injected failure".to_string())) })
    }

    fn count_etlds(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        Box::pin(async { Err(StoreError::Backend("injected failure".to_string())) })
    }
}

/// SQL `LIKE` matching over bytes: `%` matches any run (including empty),
/// `_` matches exactly one byte, everything else matches literally.
fn like_match(pattern: &[u8], text: &[u8]) -> bool {
    match pattern.split_first() {
        None => text.is_empty(),
        Some((b'%', rest)) => (0..=text.len()).any(|i| like_match(rest, &text[i..])),
        Some((b'_', rest)) => !text.is_empty() && like_match(rest, &text[1..]),
        Some((c, rest)) => text.first() == Some(c) && like_match(rest, &text[1..]),
    }
}

/// Convenience constructor for test rows.
pub fn make_record(domain: &str, id: u64, first_seen: i64, last_seen: i64) -> DomainRecord {
    DomainRecord {
        domain: domain.to_string(),
        etld: domain.split_once('.').map_or("", |(_, tld)| tld).to_string(),
        first_seen,
        last_seen,
        id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── LIKE matcher ─────────────────────────────────────────────────

    #[test]
    fn like_substring() {
        assert!(like_match(b"%a.com%", b"a.com.au"));
        assert!(like_match(b"%com%", b"a.com.au"));
        assert!(!like_match(b"%xyz%", b"a.com.au"));
    }

    #[test]
    fn like_underscore_is_single_byte() {
        assert!(like_match(b"%a_c%", b"xabcx"));
        assert!(!like_match(b"%a_c%", b"xacx"));
    }

    #[test]
    fn like_percent_matches_empty_run() {
        assert!(like_match(b"%abc%", b"abc"));
        assert!(like_match(b"%%", b""));
    }

    #[test]
    fn like_literal_without_wildcards() {
        assert!(like_match(b"abc", b"abc"));
        assert!(!like_match(b"abc", b"abcd"));
    }

    // ── MemoryLedgerStore ────────────────────────────────────────────

    fn store() -> MemoryLedgerStore {
        MemoryLedgerStore::new(vec![
            make_record("a.com.au", 1, 100, 100),
            make_record("b.com.au", 2, 200, 200),
            make_record("a.net.au", 3, 200, 200),
        ])
    }

    #[tokio::test]
    async fn search_orders_by_triple_desc() {
        let query = SearchQuery::parse("a.", None, None, Some(10)).unwrap();
        let rows = store().search(&query).await.unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[tokio::test]
    async fn search_applies_cursor_bounds() {
        let query = SearchQuery::parse(".au", Some(200), Some(3), Some(10)).unwrap();
        let rows = store().search(&query).await.unwrap();
        let ids: Vec<u64> = rows.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn counts_match_rows() {
        let s = store();
        assert_eq!(s.count_domains().await.unwrap(), 3);
        assert_eq!(s.count_etlds().await.unwrap(), 2); // com.au, net.au
    }

    #[tokio::test]
    async fn failing_store_fails() {
        let query = SearchQuery::parse("abc", None, None, None).unwrap();
        assert!(FailingStore.search(&query).await.is_err());
        assert!(FailingStore.count_domains().await.is_err());
    }
}

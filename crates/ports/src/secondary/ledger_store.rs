use std::future::Future;
use std::pin::Pin;

use domain::search::entity::DomainRecord;
use domain::search::error::StoreError;
use domain::search::query::SearchQuery;

/// Secondary port over the relational domain store. Read-only.
///
/// Uses `Pin<Box<dyn Future>>` return types (instead of RPITIT) so the
/// trait is dyn-compatible and can be used as `Arc<dyn LedgerStore>`.
pub trait LedgerStore: Send + Sync {
    /// Fetch one page of records matching `query`, ordered by
    /// `(first_seen DESC, last_seen DESC, id DESC)`.
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainRecord>, StoreError>> + Send + 'a>>;

    /// Total number of rows in the domain table.
    fn count_domains(&self)
    -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>>;

    /// Number of distinct eTLDs observed.
    fn count_etlds(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>>;
}

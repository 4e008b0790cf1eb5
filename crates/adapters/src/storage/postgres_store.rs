use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use domain::search::entity::DomainRecord;
use domain::search::error::StoreError;
use domain::search::query::{Cursor, SearchQuery};
use ports::secondary::ledger_store::LedgerStore;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// How long to wait for the initial pool connection before failing startup.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// PostgreSQL-backed `LedgerStore` over the scanner's `domains` table.
///
/// All access is read-only. Filter text travels exclusively through bind
/// parameters; it is never interpolated into SQL.
pub struct PgLedgerStore {
    pool: PgPool,
}

/// Row shape of the `domains` table. `id` is a positive BIGINT sequence
/// value, widened to `u64` on conversion.
#[derive(sqlx::FromRow)]
struct DomainRow {
    domain: String,
    etld: String,
    first_seen: i64,
    last_seen: i64,
    id: i64,
}

impl From<DomainRow> for DomainRecord {
    fn from(row: DomainRow) -> Self {
        Self {
            domain: row.domain,
            etld: row.etld,
            first_seen: row.first_seen,
            last_seen: row.last_seen,
            id: u64::try_from(row.id).unwrap_or_default(),
        }
    }
}

impl PgLedgerStore {
    /// Connect a pool against `dsn`. Connection failure at startup is the
    /// only fatal store error; everything later degrades per request.
    pub async fn connect(dsn: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(CONNECT_TIMEOUT)
            .connect(dsn)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }
}

const SEARCH_LATEST: &str = "SELECT domain, etld, first_seen, last_seen, id FROM domains \
     WHERE domain LIKE $1 \
     ORDER BY first_seen DESC, last_seen DESC, id DESC LIMIT $2";

const SEARCH_BEFORE: &str = "SELECT domain, etld, first_seen, last_seen, id FROM domains \
     WHERE domain LIKE $1 AND first_seen <= $2 \
     ORDER BY first_seen DESC, last_seen DESC, id DESC LIMIT $3";

const SEARCH_BEFORE_EXCLUDING: &str =
    "SELECT domain, etld, first_seen, last_seen, id FROM domains \
     WHERE domain LIKE $1 AND first_seen <= $2 AND id < $3 \
     ORDER BY first_seen DESC, last_seen DESC, id DESC LIMIT $4";

const COUNT_DOMAINS: &str = "SELECT COUNT(*) FROM domains";

const COUNT_ETLDS: &str = "SELECT COUNT(*) FROM (SELECT DISTINCT etld FROM domains) AS temp";

impl LedgerStore for PgLedgerStore {
    fn search<'a>(
        &'a self,
        query: &'a SearchQuery,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<DomainRecord>, StoreError>> + Send + 'a>> {
        Box::pin(async move {
            let rows: Vec<DomainRow> = match query.cursor {
                Cursor::Latest => {
                    sqlx::query_as(SEARCH_LATEST)
                        .bind(&query.pattern)
                        .bind(query.limit)
                        .fetch_all(&self.pool)
                        .await
                }
                Cursor::Before { from_time } => {
                    sqlx::query_as(SEARCH_BEFORE)
                        .bind(&query.pattern)
                        .bind(from_time)
                        .bind(query.limit)
                        .fetch_all(&self.pool)
                        .await
                }
                Cursor::BeforeExcluding { from_time, last_id } => {
                    sqlx::query_as(SEARCH_BEFORE_EXCLUDING)
                        .bind(&query.pattern)
                        .bind(from_time)
                        .bind(i64::try_from(last_id).unwrap_or(i64::MAX))
                        .bind(query.limit)
                        .fetch_all(&self.pool)
                        .await
                }
            }
            .map_err(|e| StoreError::Backend(e.to_string()))?;

            Ok(rows.into_iter().map(Into::into).collect())
        })
    }

    fn count_domains(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as(COUNT_DOMAINS)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(count)
        })
    }

    fn count_etlds(&self) -> Pin<Box<dyn Future<Output = Result<i64, StoreError>> + Send + '_>> {
        Box::pin(async move {
            let (count,): (i64,) = sqlx::query_as(COUNT_ETLDS)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            Ok(count)
        })
    }
}

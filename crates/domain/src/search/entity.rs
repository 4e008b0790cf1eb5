use serde::{Deserialize, Serialize};

/// A single observed domain registration, as stored by the scanner.
///
/// `id` is a strictly increasing row identifier assigned at insertion.
/// Insertion order does not necessarily match timestamp order (backfilled
/// rows may carry older timestamps), which is why pagination keys on the
/// full `(first_seen, last_seen, id)` tuple rather than `id` alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    /// Registered domain name, stored lowercase.
    pub domain: String,
    /// Effective top-level domain derived from `domain` (e.g. `com.au`).
    pub etld: String,
    /// First observation timestamp, seconds since epoch.
    pub first_seen: i64,
    /// Most recent observation timestamp; `last_seen >= first_seen`.
    pub last_seen: i64,
    pub id: u64,
}

/// One page of search results plus the cursor for the next page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchPage {
    pub records: Vec<DomainRecord>,
    /// Minimum `id` among `records`; `u64::MAX` for an empty page.
    /// Callers pass this back as `last_id` (with the final record's
    /// `first_seen` as `from_time`) to fetch the next page.
    pub last: u64,
}

impl SearchPage {
    /// Build a page from fetched rows, deriving the continuation cursor.
    pub fn from_records(records: Vec<DomainRecord>) -> Self {
        let last = records.iter().map(|r| r.id).min().unwrap_or(u64::MAX);
        Self { records, last }
    }
}

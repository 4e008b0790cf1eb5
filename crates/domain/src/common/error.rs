use thiserror::Error;

use crate::search::error::{SearchError, StoreError};

/// Top-level error taxonomy for the ledger query service.
///
/// Only `InvalidQuery` carries caller-visible detail. Store failures are
/// collapsed into the opaque `QueryFailed` so backend error text never
/// reaches a client.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("{0}")]
    InvalidQuery(String),

    #[error("Query failed :(")]
    QueryFailed,

    #[error("Throttled")]
    Throttled,

    #[error("stats refresh failed: {0}")]
    StatsRefreshFailed(String),
}

impl From<SearchError> for LedgerError {
    fn from(err: SearchError) -> Self {
        Self::InvalidQuery(err.to_string())
    }
}

impl From<StoreError> for LedgerError {
    fn from(_err: StoreError) -> Self {
        Self::QueryFailed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_error_to_invalid_query() {
        let e: LedgerError = SearchError::TooShort.into();
        assert!(matches!(e, LedgerError::InvalidQuery(_)));
        assert_eq!(e.to_string(), "Query must be at least 3 characters");
    }

    #[test]
    fn too_long_to_invalid_query() {
        let e: LedgerError = SearchError::TooLong.into();
        assert_eq!(e.to_string(), "Query too long");
    }

    #[test]
    fn store_error_is_opaque() {
        let e: LedgerError = StoreError::Backend("relation does not exist".to_string()).into();
        assert!(matches!(e, LedgerError::QueryFailed));
        // Backend detail must never leak into the caller-visible message.
        assert_eq!(e.to_string(), "Query failed :(");
    }

    #[test]
    fn throttled_message_is_fixed() {
        assert_eq!(LedgerError::Throttled.to_string(), "Throttled");
    }
}

use thiserror::Error;

/// Validation errors for the search filter.
///
/// Messages are part of the wire contract (returned verbatim in 400
/// responses), so they are fixed strings rather than formatted detail.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SearchError {
    #[error("Query too long")]
    TooLong,

    #[error("Query must be at least 3 characters")]
    TooShort,
}

/// Errors from the backing store. Logged internally, never shown to callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store query failed: {0}")]
    Backend(String),

    #[error("store connection failed: {0}")]
    Connection(String),
}

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::common::error::LedgerError;

/// Standard API error type.
///
/// This API's error contract is plain text, not JSON: the body is exactly
/// the caller-visible message, with `text/plain` supplied by axum's
/// `(StatusCode, String)` response. Clients match on these strings.
#[derive(Debug)]
pub enum ApiError {
    /// Invalid caller input; carries the specific validation message.
    BadRequest { message: String },
    /// Opaque query failure. The real cause is logged server-side only.
    QueryFailed,
    /// Admission control rejected the request.
    Throttled,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            Self::QueryFailed => (
                StatusCode::BAD_REQUEST,
                LedgerError::QueryFailed.to_string(),
            ),
            Self::Throttled => (
                StatusCode::TOO_MANY_REQUESTS,
                LedgerError::Throttled.to_string(),
            ),
        };
        (status, message).into_response()
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::InvalidQuery(message) => Self::BadRequest { message },
            LedgerError::Throttled => Self::Throttled,
            // Refresh failures never surface through a handler, but the
            // conversion must be total; collapse to the opaque failure.
            LedgerError::QueryFailed | LedgerError::StatsRefreshFailed(_) => Self::QueryFailed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::search::error::SearchError;
    use http_body_util::BodyExt;

    async fn response_text(resp: Response) -> String {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn bad_request_body_is_exact_message() {
        let err = ApiError::from(LedgerError::from(SearchError::TooShort));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_text(resp).await,
            "Query must be at least 3 characters"
        );
    }

    #[tokio::test]
    async fn too_long_body() {
        let err = ApiError::from(LedgerError::from(SearchError::TooLong));
        let resp = err.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_text(resp).await, "Query too long");
    }

    #[tokio::test]
    async fn query_failed_is_400_with_fixed_body() {
        let resp = ApiError::from(LedgerError::QueryFailed).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response_text(resp).await, "Query failed :(");
    }

    #[tokio::test]
    async fn throttled_is_429() {
        let resp = ApiError::from(LedgerError::Throttled).into_response();
        assert_eq!(resp.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response_text(resp).await, "Throttled");
    }

    #[tokio::test]
    async fn error_body_is_plain_text() {
        let resp = ApiError::Throttled.into_response();
        let content_type = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.starts_with("text/plain"));
    }
}

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;

use super::super::error::ApiError;
use super::super::state::AppState;

/// Axum middleware enforcing per-IP admission control on the routes it
/// wraps. The client identity is the peer address from `ConnectInfo`;
/// proxy headers are deliberately not consulted (they are spoofable).
pub async fn admission_middleware(
    State(state): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    state.admission_service.check(addr.ip())?;
    Ok(next.run(request).await)
}

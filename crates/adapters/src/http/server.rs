use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio_rustls::rustls::ServerConfig;

use super::router::build_router;
use super::state::AppState;
use super::tls::TlsListener;

/// Run the REST API HTTP server on the given bind address and port.
///
/// When `tls_config` is `Some`, the server terminates TLS (HTTPS). Both
/// paths serve with connect info because admission control keys on the
/// peer address. The server shuts down gracefully when `shutdown`
/// resolves, draining in-flight connections before returning.
pub async fn run_http_server(
    state: Arc<AppState>,
    bind_address: &str,
    port: u16,
    swagger_ui: bool,
    cors_origin: Option<&str>,
    tls_config: Option<Arc<ServerConfig>>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let router = build_router(state, swagger_ui, cors_origin);
    let listener = tokio::net::TcpListener::bind(format!("{bind_address}:{port}")).await?;
    let app = router.into_make_service_with_connect_info::<SocketAddr>();

    if let Some(tls) = tls_config {
        // `tap_io` with a no-op closure is what lets `SocketAddr` satisfy
        // axum's `Connected` bound for a custom listener.
        use axum::serve::ListenerExt;
        let tls_listener = TlsListener::new(listener, tls).tap_io(|_| {});
        tracing::info!(%bind_address, port, "HTTPS API server listening");
        axum::serve(tls_listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
    } else {
        tracing::info!(%bind_address, port, "HTTP API server listening");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;
    }

    Ok(())
}

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use adapters::http::server::run_http_server;
use adapters::http::state::AppState;
use adapters::http::tls::load_rustls_config;
use adapters::storage::postgres_store::PgLedgerStore;
use application::admission_service::AdmissionService;
use application::search_service::SearchService;
use application::stats_refresh::{StatsCache, run_refresh_loop};
use domain::admission::engine::AdmissionEngine;
use infrastructure::config::LedgerConfig;
use infrastructure::constants::{GRACEFUL_SHUTDOWN_TIMEOUT, QUERY_TIMEOUT};
use infrastructure::logging::init_logging;
use infrastructure::metrics::ApiMetrics;
use ports::secondary::ledger_store::LedgerStore;
use ports::secondary::metrics_port::MetricsPort;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{Cli, parse_listen};

/// Run the service startup sequence and block until shutdown.
pub async fn run(cli: &Cli) -> anyhow::Result<()> {
    // ── 1. Load config and apply overrides ──────────────────────────
    let config_path = Path::new(&cli.config);
    let mut config = if config_path.exists() {
        LedgerConfig::load_raw(config_path)?
    } else {
        LedgerConfig::default()
    };

    if let Some(ref dsn) = cli.dsn {
        config.database.dsn = dsn.clone();
    }
    if let Some(ref listen) = cli.listen {
        let (host, port) = parse_listen(listen)?;
        config.http.bind_address = host;
        config.http.port = port;
    }
    if let Some(ref origin) = cli.cors_origin {
        config.http.cors_origin = Some(origin.clone());
    }
    config.validate()?;

    // ── 2. Initialize logging ───────────────────────────────────────
    // CLI flags take precedence over config file
    let log_level = cli.log_level.unwrap_or(config.service.log_level);
    let log_format = cli.log_format.unwrap_or(config.service.log_format);
    // The root span's service fields appear in every subsequent log entry.
    let _root_span = init_logging(log_level, log_format)?.entered();

    info!(
        config_path = %cli.config,
        log_level = log_level.as_str(),
        log_format = log_format.as_str(),
        "domain ledger API starting"
    );
    if !config_path.exists() {
        warn!(config_path = %cli.config, "config file not found, using defaults with overrides");
    }
    tracing::debug!(config = ?config.sanitized(), "effective configuration");

    // ── 3. Connect the database pool ─────────────────────────────────
    // The only fatal store error; per-request failures degrade later.
    let store: Arc<dyn LedgerStore> = Arc::new(
        PgLedgerStore::connect(&config.database.dsn, config.database.max_connections)
            .await
            .map_err(|e| anyhow::anyhow!("database connection failed: {e}"))?,
    );
    info!(
        max_connections = config.database.max_connections,
        "database pool connected"
    );

    // ── 4. Initialize metrics ────────────────────────────────────────
    let metrics = Arc::new(ApiMetrics::new());
    let metrics_port: Arc<dyn MetricsPort> = Arc::clone(&metrics) as Arc<dyn MetricsPort>;

    // ── 5. Build application services ────────────────────────────────
    let search_service = Arc::new(SearchService::new(
        Arc::clone(&store),
        Arc::clone(&metrics_port),
        QUERY_TIMEOUT,
    ));

    let admission_enabled = config.admission.enabled && !cli.no_throttle;
    if cli.no_throttle {
        warn!("admission control disabled by --no-throttle");
    }
    let engine = AdmissionEngine::new(config.admission_policy(), config.admission.max_tracked_ips);
    let admission_service = Arc::new(AdmissionService::new(
        engine,
        admission_enabled,
        Arc::clone(&metrics_port),
    ));
    info!(
        enabled = admission_enabled,
        burst = config.admission.burst,
        refill_interval_secs = config.admission.refill_interval_secs,
        max_tracked_ips = config.admission.max_tracked_ips,
        "admission control configured"
    );

    let stats_cache = Arc::new(StatsCache::new());

    let app_state = Arc::new(AppState::new(
        Arc::clone(&metrics),
        search_service,
        admission_service,
        Arc::clone(&stats_cache),
    ));

    // ── 6. Create cancellation token ─────────────────────────────────
    let cancel_token = CancellationToken::new();
    let _signal_watcher = crate::shutdown::spawn_signal_watcher(cancel_token.clone());

    // ── 7. Spawn the stats refresh loop ──────────────────────────────
    let refresh_interval = config.stats_refresh_interval();
    info!(
        refresh_interval_secs = refresh_interval.as_secs(),
        "stats refresh loop starting"
    );
    let stats_handle = tokio::spawn(run_refresh_loop(
        Arc::clone(&store),
        Arc::clone(&stats_cache),
        Arc::clone(&metrics_port),
        refresh_interval,
        cancel_token.clone(),
    ));

    // ── 8. Load TLS configuration ────────────────────────────────────
    let tls_config = if config.http.tls.enabled {
        let rustls_cfg = load_rustls_config(
            Path::new(&config.http.tls.cert_path),
            Path::new(&config.http.tls.key_path),
        )?;
        info!(
            cert_path = %config.http.tls.cert_path,
            "TLS enabled for HTTP server"
        );
        Some(rustls_cfg)
    } else {
        None
    };

    // ── 9. Spawn the HTTP API server ──────────────────────────────────
    let http_bind = config.http.bind_address.clone();
    let http_port = config.http.port;
    let http_swagger_ui = config.http.swagger_ui;
    let http_cors = config.http.cors_origin.clone();
    let state_for_server = Arc::clone(&app_state);
    let http_shutdown = cancel_token.clone();
    let http_handle = tokio::spawn(async move {
        if let Err(e) = run_http_server(
            state_for_server,
            &http_bind,
            http_port,
            http_swagger_ui,
            http_cors.as_deref(),
            tls_config,
            http_shutdown.cancelled_owned(),
        )
        .await
        {
            tracing::error!(error = %e, "HTTP API server failed");
        }
    });

    // ── 10. Ready — wait for cancellation ────────────────────────────
    info!("service ready, waiting for shutdown signal");
    cancel_token.cancelled().await;

    // ── 11. Ordered shutdown sequence ─────────────────────────────────
    info!("shutdown phase 1: draining HTTP connections");
    let _ = tokio::time::timeout(GRACEFUL_SHUTDOWN_TIMEOUT, http_handle).await;

    info!("shutdown phase 2: stopping stats refresh loop");
    let _ = tokio::time::timeout(Duration::from_secs(1), stats_handle).await;

    info!("service stopped");
    Ok(())
}

use tokio::signal;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Spawn a watcher that cancels `token` when the process receives
/// SIGINT or SIGTERM. The returned handle completes once the signal
/// has been handled.
pub fn spawn_signal_watcher(token: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("shutdown signal received");
        token.cancel();
    })
}

#[cfg(unix)]
async fn wait_for_signal() {
    use signal::unix::{SignalKind, signal};

    let mut term = match signal(SignalKind::terminate()) {
        Ok(term) => term,
        Err(e) => {
            tracing::error!(error = %e, "SIGTERM handler unavailable, listening for Ctrl+C only");
            return ctrl_c().await;
        }
    };

    tokio::select! {
        () = ctrl_c() => {}
        _ = term.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = signal::ctrl_c().await {
        // Without a working handler the watcher can never fire; park
        // instead of cancelling a healthy process.
        tracing::error!(error = %e, "Ctrl+C handler failed");
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn watcher_waits_without_cancelling() {
        let token = CancellationToken::new();
        let handle = spawn_signal_watcher(token.clone());

        tokio::task::yield_now().await;
        assert!(!token.is_cancelled());

        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
    }
}

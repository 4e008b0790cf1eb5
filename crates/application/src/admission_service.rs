use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use domain::admission::engine::AdmissionEngine;
use domain::common::error::LedgerError;
use ports::secondary::metrics_port::MetricsPort;

/// Application-level admission service.
///
/// Wraps the per-IP token bucket engine in a mutex for shared access from
/// request handlers. The engine itself is clock-agnostic; this layer
/// supplies `Instant::now()`.
pub struct AdmissionService {
    engine: Mutex<AdmissionEngine>,
    metrics: Arc<dyn MetricsPort>,
    enabled: bool,
}

impl AdmissionService {
    pub fn new(engine: AdmissionEngine, enabled: bool, metrics: Arc<dyn MetricsPort>) -> Self {
        Self {
            engine: Mutex::new(engine),
            metrics,
            enabled,
        }
    }

    /// Admit or throttle one request from `ip`.
    ///
    /// A disabled service admits everything without touching the engine.
    pub fn check(&self, ip: IpAddr) -> Result<(), LedgerError> {
        if !self.enabled {
            return Ok(());
        }

        let (admitted, tracked) = {
            let mut engine = self.engine.lock().map_err(|_| {
                tracing::error!("admission engine lock poisoned");
                LedgerError::QueryFailed
            })?;
            let admitted = engine.admit(ip, Instant::now());
            (admitted, engine.tracked_clients())
        };
        self.metrics.set_tracked_clients(tracked as u64);

        if admitted {
            self.metrics.record_admission("admitted");
            Ok(())
        } else {
            self.metrics.record_admission("throttled");
            tracing::debug!(client = %ip, "request throttled");
            Err(LedgerError::Throttled)
        }
    }
}

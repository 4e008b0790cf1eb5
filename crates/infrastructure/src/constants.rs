use std::time::Duration;

// ── Defaults ───────────────────────────────────────────────────────

pub const DEFAULT_CONFIG_PATH: &str = "/etc/ledgerd/config.yaml";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

/// Cap on tracked client IPs in the admission engine.
pub const DEFAULT_MAX_TRACKED_IPS: usize = 65_536;

// ── Timeouts and intervals ─────────────────────────────────────────

pub const GRACEFUL_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Deadline for a single store search on the request path.
pub const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Default period between stats cache refreshes.
pub const DEFAULT_STATS_REFRESH_SECS: u64 = 60;

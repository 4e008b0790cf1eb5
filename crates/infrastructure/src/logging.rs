use tracing::Span;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::{ConfigError, LogFormat, LogLevel};

/// Install the global tracing subscriber and return the service root
/// span. Callers enter the span for the life of the process so that
/// `service.name` and `service.version` decorate every log entry.
///
/// `RUST_LOG` overrides the configured `level` when set. Must be called
/// exactly once at startup.
pub fn init_logging(level: LogLevel, format: LogFormat) -> Result<Span, ConfigError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    // JSON is flattened for log aggregators; text is for development.
    let output = match format {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_target(true)
            .with_thread_ids(false)
            .with_ansi(false)
            .boxed(),
        LogFormat::Text => fmt::layer().pretty().with_target(true).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .init();

    Ok(root_span())
}

fn root_span() -> Span {
    tracing::info_span!(
        "service",
        service.name = "ledgerd",
        service.version = env!("CARGO_PKG_VERSION"),
    )
}

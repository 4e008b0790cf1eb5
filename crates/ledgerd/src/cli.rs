use clap::{Parser, Subcommand};
use infrastructure::config::{LogFormat, LogLevel};
use infrastructure::constants::DEFAULT_CONFIG_PATH;

#[derive(Parser, Debug)]
#[command(
    name = "ledgerd",
    about = "Read-only query API over the domain registration ledger",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: String,

    /// Log level override (takes precedence over config file)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Log format: json (default, production) or text (development)
    #[arg(long)]
    pub log_format: Option<LogFormat>,

    /// PostgreSQL DSN (overrides config file)
    #[arg(long, env = "LEDGER_WEB_DSN")]
    pub dsn: Option<String>,

    /// Listen address as `host:port` or `:port` (overrides config file)
    #[arg(long, env = "LEDGER_WEB_LISTEN")]
    pub listen: Option<String>,

    /// Allowed CORS origin, `*` for any (overrides config file)
    #[arg(long, env = "LEDGER_WEB_CORSORIGIN")]
    pub cors_origin: Option<String>,

    /// Disable per-IP admission control entirely
    #[arg(long, env = "LEDGER_WEB_NOTHROTTLE")]
    pub no_throttle: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Display version information
    Version,
}

pub fn parse() -> Cli {
    Cli::parse()
}

/// Split a `host:port` listen string. An empty host (`:8080`) binds all
/// interfaces.
pub fn parse_listen(listen: &str) -> anyhow::Result<(String, u16)> {
    let (host, port) = listen
        .rsplit_once(':')
        .ok_or_else(|| anyhow::anyhow!("invalid listen address '{listen}': expected host:port"))?;
    let port: u16 = port
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid listen port in '{listen}'"))?;
    let host = if host.is_empty() {
        "0.0.0.0".to_string()
    } else {
        host.to_string()
    };
    Ok((host, port))
}

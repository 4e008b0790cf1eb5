pub mod error;
pub mod health_handler;
pub mod metrics_handler;
pub mod middleware;
pub mod openapi;
pub mod query_handler;
pub mod router;
pub mod server;
pub mod state;
pub mod stats_handler;
pub mod tls;

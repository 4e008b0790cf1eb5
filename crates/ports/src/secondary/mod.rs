pub mod ledger_store;
pub mod metrics_port;

//! Collaborator abstraction trait definitions

mod broker_client;
mod log_sink;
mod network_probe;

pub use broker_client::{AdminSession, BrokerClient};
pub use log_sink::{LogRecord, LogSink, Severity};
pub use network_probe::NetworkProbe;

//! Diagnosis engine services

mod broker_adapter;
pub mod diagnosis;
mod diagnostic_log;
mod orchestrator;

pub use broker_adapter::BrokerAdapter;
pub use diagnostic_log::{map_client_level, DiagnosticLog, LogFacadeSink, LOG_TARGET};
pub use orchestrator::ProbeOrchestrator;

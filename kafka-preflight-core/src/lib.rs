//! Kafka Preflight Core Library
//!
//! Layered connectivity diagnosis for Kafka clusters:
//! - DNS and TCP reachability per configured broker
//! - protocol handshake / authentication against the cluster
//! - a lightweight admin call (topic listing)
//!
//! Failures at every layer are classified into root-cause hypotheses and
//! reported through an injected log sink. Collaborators (network probe,
//! protocol client, log transport) are abstracted through traits so the
//! engine stays independent of tokio sockets, librdkafka and the logger.

pub mod error;
pub mod services;
pub mod traits;
pub mod types;
pub mod utils;

#[cfg(test)]
mod test_utils;

// Re-export common types
pub use error::{ErrorCategory, PreflightError, PreflightResult};
pub use services::{DiagnosticLog, LogFacadeSink, ProbeOrchestrator};
pub use traits::{AdminSession, BrokerClient, LogSink, NetworkProbe};

//! Network reachability probe for Kafka Preflight
//!
//! DNS resolution through the host's system resolver (hickory) followed by a
//! bounded raw TCP connect, per broker endpoint. Failures are returned as
//! classified probe results; nothing here returns an error.

mod services;

pub use services::NetProbeService;

//! Kafka admin client for Kafka Preflight
//!
//! Implements the [`BrokerClient`](kafka_preflight_core::traits::BrokerClient)
//! seam on top of librdkafka (`rdkafka`):
//!
//! - connect: build an admin client from the probe configuration and prove the
//!   handshake with a metadata request, retrying transient failures
//! - list topics: cluster metadata request, topic names only
//! - disconnect: tear the client down off the async runtime
//!
//! librdkafka's own log lines are routed through the diagnostic log with a
//! fixed level mapping, never through a global logger configuration.

mod client;
mod config;
mod context;
mod error;
mod retry;

pub use client::{KafkaAdminSession, KafkaBrokerClient};
pub use config::client_properties;
pub use context::{convert_log_level, ProbeClientContext};

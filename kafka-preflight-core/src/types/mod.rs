//! Type definitions

mod config;
mod endpoint;
mod probe;
mod verdict;

pub use config::{
    ProbeConfig, RetryPolicy, SaslCredentials, SaslMechanism, SecurityProtocol,
    DEFAULT_CLIENT_ID, DEFAULT_CONNECTION_TIMEOUT, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use endpoint::{BrokerEndpoint, DEFAULT_KAFKA_PORT};
pub use probe::{EndpointProbe, ProbeFailure, ProbeLayer, ProbeResult};
pub use verdict::{Diagnosis, HealthVerdict, Hypothesis};

//! Network reachability probe abstraction

use std::time::Duration;

use async_trait::async_trait;

use crate::types::{BrokerEndpoint, EndpointProbe};

/// DNS + TCP reachability check for a single endpoint.
///
/// Implementations never fail: unreachability is reported as failed
/// [`ProbeResult`](crate::types::ProbeResult)s. The DNS step always runs before
/// the TCP step and a DNS failure never skips TCP. Any socket opened must be
/// closed before `probe` returns, whatever the outcome.
#[async_trait]
pub trait NetworkProbe: Send + Sync {
    async fn probe(&self, endpoint: &BrokerEndpoint, timeout: Duration) -> EndpointProbe;
}

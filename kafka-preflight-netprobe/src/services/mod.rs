//! [`NetworkProbe`] implementation backed by hickory and tokio sockets.

mod dns;
mod resolver;
mod tcp;

use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use kafka_preflight_core::traits::NetworkProbe;
use kafka_preflight_core::types::{BrokerEndpoint, EndpointProbe};

/// Probes one endpoint at a time: DNS first, then TCP regardless of the DNS outcome.
///
/// ```rust,no_run
/// use std::time::Duration;
/// use kafka_preflight_core::traits::NetworkProbe;
/// use kafka_preflight_core::types::BrokerEndpoint;
/// use kafka_preflight_netprobe::NetProbeService;
/// # async fn demo() {
/// let probe = NetProbeService::new();
/// let outcome = probe
///     .probe(&BrokerEndpoint::new("kafka-1", 9092), Duration::from_secs(4))
///     .await;
/// println!("dns ok: {}, tcp ok: {}", outcome.dns.ok, outcome.tcp.ok);
/// # }
/// ```
pub struct NetProbeService {
    resolver: TokioResolver,
}

impl NetProbeService {
    /// Use the host system DNS configuration.
    pub fn new() -> Self {
        Self {
            resolver: resolver::build_system_resolver(),
        }
    }
}

impl Default for NetProbeService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NetworkProbe for NetProbeService {
    async fn probe(&self, endpoint: &BrokerEndpoint, timeout: Duration) -> EndpointProbe {
        let dns = dns::resolve(&self.resolver, endpoint, timeout).await;
        let tcp = tcp::connect(endpoint, timeout).await;
        EndpointProbe { dns, tcp }
    }
}

//! Broker protocol client abstraction

use async_trait::async_trait;

use crate::error::PreflightResult;
use crate::types::{BrokerEndpoint, ProbeConfig};

/// Admin-capable protocol client.
///
/// Security and authentication fields of [`ProbeConfig`] are handed to the
/// underlying client as-is; credential correctness is only judged by the
/// handshake outcome. Connect failures should be
/// [`PreflightError::Protocol`](crate::error::PreflightError::Protocol).
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Open an authenticated admin session against the cluster.
    async fn connect_admin(
        &self,
        config: &ProbeConfig,
        endpoints: &[BrokerEndpoint],
    ) -> PreflightResult<Box<dyn AdminSession>>;
}

/// A live admin session.
#[async_trait]
pub trait AdminSession: Send + Sync {
    /// List topic names visible to this principal. Ordering is irrelevant.
    ///
    /// Failures should be [`PreflightError::Application`](crate::error::PreflightError::Application).
    async fn list_topics(&self) -> PreflightResult<Vec<String>>;

    /// Release the session.
    async fn disconnect(self: Box<Self>) -> PreflightResult<()>;
}

//! Broker client adapter
//!
//! Drives a [`BrokerClient`] through connect → list → disconnect with hard
//! deadlines, and normalises failures into the handshake / application
//! categories the orchestrator reports.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio::time::timeout;

use crate::error::{PreflightError, PreflightResult};
use crate::services::DiagnosticLog;
use crate::traits::{AdminSession, BrokerClient};
use crate::types::{BrokerEndpoint, ProbeConfig};

/// Upper bound for disconnect; the session is abandoned after this.
const DISCONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Worst-case duration of a connect including client-side retries.
fn connect_deadline(config: &ProbeConfig) -> Duration {
    let attempts = config.retry.max_attempts.max(1);
    let per_attempt = config.connection_timeout + config.request_timeout;
    per_attempt * attempts + config.retry.max_backoff * attempts
}

/// Wraps the external protocol client behind the three calls the engine needs.
pub struct BrokerAdapter {
    client: Arc<dyn BrokerClient>,
    log: DiagnosticLog,
}

impl BrokerAdapter {
    pub fn new(client: Arc<dyn BrokerClient>, log: DiagnosticLog) -> Self {
        Self { client, log }
    }

    /// Open an admin session. Every failure comes back as a protocol error.
    pub async fn connect_admin(
        &self,
        config: &ProbeConfig,
        endpoints: &[BrokerEndpoint],
    ) -> PreflightResult<Box<dyn AdminSession>> {
        let deadline = connect_deadline(config);
        log::debug!(
            "[Preflight] Connecting admin client to {} broker(s), deadline {deadline:?}",
            endpoints.len()
        );

        match timeout(deadline, self.client.connect_admin(config, endpoints)).await {
            Ok(Ok(session)) => Ok(session),
            Ok(Err(e)) => Err(PreflightError::Protocol(e.message().to_string())),
            Err(_) => Err(PreflightError::Protocol(format!(
                "admin connect timed out after {}ms",
                deadline.as_millis()
            ))),
        }
    }

    /// List topics on an open session. Every failure comes back as an application error.
    pub async fn list_topics(
        &self,
        session: &dyn AdminSession,
        config: &ProbeConfig,
    ) -> PreflightResult<Vec<String>> {
        let deadline = config.request_timeout + config.connection_timeout;

        match timeout(deadline, session.list_topics()).await {
            Ok(Ok(topics)) => Ok(topics),
            Ok(Err(e)) => Err(PreflightError::Application(e.message().to_string())),
            Err(_) => Err(PreflightError::Application(format!(
                "topic listing timed out after {}ms",
                deadline.as_millis()
            ))),
        }
    }

    /// Best-effort release. Failures are logged at WARN and swallowed.
    pub async fn disconnect(&self, session: Box<dyn AdminSession>) {
        match timeout(DISCONNECT_TIMEOUT, session.disconnect()).await {
            Ok(Ok(())) => log::debug!("[Preflight] Admin session closed"),
            Ok(Err(e)) => self.log.warn(
                "admin disconnect failed",
                json!({ "error": e.message() }),
            ),
            Err(_) => self.log.warn(
                "admin disconnect timed out",
                json!({ "timeout_ms": u64::try_from(DISCONNECT_TIMEOUT.as_millis()).unwrap_or(u64::MAX) }),
            ),
        }
    }
}

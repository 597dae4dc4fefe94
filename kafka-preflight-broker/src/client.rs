//! rdkafka-backed [`BrokerClient`]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use kafka_preflight_core::traits::{AdminSession, BrokerClient};
use kafka_preflight_core::types::{BrokerEndpoint, ProbeConfig};
use kafka_preflight_core::{DiagnosticLog, PreflightError, PreflightResult};
use rdkafka::admin::AdminClient;

use crate::config::{client_config, client_properties, describe};
use crate::context::ProbeClientContext;
use crate::error::protocol_error;
use crate::retry::with_backoff;

type Admin = AdminClient<ProbeClientContext>;

/// Opens admin sessions against a Kafka cluster through librdkafka.
pub struct KafkaBrokerClient {
    log: DiagnosticLog,
}

impl KafkaBrokerClient {
    /// Client log lines are forwarded to `log`.
    pub fn new(log: DiagnosticLog) -> Self {
        Self { log }
    }
}

#[async_trait]
impl BrokerClient for KafkaBrokerClient {
    async fn connect_admin(
        &self,
        config: &ProbeConfig,
        endpoints: &[BrokerEndpoint],
    ) -> PreflightResult<Box<dyn AdminSession>> {
        let properties = client_properties(config, endpoints);
        log::debug!("[Kafka] Admin client config: {}", describe(&properties));

        let log = match &config.credentials {
            Some(credentials) => self.log.clone().with_secret(credentials.password.clone()),
            None => self.log.clone(),
        };
        let context = ProbeClientContext::new(log.clone(), config.verbose);
        let admin: Admin = client_config(&properties, config.verbose)
            .create_with_context(context)
            .map_err(|e| protocol_error(&e, None))?;
        let admin = Arc::new(admin);

        // Admin clients connect lazily; a metadata round-trip proves the
        // transport, TLS and SASL layers all work.
        let handshake_timeout = config.connection_timeout + config.request_timeout;
        let topics = with_backoff(&config.retry, &log, || {
            fetch_topic_names(admin.clone(), handshake_timeout)
        })
        .await;

        match topics {
            Ok(topics) => {
                log::debug!("[Kafka] Handshake complete, {} topic(s) visible", topics.len());
                admin.inner().context().clear_bootstrap_errors();
                Ok(Box::new(KafkaAdminSession {
                    admin,
                    request_timeout: config.request_timeout,
                }))
            }
            Err(e) => {
                release(admin).await;
                Err(e)
            }
        }
    }
}

/// Live admin client. Dropping it without [`AdminSession::disconnect`] still
/// releases it, but blocks the dropping thread while librdkafka shuts down.
pub struct KafkaAdminSession {
    admin: Arc<Admin>,
    request_timeout: Duration,
}

#[async_trait]
impl AdminSession for KafkaAdminSession {
    async fn list_topics(&self) -> PreflightResult<Vec<String>> {
        fetch_topic_names(self.admin.clone(), self.request_timeout).await
    }

    async fn disconnect(self: Box<Self>) -> PreflightResult<()> {
        let admin = self.admin;
        tokio::task::spawn_blocking(move || drop(admin))
            .await
            .map_err(|e| PreflightError::Protocol(format!("admin client shutdown failed: {e}")))
    }
}

/// Cluster metadata request, run off the async runtime.
async fn fetch_topic_names(admin: Arc<Admin>, timeout: Duration) -> PreflightResult<Vec<String>> {
    let joined = tokio::task::spawn_blocking(move || {
        let client = admin.inner();
        match client.fetch_metadata(None, timeout) {
            Ok(metadata) => {
                log::trace!(
                    "[Kafka] Metadata from broker {} ({}): {} broker(s)",
                    metadata.orig_broker_id(),
                    metadata.orig_broker_name(),
                    metadata.brokers().len()
                );
                Ok(metadata
                    .topics()
                    .iter()
                    .map(|topic| topic.name().to_string())
                    .collect())
            }
            Err(e) => Err(protocol_error(&e, client.context().take_last_error())),
        }
    })
    .await;

    joined.map_err(|e| PreflightError::Protocol(format!("metadata task failed: {e}")))?
}

/// Tear down a client that never became a session.
async fn release(admin: Arc<Admin>) {
    if let Err(e) = tokio::task::spawn_blocking(move || drop(admin)).await {
        log::debug!("[Kafka] Releasing admin client failed: {e}");
    }
}

//! librdkafka client configuration

use std::time::Duration;

use kafka_preflight_core::types::{BrokerEndpoint, ProbeConfig};
use kafka_preflight_core::utils::redact::mask_secret;
use rdkafka::config::{ClientConfig, RDKafkaLogLevel};

/// librdkafka bounds for `socket.connection.setup.timeout.ms`.
const SETUP_TIMEOUT_RANGE: (u128, u128) = (1_000, 2_147_483_647);
/// librdkafka bounds for `socket.timeout.ms`.
const SOCKET_TIMEOUT_RANGE: (u128, u128) = (10, 300_000);
/// librdkafka upper bound for the backoff properties.
const BACKOFF_MAX_MS: u128 = 3_600_000;

fn millis(duration: Duration, (min, max): (u128, u128)) -> String {
    duration.as_millis().clamp(min, max).to_string()
}

/// librdkafka properties for an admin client, in insertion order.
///
/// Security and SASL values are passed through as given; SASL properties are
/// only present when a full credential pair is configured.
pub fn client_properties(
    config: &ProbeConfig,
    endpoints: &[BrokerEndpoint],
) -> Vec<(&'static str, String)> {
    let bootstrap = endpoints
        .iter()
        .map(BrokerEndpoint::address)
        .collect::<Vec<_>>()
        .join(",");
    let max_backoff = config.retry.max_backoff.as_millis().clamp(1, BACKOFF_MAX_MS);
    let initial_backoff = config.retry.initial_backoff.as_millis().clamp(1, max_backoff);

    let mut properties = vec![
        ("bootstrap.servers", bootstrap),
        ("client.id", config.client_id.clone()),
        ("security.protocol", config.security_protocol().to_string()),
        (
            "socket.connection.setup.timeout.ms",
            millis(config.connection_timeout, SETUP_TIMEOUT_RANGE),
        ),
        (
            "socket.timeout.ms",
            millis(config.request_timeout, SOCKET_TIMEOUT_RANGE),
        ),
        ("reconnect.backoff.ms", initial_backoff.to_string()),
        ("reconnect.backoff.max.ms", max_backoff.to_string()),
        ("retry.backoff.ms", initial_backoff.to_string()),
        ("retry.backoff.max.ms", max_backoff.to_string()),
    ];

    if let Some(credentials) = &config.credentials {
        properties.push(("sasl.mechanism", config.sasl_mechanism.to_string()));
        properties.push(("sasl.username", credentials.username.clone()));
        properties.push(("sasl.password", credentials.password.clone()));
    }

    properties
}

/// Build the rdkafka configuration from a property list.
pub(crate) fn client_config(properties: &[(&'static str, String)], verbose: bool) -> ClientConfig {
    let mut client_config = ClientConfig::new();
    for (key, value) in properties {
        client_config.set(*key, value);
    }
    // Below-WARN lines are dropped downstream unless verbose; don't produce them at all.
    client_config.set_log_level(if verbose {
        RDKafkaLogLevel::Debug
    } else {
        RDKafkaLogLevel::Warning
    });
    client_config
}

/// `key=value` listing for debug logs with credentials masked.
pub(crate) fn describe(properties: &[(&'static str, String)]) -> String {
    properties
        .iter()
        .map(|(key, value)| {
            if key.starts_with("sasl.") && *key != "sasl.mechanism" {
                format!("{key}={}", mask_secret(value))
            } else {
                format!("{key}={value}")
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

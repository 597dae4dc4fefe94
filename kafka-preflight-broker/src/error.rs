//! librdkafka error mapping

use kafka_preflight_core::PreflightError;
use rdkafka::error::KafkaError;

/// Message for a failed client call, with the last broker-level error appended
/// when it adds information the call's own error lacks.
pub(crate) fn describe(error: &KafkaError, last_broker_error: Option<String>) -> String {
    let message = error.to_string();
    match last_broker_error {
        Some(last) if !last.is_empty() && !message.contains(&last) => {
            format!("{message} (last broker error: {last})")
        }
        _ => message,
    }
}

/// Handshake-level failure.
pub(crate) fn protocol_error(error: &KafkaError, last_broker_error: Option<String>) -> PreflightError {
    PreflightError::Protocol(describe(error, last_broker_error))
}

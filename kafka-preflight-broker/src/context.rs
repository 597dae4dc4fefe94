//! librdkafka client context

use std::sync::{Mutex, PoisonError};

use kafka_preflight_core::DiagnosticLog;
use rdkafka::config::RDKafkaLogLevel;
use rdkafka::error::KafkaError;
use rdkafka::types::RDKafkaErrorCode;
use rdkafka::ClientContext;

/// Map a librdkafka syslog-style level onto the `log` crate's levels.
pub fn convert_log_level(level: RDKafkaLogLevel) -> log::Level {
    match level {
        RDKafkaLogLevel::Emerg
        | RDKafkaLogLevel::Alert
        | RDKafkaLogLevel::Critical
        | RDKafkaLogLevel::Error => log::Level::Error,
        RDKafkaLogLevel::Warning => log::Level::Warn,
        RDKafkaLogLevel::Notice | RDKafkaLogLevel::Info => log::Level::Info,
        RDKafkaLogLevel::Debug => log::Level::Debug,
    }
}

/// Client context carrying the diagnostic log and the last broker-level error.
///
/// librdkafka reports connection problems (resolve failures, TLS and SASL
/// errors) through the error callback while the request that triggered them
/// only fails with a generic timeout. Keeping the last one lets the caller
/// attach the real cause to that failure.
pub struct ProbeClientContext {
    log: DiagnosticLog,
    verbose: bool,
    last_error: Mutex<Option<String>>,
}

impl ProbeClientContext {
    pub fn new(log: DiagnosticLog, verbose: bool) -> Self {
        Self {
            log,
            verbose,
            last_error: Mutex::new(None),
        }
    }

    /// Take the most recent broker error, leaving none behind.
    pub fn take_last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// Forget errors seen while bootstrapping once a metadata round-trip has
    /// succeeded, so they are not blamed for later failures.
    pub fn clear_bootstrap_errors(&self) {
        if let Some(stale) = self.take_last_error() {
            log::debug!("[Kafka] Discarding bootstrap error after successful handshake: {stale}");
        }
    }

    fn record_error(&self, reason: String, generic: bool) {
        let mut last = self
            .last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // "N/N brokers are down" follows the failure that caused it.
        if generic && last.is_some() {
            return;
        }
        *last = Some(reason);
    }
}

impl ClientContext for ProbeClientContext {
    fn log(&self, level: RDKafkaLogLevel, fac: &str, message: &str) {
        self.log
            .client_log(convert_log_level(level), self.verbose, fac, message);
    }

    fn error(&self, error: KafkaError, reason: &str) {
        log::debug!("[Kafka] Client error: {error}, reason: {reason}");
        let generic = matches!(
            error,
            KafkaError::Global(RDKafkaErrorCode::AllBrokersDown)
        );
        let reason = if reason.is_empty() {
            error.to_string()
        } else {
            reason.to_string()
        };
        self.record_error(reason, generic);
    }
}

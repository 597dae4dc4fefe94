//! Diagnostic log sink adapter
//!
//! Every operator-facing record goes through [`DiagnosticLog`], which merges the
//! shared context fields, redacts credentials and stack traces, and only then
//! hands the record to the injected [`LogSink`].

use std::sync::Arc;

use serde_json::{Map, Value};

use crate::traits::{LogRecord, LogSink, Severity};
use crate::utils::redact::{redact_value, scrub_secrets};

/// `log` target used by [`LogFacadeSink`].
pub const LOG_TARGET: &str = "kafka_preflight";

/// Map an underlying client log level to a diagnostic severity.
///
/// ERROR→ERROR and WARN→WARN always; everything else becomes INFO only when
/// `verbose` is set and is suppressed otherwise.
pub fn map_client_level(level: log::Level, verbose: bool) -> Option<Severity> {
    match level {
        log::Level::Error => Some(Severity::Error),
        log::Level::Warn => Some(Severity::Warn),
        log::Level::Info | log::Level::Debug | log::Level::Trace => {
            verbose.then_some(Severity::Info)
        }
    }
}

/// Redacting front-end to a [`LogSink`]. Cheap to clone.
#[derive(Clone)]
pub struct DiagnosticLog {
    sink: Arc<dyn LogSink>,
    secrets: Arc<Vec<String>>,
    fields: Map<String, Value>,
}

impl DiagnosticLog {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self {
            sink,
            secrets: Arc::new(Vec::new()),
            fields: Map::new(),
        }
    }

    /// Register a secret that must never appear verbatim in any record.
    #[must_use]
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        let secret = secret.into();
        if !secret.is_empty() {
            Arc::make_mut(&mut self.secrets).push(secret);
        }
        self
    }

    /// Attach a field to every record emitted from this log.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Emit one record. `context` should be a JSON object; any other value is
    /// nested under a `value` key.
    pub fn emit(&self, severity: Severity, message: &str, context: Value) {
        let mut merged = self.fields.clone();
        match context {
            Value::Object(map) => merged.extend(map),
            Value::Null => {}
            other => {
                merged.insert("value".to_string(), other);
            }
        }

        let mut context = Value::Object(merged);
        redact_value(&mut context, &self.secrets);
        let Value::Object(context) = context else {
            return;
        };

        self.sink.emit(&LogRecord {
            severity,
            message: scrub_secrets(message, &self.secrets),
            context,
        });
    }

    pub fn info(&self, message: &str, context: Value) {
        self.emit(Severity::Info, message, context);
    }

    pub fn warn(&self, message: &str, context: Value) {
        self.emit(Severity::Warn, message, context);
    }

    pub fn error(&self, message: &str, context: Value) {
        self.emit(Severity::Error, message, context);
    }

    /// Forward a log line produced by the underlying protocol client.
    pub fn client_log(&self, level: log::Level, verbose: bool, facility: &str, message: &str) {
        if let Some(severity) = map_client_level(level, verbose) {
            self.emit(
                severity,
                message,
                serde_json::json!({ "source": "client", "facility": facility }),
            );
        }
    }
}

/// Sink forwarding records to the `log` facade under [`LOG_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFacadeSink;

impl LogSink for LogFacadeSink {
    fn emit(&self, record: &LogRecord) {
        let level: log::Level = record.severity.into();
        if record.context.is_empty() {
            log::log!(target: LOG_TARGET, level, "{}", record.message);
        } else {
            log::log!(
                target: LOG_TARGET,
                level,
                "{} {}",
                record.message,
                Value::Object(record.context.clone())
            );
        }
    }
}

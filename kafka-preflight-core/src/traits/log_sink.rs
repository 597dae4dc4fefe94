//! Diagnostic record sink abstraction

use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};

/// Severity of a diagnostic record. Fixed set; not configurable per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Info => Self::Info,
            Severity::Warn => Self::Warn,
            Severity::Error => Self::Error,
        }
    }
}

/// One already-redacted diagnostic record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogRecord {
    pub severity: Severity,
    pub message: String,
    pub context: Map<String, Value>,
}

/// Log sink Trait
///
/// Platform implementations:
/// - `LogFacadeSink`: forwards to the `log` facade (default for the binary)
/// - `RecordingSink`: in-memory capture for tests
///
/// Implementations receive records after redaction and must not re-introduce
/// secrets; they are only responsible for transport and formatting.
pub trait LogSink: Send + Sync {
    fn emit(&self, record: &LogRecord);
}

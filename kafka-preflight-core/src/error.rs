//! Unified error type definition

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Preflight error type
///
/// Only [`Configuration`](Self::Configuration) ends a diagnostic run early; every other
/// variant is caught where it originates and turned into a failed probe result.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "code", content = "details")]
pub enum PreflightError {
    /// Empty or malformed broker list
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// DNS or TCP failure against a single endpoint
    #[error("Network error: {0}")]
    Network(String),

    /// Handshake / authentication failure against the cluster
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Administrative call failed after a successful handshake
    #[error("Application error: {0}")]
    Application(String),
}

impl PreflightError {
    /// Raw message without the category prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Configuration(msg)
            | Self::Network(msg)
            | Self::Protocol(msg)
            | Self::Application(msg) => msg,
        }
    }

    /// Error category used in probe results and verdicts.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Network(_) => ErrorCategory::Network,
            Self::Protocol(_) => ErrorCategory::Protocol,
            Self::Application(_) => ErrorCategory::Application,
        }
    }

    /// Whether it is expected behavior, used for log classification.
    ///
    /// Level `warn` should be used when returning `true` and level `error` when returning `false`.
    /// **Please update this method simultaneously when new variants are added.**
    #[must_use]
    pub fn is_expected(&self) -> bool {
        self.category().is_expected()
    }
}

/// Error taxonomy, one per failing layer family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Configuration,
    Network,
    Protocol,
    Application,
}

impl ErrorCategory {
    /// Single-endpoint network trouble is routine in a partially healthy
    /// cluster; everything else is reported as an error.
    #[must_use]
    pub fn is_expected(self) -> bool {
        match self {
            Self::Network => true,
            Self::Configuration | Self::Protocol | Self::Application => false,
        }
    }
}

/// Preflight Result type alias
pub type PreflightResult<T> = std::result::Result<T, PreflightError>;

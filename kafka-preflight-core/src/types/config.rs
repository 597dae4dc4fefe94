//! Probe configuration types

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::PreflightResult;
use crate::types::BrokerEndpoint;
use crate::utils::redact::mask_secret;

/// Default client identifier sent to the cluster.
pub const DEFAULT_CLIENT_ID: &str = "kafka-preflight";
/// Default bound for a single TCP reachability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(4000);
/// Default bound for establishing the admin connection.
pub const DEFAULT_CONNECTION_TIMEOUT: Duration = Duration::from_millis(10_000);
/// Default bound for a single admin request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// SASL mechanism selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaslMechanism {
    /// SASL/PLAIN.
    #[default]
    Plain,
    /// SCRAM with SHA-256.
    ScramSha256,
    /// SCRAM with SHA-512.
    ScramSha512,
}

impl fmt::Display for SaslMechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "PLAIN"),
            Self::ScramSha256 => write!(f, "SCRAM-SHA-256"),
            Self::ScramSha512 => write!(f, "SCRAM-SHA-512"),
        }
    }
}

impl FromStr for SaslMechanism {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "plain" => Ok(Self::Plain),
            "scram-sha-256" | "scram-256" | "scram_sha_256" => Ok(Self::ScramSha256),
            "scram-sha-512" | "scram-512" | "scram_sha_512" => Ok(Self::ScramSha512),
            _ => Err(format!(
                "unsupported SASL mechanism '{s}' (expected plain, scram-sha-256 or scram-sha-512)"
            )),
        }
    }
}

/// Transport security as librdkafka names it, derived from the TLS flag and
/// whether credentials were supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityProtocol {
    Plaintext,
    Ssl,
    SaslPlaintext,
    SaslSsl,
}

impl fmt::Display for SecurityProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plaintext => write!(f, "PLAINTEXT"),
            Self::Ssl => write!(f, "SSL"),
            Self::SaslPlaintext => write!(f, "SASL_PLAINTEXT"),
            Self::SaslSsl => write!(f, "SASL_SSL"),
        }
    }
}

/// Username / password pair. `Debug` never prints the raw password.
#[derive(Clone, PartialEq, Eq)]
pub struct SaslCredentials {
    pub username: String,
    pub password: String,
}

impl SaslCredentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Build a pair only when both halves are present and non-empty.
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Option<Self> {
        match (username, password) {
            (Some(u), Some(p)) if !u.is_empty() && !p.is_empty() => Some(Self::new(u, p)),
            _ => None,
        }
    }
}

impl fmt::Debug for SaslCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaslCredentials")
            .field("username", &self.username)
            .field("password", &mask_secret(&self.password))
            .finish()
    }
}

/// Client-side retry policy for the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1).
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(300),
            max_backoff: Duration::from_millis(5000),
        }
    }
}

/// Immutable probe configuration, built once from external input.
///
/// The broker list is kept raw; [`ProbeConfig::endpoints`] parses it so that a bad
/// list surfaces as a configuration verdict rather than a construction failure.
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    pub brokers: String,
    pub client_id: String,
    pub ssl: bool,
    pub credentials: Option<SaslCredentials>,
    pub sasl_mechanism: SaslMechanism,
    pub connection_timeout: Duration,
    pub request_timeout: Duration,
    pub probe_timeout: Duration,
    pub retry: RetryPolicy,
    pub verbose: bool,
}

impl ProbeConfig {
    /// Configuration with defaults for everything except the broker list.
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            client_id: DEFAULT_CLIENT_ID.to_string(),
            ssl: false,
            credentials: None,
            sasl_mechanism: SaslMechanism::default(),
            connection_timeout: DEFAULT_CONNECTION_TIMEOUT,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            retry: RetryPolicy::default(),
            verbose: false,
        }
    }

    #[must_use]
    pub fn with_ssl(mut self, ssl: bool) -> Self {
        self.ssl = ssl;
        self
    }

    #[must_use]
    pub fn with_credentials(mut self, credentials: Option<SaslCredentials>) -> Self {
        self.credentials = credentials;
        self
    }

    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Parse the configured broker list (may be empty).
    pub fn endpoints(&self) -> PreflightResult<Vec<BrokerEndpoint>> {
        BrokerEndpoint::parse_list(&self.brokers)
    }

    pub fn security_protocol(&self) -> SecurityProtocol {
        match (self.ssl, self.credentials.is_some()) {
            (false, false) => SecurityProtocol::Plaintext,
            (true, false) => SecurityProtocol::Ssl,
            (false, true) => SecurityProtocol::SaslPlaintext,
            (true, true) => SecurityProtocol::SaslSsl,
        }
    }
}

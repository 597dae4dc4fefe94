//! Command-line and environment configuration

use std::time::Duration;

use clap::Parser;
use kafka_preflight_core::types::{
    ProbeConfig, RetryPolicy, SaslCredentials, SaslMechanism, DEFAULT_CLIENT_ID,
};

/// One-shot Kafka connectivity diagnosis.
///
/// Checks DNS, TCP, the protocol handshake and a topic listing, then reports
/// which layer failed and why.
#[derive(Debug, Parser)]
#[command(name = "kafka-preflight", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
pub struct Args {
    /// Comma-separated `host:port` list
    #[arg(long, env = "KAFKA_BROKERS", default_value = "")]
    pub brokers: String,

    /// Client identifier sent to the cluster
    #[arg(long, env = "KAFKA_CLIENT_ID", default_value = DEFAULT_CLIENT_ID)]
    pub client_id: String,

    /// SASL username (used only together with a password)
    #[arg(long, env = "KAFKA_USERNAME")]
    pub username: Option<String>,

    /// SASL password (used only together with a username)
    #[arg(long, env = "KAFKA_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Connect over TLS
    #[arg(long, env = "KAFKA_SSL")]
    pub ssl: bool,

    /// plain, scram-sha-256 or scram-sha-512
    #[arg(long, env = "KAFKA_SASL_MECHANISM", default_value = "plain")]
    pub sasl_mechanism: SaslMechanism,

    /// Bound for establishing a broker connection
    #[arg(long, env = "KAFKA_CONNECTION_TIMEOUT_MS", default_value_t = 10_000)]
    pub connection_timeout_ms: u64,

    /// Bound for a single admin request
    #[arg(long, env = "KAFKA_REQUEST_TIMEOUT_MS", default_value_t = 30_000)]
    pub request_timeout_ms: u64,

    /// Bound for each DNS lookup and TCP connect
    #[arg(long, env = "KAFKA_PROBE_TIMEOUT_MS", default_value_t = 4_000)]
    pub probe_timeout_ms: u64,

    /// Handshake attempts, including the first
    #[arg(long, env = "KAFKA_RETRIES", default_value_t = 3)]
    pub retries: u32,

    #[arg(long, env = "KAFKA_INITIAL_BACKOFF_MS", default_value_t = 300)]
    pub initial_backoff_ms: u64,

    #[arg(long, env = "KAFKA_MAX_BACKOFF_MS", default_value_t = 5_000)]
    pub max_backoff_ms: u64,

    /// Pass the Kafka client's INFO/DEBUG lines through as INFO records
    #[arg(long, env = "KAFKA_PREFLIGHT_VERBOSE")]
    pub verbose: bool,

    /// After a failed verdict, stay alive until Ctrl-C instead of exiting
    #[arg(long)]
    pub keep_alive: bool,

    /// Print the verdict as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Args {
    /// Warning for a username without a password or vice versa.
    pub fn credential_warning(&self) -> Option<&'static str> {
        let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
        match (present(&self.username), present(&self.password)) {
            (true, false) => Some("username given without password; connecting without SASL"),
            (false, true) => Some("password given without username; connecting without SASL"),
            _ => None,
        }
    }

    pub fn into_config(self) -> ProbeConfig {
        let mut config = ProbeConfig::new(self.brokers)
            .with_ssl(self.ssl)
            .with_credentials(SaslCredentials::from_parts(self.username, self.password))
            .with_verbose(self.verbose);
        config.client_id = self.client_id;
        config.sasl_mechanism = self.sasl_mechanism;
        config.connection_timeout = Duration::from_millis(self.connection_timeout_ms);
        config.request_timeout = Duration::from_millis(self.request_timeout_ms);
        config.probe_timeout = Duration::from_millis(self.probe_timeout_ms);
        config.retry = RetryPolicy {
            max_attempts: self.retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
        };
        config
    }
}

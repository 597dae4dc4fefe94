//! Shared helpers for live-broker tests

#![allow(dead_code)]

use std::env;
use std::sync::Arc;

use kafka_preflight_broker::KafkaBrokerClient;
use kafka_preflight_core::types::{ProbeConfig, SaslCredentials};
use kafka_preflight_core::{DiagnosticLog, LogFacadeSink};

/// Skip the test when an environment variable is missing.
#[macro_export]
macro_rules! skip_if_no_brokers {
    ($($var:expr),+) => {
        $(
            if std::env::var($var).is_err() {
                eprintln!("skipping test: {} not set", $var);
                return;
            }
        )+
    };
}

/// Assert a `Result` is `Ok` and unwrap it (fails the test otherwise).
#[macro_export]
macro_rules! require_ok {
    ($expr:expr $(,)?) => {{
        let res = $expr;
        assert!(res.is_ok(), "expected Ok(..), got an error");
        let Ok(val) = res else {
            return;
        };
        val
    }};
}

/// Probe configuration from `KAFKA_TEST_*` variables.
///
/// `KAFKA_TEST_BROKERS` is required; `KAFKA_TEST_USERNAME`, `KAFKA_TEST_PASSWORD`
/// and `KAFKA_TEST_SSL` are optional.
pub fn test_config() -> Option<ProbeConfig> {
    let brokers = env::var("KAFKA_TEST_BROKERS").ok()?;
    let credentials = SaslCredentials::from_parts(
        env::var("KAFKA_TEST_USERNAME").ok(),
        env::var("KAFKA_TEST_PASSWORD").ok(),
    );
    let ssl = env::var("KAFKA_TEST_SSL").is_ok_and(|v| v == "1" || v.eq_ignore_ascii_case("true"));

    Some(
        ProbeConfig::new(brokers)
            .with_ssl(ssl)
            .with_credentials(credentials)
            .with_verbose(env::var("KAFKA_TEST_VERBOSE").is_ok()),
    )
}

pub fn test_client() -> KafkaBrokerClient {
    KafkaBrokerClient::new(DiagnosticLog::new(Arc::new(LogFacadeSink)))
}

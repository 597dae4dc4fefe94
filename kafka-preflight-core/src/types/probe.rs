//! Per-layer probe outcome types

use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::error::{ErrorCategory, PreflightError};
use crate::types::{BrokerEndpoint, Hypothesis};

/// Layer a probe result belongs to, in the order layers are attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProbeLayer {
    Dns,
    Tcp,
    AuthHandshake,
    AdminCall,
}

impl fmt::Display for ProbeLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dns => write!(f, "DNS"),
            Self::Tcp => write!(f, "TCP"),
            Self::AuthHandshake => write!(f, "AUTH/HANDSHAKE"),
            Self::AdminCall => write!(f, "ADMIN_CALL"),
        }
    }
}

/// Why a layer failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeFailure {
    pub message: String,
    pub category: ErrorCategory,
    pub hypotheses: BTreeSet<Hypothesis>,
}

impl ProbeFailure {
    pub fn from_error(error: &PreflightError, hypotheses: BTreeSet<Hypothesis>) -> Self {
        Self {
            message: error.message().to_string(),
            category: error.category(),
            hypotheses,
        }
    }
}

/// Outcome of one layer.
///
/// DNS and TCP results carry the endpoint they were run against; handshake and admin
/// results are cluster-wide and leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProbeResult {
    pub layer: ProbeLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<BrokerEndpoint>,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ProbeFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub addresses: Vec<IpAddr>,
    #[serde(
        rename = "elapsed_ms",
        serialize_with = "serialize_millis",
        skip_serializing_if = "Option::is_none"
    )]
    pub elapsed: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic_count: Option<usize>,
}

impl ProbeResult {
    pub fn success(layer: ProbeLayer, endpoint: Option<BrokerEndpoint>) -> Self {
        Self {
            layer,
            endpoint,
            ok: true,
            failure: None,
            addresses: Vec::new(),
            elapsed: None,
            topic_count: None,
        }
    }

    pub fn failed(
        layer: ProbeLayer,
        endpoint: Option<BrokerEndpoint>,
        failure: ProbeFailure,
    ) -> Self {
        Self {
            layer,
            endpoint,
            ok: false,
            failure: Some(failure),
            addresses: Vec::new(),
            elapsed: None,
            topic_count: None,
        }
    }

    #[must_use]
    pub fn with_addresses(mut self, addresses: Vec<IpAddr>) -> Self {
        self.addresses = addresses;
        self
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }

    #[must_use]
    pub fn with_topic_count(mut self, count: usize) -> Self {
        self.topic_count = Some(count);
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.failure.as_ref().map(|f| f.message.as_str())
    }
}

/// DNS and TCP outcome for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointProbe {
    pub dns: ProbeResult,
    pub tcp: ProbeResult,
}

#[allow(clippy::ref_option)]
fn serialize_millis<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match value {
        Some(d) => serializer.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX)),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn layer_display() {
        assert_eq!(ProbeLayer::AuthHandshake.to_string(), "AUTH/HANDSHAKE");
        assert_eq!(ProbeLayer::Dns.to_string(), "DNS");
    }

    #[test]
    fn serializes_elapsed_as_millis_and_skips_empty_fields() {
        let result = ProbeResult::success(ProbeLayer::Tcp, Some(BrokerEndpoint::new("k", 9092)))
            .with_elapsed(Duration::from_millis(42));
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["layer"], "TCP");
        assert_eq!(json["elapsed_ms"], 42);
        assert!(json.get("failure").is_none());
        assert!(json.get("addresses").is_none());
        assert!(json.get("topic_count").is_none());
    }

    #[test]
    fn failure_keeps_raw_message() {
        let err = PreflightError::Protocol("broker closed connection".into());
        let failure = ProbeFailure::from_error(&err, BTreeSet::new());
        let result = ProbeResult::failed(ProbeLayer::AuthHandshake, None, failure);
        assert!(!result.ok);
        assert_eq!(result.message(), Some("broker closed connection"));
        assert_eq!(
            result.failure.unwrap().category,
            ErrorCategory::Protocol
        );
    }
}

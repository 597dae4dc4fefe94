//! Diagnosis and final verdict types

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ErrorCategory;
use crate::types::{BrokerEndpoint, ProbeLayer, ProbeResult};

/// Pattern-derived root-cause guess. Not authoritative; more than one may apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Hypothesis {
    SaslAuthFailure,
    TlsMismatch,
    DnsUnresolved,
    NetworkUnreachable,
    LeaderMetadataMismatch,
    ConnectionReset,
}

impl Hypothesis {
    /// Operator-facing next step for this hypothesis.
    pub fn hint(self) -> &'static str {
        match self {
            Self::SaslAuthFailure => {
                "check username/password and that the SASL mechanism matches the broker listener"
            }
            Self::TlsMismatch => {
                "check the SSL flag against the listener (SSL vs PLAINTEXT) and the broker certificate chain"
            }
            Self::DnsUnresolved => {
                "check the broker hostname and the resolver configuration of this pod/host"
            }
            Self::NetworkUnreachable => {
                "check that the port is open and reachable (security groups, network policies, firewalls)"
            }
            Self::LeaderMetadataMismatch => {
                "check advertised.listeners: the cluster may be returning addresses this client cannot reach"
            }
            Self::ConnectionReset => {
                "the broker dropped the connection: usually a TLS/plaintext mismatch, wrong port, SASL mismatch or a proxy in between"
            }
        }
    }
}

impl fmt::Display for Hypothesis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SaslAuthFailure => "SASL_AUTH_FAILURE",
            Self::TlsMismatch => "TLS_MISMATCH",
            Self::DnsUnresolved => "DNS_UNRESOLVED",
            Self::NetworkUnreachable => "NETWORK_UNREACHABLE",
            Self::LeaderMetadataMismatch => "LEADER_METADATA_MISMATCH",
            Self::ConnectionReset => "CONNECTION_RESET",
        };
        f.write_str(name)
    }
}

/// Hypotheses attached to one failed layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    pub layer: ProbeLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<BrokerEndpoint>,
    pub message: String,
    pub hypotheses: BTreeSet<Hypothesis>,
}

impl Diagnosis {
    /// Build a diagnosis from a failed result; `None` for successes.
    pub fn from_result(result: &ProbeResult) -> Option<Self> {
        let failure = result.failure.as_ref()?;
        Some(Self {
            layer: result.layer,
            endpoint: result.endpoint.clone(),
            message: failure.message.clone(),
            hypotheses: failure.hypotheses.clone(),
        })
    }
}

/// Final aggregate of a run. Produced once, never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct HealthVerdict {
    pub healthy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<ErrorCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub results: Vec<ProbeResult>,
    pub diagnoses: Vec<Diagnosis>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub topics: Vec<String>,
    pub elapsed_ms: u64,
    pub checked_at: DateTime<Utc>,
}

impl HealthVerdict {
    pub(crate) fn new(
        failure: Option<(ErrorCategory, String)>,
        results: Vec<ProbeResult>,
        topics: Vec<String>,
        elapsed: Duration,
    ) -> Self {
        let diagnoses = results.iter().filter_map(Diagnosis::from_result).collect();
        let (failure, reason) = match failure {
            Some((category, reason)) => (Some(category), Some(reason)),
            None => (None, None),
        };
        Self {
            healthy: failure.is_none(),
            failure,
            reason,
            results,
            diagnoses,
            topics,
            elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            checked_at: Utc::now(),
        }
    }

    /// Union of every hypothesis across all diagnoses.
    pub fn hypotheses(&self) -> BTreeSet<Hypothesis> {
        self.diagnoses
            .iter()
            .flat_map(|d| d.hypotheses.iter().copied())
            .collect()
    }

    /// Results for a single layer, in the order they were recorded.
    pub fn results_for(&self, layer: ProbeLayer) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(move |r| r.layer == layer)
    }

    /// Recommended process exit code. The harness decides whether to honour it.
    ///
    /// `0` healthy, `2` misconfigured, `1` any other failure.
    pub fn exit_code(&self) -> u8 {
        match self.failure {
            None => 0,
            Some(ErrorCategory::Configuration) => 2,
            Some(_) => 1,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::ProbeFailure;

    fn failed(layer: ProbeLayer, hypotheses: &[Hypothesis]) -> ProbeResult {
        ProbeResult::failed(
            layer,
            None,
            ProbeFailure {
                message: "boom".into(),
                category: ErrorCategory::Protocol,
                hypotheses: hypotheses.iter().copied().collect(),
            },
        )
    }

    #[test]
    fn hypothesis_display_matches_serde_name() {
        for h in [
            Hypothesis::SaslAuthFailure,
            Hypothesis::TlsMismatch,
            Hypothesis::DnsUnresolved,
            Hypothesis::NetworkUnreachable,
            Hypothesis::LeaderMetadataMismatch,
            Hypothesis::ConnectionReset,
        ] {
            let json = serde_json::to_value(h).unwrap();
            assert_eq!(json, h.to_string());
            assert!(!h.hint().is_empty());
        }
    }

    #[test]
    fn healthy_verdict_has_no_diagnoses() {
        let verdict = HealthVerdict::new(
            None,
            vec![ProbeResult::success(ProbeLayer::AdminCall, None)],
            vec!["orders".into()],
            Duration::from_millis(5),
        );
        assert!(verdict.healthy);
        assert!(verdict.diagnoses.is_empty());
        assert_eq!(verdict.exit_code(), 0);
    }

    #[test]
    fn diagnoses_follow_failed_results() {
        let verdict = HealthVerdict::new(
            Some((ErrorCategory::Protocol, "connect failed".into())),
            vec![
                ProbeResult::success(ProbeLayer::Dns, None),
                failed(ProbeLayer::Tcp, &[Hypothesis::NetworkUnreachable]),
                failed(
                    ProbeLayer::AuthHandshake,
                    &[Hypothesis::TlsMismatch, Hypothesis::ConnectionReset],
                ),
            ],
            Vec::new(),
            Duration::ZERO,
        );
        assert!(!verdict.healthy);
        assert_eq!(verdict.diagnoses.len(), 2);
        assert_eq!(verdict.hypotheses().len(), 3);
        assert_eq!(verdict.exit_code(), 1);
        assert_eq!(verdict.results_for(ProbeLayer::Tcp).count(), 1);
    }

    #[test]
    fn configuration_failure_exit_code() {
        let verdict = HealthVerdict::new(
            Some((ErrorCategory::Configuration, "no brokers configured".into())),
            Vec::new(),
            Vec::new(),
            Duration::ZERO,
        );
        assert_eq!(verdict.exit_code(), 2);
        assert_eq!(verdict.reason.as_deref(), Some("no brokers configured"));
    }
}

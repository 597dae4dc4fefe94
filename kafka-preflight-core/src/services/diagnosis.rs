//! Failure classification
//!
//! Maps raw error text from any layer to root-cause hypotheses by
//! case-insensitive substring matching. Matching is non-exclusive: every
//! family whose pattern appears contributes its hypothesis.

use std::collections::BTreeSet;

use crate::types::{Hypothesis, ProbeLayer, ProbeResult};

/// Pattern families. Order is irrelevant to the outcome.
const PATTERNS: &[(&[&str], Hypothesis)] = &[
    (
        &[
            "sasl",
            "authentication",
            "not authorized",
            "invalid credentials",
        ],
        Hypothesis::SaslAuthFailure,
    ),
    (
        &[
            "ssl",
            "tls",
            "certificate",
            "self signed",
            "self-signed",
            "security.protocol",
        ],
        Hypothesis::TlsMismatch,
    ),
    (
        &[
            "getaddrinfo",
            "enotfound",
            "name resolution",
            "failed to resolve",
            "name or service not known",
            "nodename nor servname",
            "no such host",
        ],
        Hypothesis::DnsUnresolved,
    ),
    (
        &[
            "econnrefused",
            "connection refused",
            "timed out",
            "etimedout",
            "all broker connections are down",
            "brokers are down",
            "network is unreachable",
            "no route to host",
        ],
        Hypothesis::NetworkUnreachable,
    ),
    (
        &["broker not available", "not a leader", "metadata"],
        Hypothesis::LeaderMetadataMismatch,
    ),
    (
        &[
            "closed connection",
            "connection reset",
            "disconnected while requesting apiversion",
        ],
        Hypothesis::ConnectionReset,
    ),
];

/// Classify an error message into every matching hypothesis.
pub fn classify(message: &str) -> BTreeSet<Hypothesis> {
    let lower = message.to_lowercase();
    PATTERNS
        .iter()
        .filter(|(needles, _)| needles.iter().any(|needle| lower.contains(needle)))
        .map(|(_, hypothesis)| *hypothesis)
        .collect()
}

/// Classify a failure message with the layer's own default hypothesis added.
///
/// A DNS failure is always `DNS_UNRESOLVED`; a TCP failure that matches nothing
/// (e.g. `timeout after 4000ms`) falls back to `NETWORK_UNREACHABLE`. Cluster
/// layers get only what their text matches.
pub fn classify_layer(layer: ProbeLayer, message: &str) -> BTreeSet<Hypothesis> {
    let mut hypotheses = classify(message);
    match layer {
        ProbeLayer::Dns => {
            hypotheses.insert(Hypothesis::DnsUnresolved);
        }
        ProbeLayer::Tcp if hypotheses.is_empty() => {
            hypotheses.insert(Hypothesis::NetworkUnreachable);
        }
        ProbeLayer::Tcp | ProbeLayer::AuthHandshake | ProbeLayer::AdminCall => {}
    }
    hypotheses
}

/// Fill in hypotheses on a failed result, keeping any the producer already set.
pub fn annotate(mut result: ProbeResult) -> ProbeResult {
    let layer = result.layer;
    if let Some(failure) = result.failure.as_mut() {
        let extra = classify_layer(layer, &failure.message);
        failure.hypotheses.extend(extra);
    }
    result
}

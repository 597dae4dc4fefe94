//! DNS resolution step

use std::collections::BTreeSet;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use hickory_resolver::TokioResolver;
use kafka_preflight_core::error::PreflightError;
use kafka_preflight_core::services::diagnosis::classify_layer;
use kafka_preflight_core::types::{BrokerEndpoint, ProbeFailure, ProbeLayer, ProbeResult};
use tokio::time::timeout;

/// Resolve the endpoint host to every A/AAAA address.
///
/// IP literals are returned as-is without touching the resolver.
pub(crate) async fn resolve(
    resolver: &TokioResolver,
    endpoint: &BrokerEndpoint,
    limit: Duration,
) -> ProbeResult {
    let started = Instant::now();

    if let Ok(ip) = endpoint.host.parse::<IpAddr>() {
        log::trace!("[Probe] {endpoint} is an IP literal, skipping lookup");
        return ProbeResult::success(ProbeLayer::Dns, Some(endpoint.clone()))
            .with_addresses(vec![ip])
            .with_elapsed(started.elapsed());
    }

    log::debug!("[Probe] Resolving {}", endpoint.host);
    let outcome = match timeout(limit, resolver.lookup_ip(endpoint.host.as_str())).await {
        Ok(Ok(lookup)) => {
            let addresses = dedup(lookup.iter());
            if addresses.is_empty() {
                Err(format!("no addresses found for {}", endpoint.host))
            } else {
                Ok(addresses)
            }
        }
        Ok(Err(e)) => Err(e.to_string()),
        Err(_) => Err(format!(
            "name resolution timed out after {}ms",
            limit.as_millis()
        )),
    };

    match outcome {
        Ok(addresses) => {
            log::debug!("[Probe] {} resolved to {addresses:?}", endpoint.host);
            ProbeResult::success(ProbeLayer::Dns, Some(endpoint.clone()))
                .with_addresses(addresses)
                .with_elapsed(started.elapsed())
        }
        Err(message) => {
            log::debug!("[Probe] Resolving {} failed: {message}", endpoint.host);
            failed(endpoint, &message, started)
        }
    }
}

fn failed(endpoint: &BrokerEndpoint, message: &str, started: Instant) -> ProbeResult {
    let error = PreflightError::Network(message.to_string());
    let hypotheses: BTreeSet<_> = classify_layer(ProbeLayer::Dns, message);
    ProbeResult::failed(
        ProbeLayer::Dns,
        Some(endpoint.clone()),
        ProbeFailure::from_error(&error, hypotheses),
    )
    .with_elapsed(started.elapsed())
}

fn dedup(addresses: impl Iterator<Item = IpAddr>) -> Vec<IpAddr> {
    let mut unique = Vec::new();
    for ip in addresses {
        if !unique.contains(&ip) {
            unique.push(ip);
        }
    }
    unique
}

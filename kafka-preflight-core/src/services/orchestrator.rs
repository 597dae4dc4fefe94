//! Probe orchestrator
//!
//! One pass, no retries at this level:
//!
//! ```text
//! INIT → CONFIG_VALIDATED → DNS_TCP_PROBED → ADMIN_CONNECTING
//!      → ADMIN_CONNECTED | ADMIN_FAILED
//!      → TOPICS_LISTING → TOPICS_LISTED | TOPICS_FAILED → DONE
//! ```
//!
//! Only an empty or malformed broker list leaves early. Network failures are
//! recorded and never stop the handshake attempt; a failed handshake skips
//! only the topic listing.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use futures::future::join_all;
use serde_json::json;

use crate::error::{ErrorCategory, PreflightError};
use crate::services::diagnosis::{annotate, classify_layer};
use crate::services::{BrokerAdapter, DiagnosticLog};
use crate::traits::{BrokerClient, NetworkProbe, Severity};
use crate::types::{
    BrokerEndpoint, HealthVerdict, ProbeConfig, ProbeFailure, ProbeLayer, ProbeResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProbeState {
    Init,
    ConfigValidated,
    DnsTcpProbed,
    AdminConnecting,
    AdminConnected,
    AdminFailed,
    TopicsListing,
    TopicsListed,
    TopicsFailed,
    Done,
}

impl fmt::Display for ProbeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "INIT",
            Self::ConfigValidated => "CONFIG_VALIDATED",
            Self::DnsTcpProbed => "DNS_TCP_PROBED",
            Self::AdminConnecting => "ADMIN_CONNECTING",
            Self::AdminConnected => "ADMIN_CONNECTED",
            Self::AdminFailed => "ADMIN_FAILED",
            Self::TopicsListing => "TOPICS_LISTING",
            Self::TopicsListed => "TOPICS_LISTED",
            Self::TopicsFailed => "TOPICS_FAILED",
            Self::Done => "DONE",
        };
        f.write_str(name)
    }
}

fn advance(state: &mut ProbeState, next: ProbeState) {
    log::debug!("[Preflight] {state} -> {next}");
    *state = next;
}

fn millis(elapsed: std::time::Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

/// Cluster-wide failed result for the handshake or admin layer.
fn cluster_failure(layer: ProbeLayer, error: &PreflightError, started: Instant) -> ProbeResult {
    let hypotheses = classify_layer(layer, error.message());
    ProbeResult::failed(layer, None, ProbeFailure::from_error(error, hypotheses))
        .with_elapsed(started.elapsed())
}

/// Layered connectivity probe engine.
pub struct ProbeOrchestrator {
    network: Arc<dyn NetworkProbe>,
    broker: Arc<dyn BrokerClient>,
    log: DiagnosticLog,
}

impl ProbeOrchestrator {
    pub fn new(
        network: Arc<dyn NetworkProbe>,
        broker: Arc<dyn BrokerClient>,
        log: DiagnosticLog,
    ) -> Self {
        Self {
            network,
            broker,
            log,
        }
    }

    /// Run the full diagnosis once and return the verdict.
    ///
    /// Never fails: every problem ends up in the verdict.
    pub async fn run(&self, config: &ProbeConfig) -> HealthVerdict {
        ProbeRun::new(self, config).execute(config).await
    }
}

/// State of a single [`ProbeOrchestrator::run`].
///
/// The log masks the configured password whether or not the caller
/// registered it.
struct ProbeRun<'a> {
    network: &'a dyn NetworkProbe,
    broker: BrokerAdapter,
    log: DiagnosticLog,
}

impl<'a> ProbeRun<'a> {
    fn new(orchestrator: &'a ProbeOrchestrator, config: &ProbeConfig) -> Self {
        let log = match &config.credentials {
            Some(credentials) => orchestrator.log.clone().with_secret(credentials.password.clone()),
            None => orchestrator.log.clone(),
        };
        Self {
            network: orchestrator.network.as_ref(),
            broker: BrokerAdapter::new(orchestrator.broker.clone(), log.clone()),
            log,
        }
    }

    async fn execute(&self, config: &ProbeConfig) -> HealthVerdict {
        let started = Instant::now();
        let mut state = ProbeState::Init;
        let mut results = Vec::new();

        let endpoints = match config.endpoints() {
            Ok(endpoints) if !endpoints.is_empty() => endpoints,
            Ok(_) => {
                return self.misconfigured(
                    &mut state,
                    &PreflightError::Configuration("no brokers configured".to_string()),
                    started,
                );
            }
            Err(e) => return self.misconfigured(&mut state, &e, started),
        };
        advance(&mut state, ProbeState::ConfigValidated);

        self.log.info(
            "starting preflight",
            json!({
                "brokers": endpoints.iter().map(BrokerEndpoint::address).collect::<Vec<_>>(),
                "security_protocol": config.security_protocol().to_string(),
                "sasl_mechanism": config.credentials.as_ref().map(|_| config.sasl_mechanism.to_string()),
                "username": config.credentials.as_ref().map(|c| c.username.clone()),
                "probe_timeout_ms": millis(config.probe_timeout),
            }),
        );

        // Endpoints are independent; join_all keeps input order.
        let probes = join_all(
            endpoints
                .iter()
                .map(|endpoint| self.network.probe(endpoint, config.probe_timeout)),
        )
        .await;
        for probe in probes {
            for result in [probe.dns, probe.tcp] {
                let result = annotate(result);
                self.report(&result);
                results.push(result);
            }
        }
        advance(&mut state, ProbeState::DnsTcpProbed);

        advance(&mut state, ProbeState::AdminConnecting);
        let connect_started = Instant::now();
        let session = match self.broker.connect_admin(config, &endpoints).await {
            Ok(session) => {
                let result = ProbeResult::success(ProbeLayer::AuthHandshake, None)
                    .with_elapsed(connect_started.elapsed());
                self.report(&result);
                results.push(result);
                advance(&mut state, ProbeState::AdminConnected);
                session
            }
            Err(e) => {
                let result = cluster_failure(ProbeLayer::AuthHandshake, &e, connect_started);
                self.report(&result);
                results.push(result);
                advance(&mut state, ProbeState::AdminFailed);
                // Topic listing is skipped: it cannot succeed without a session.
                return self.finish(
                    &mut state,
                    Some((ErrorCategory::Protocol, e.message().to_string())),
                    results,
                    Vec::new(),
                    started,
                );
            }
        };

        advance(&mut state, ProbeState::TopicsListing);
        let list_started = Instant::now();
        let (failure, topics) = match self.broker.list_topics(session.as_ref(), config).await {
            Ok(topics) => {
                let result = ProbeResult::success(ProbeLayer::AdminCall, None)
                    .with_elapsed(list_started.elapsed())
                    .with_topic_count(topics.len());
                self.report(&result);
                results.push(result);
                advance(&mut state, ProbeState::TopicsListed);
                (None, topics)
            }
            Err(e) => {
                let result = cluster_failure(ProbeLayer::AdminCall, &e, list_started);
                self.report(&result);
                results.push(result);
                advance(&mut state, ProbeState::TopicsFailed);
                (
                    Some((ErrorCategory::Application, e.message().to_string())),
                    Vec::new(),
                )
            }
        };

        self.broker.disconnect(session).await;
        self.finish(&mut state, failure, results, topics, started)
    }

    /// One record per probe step, plus one per hypothesis on failure.
    fn report(&self, result: &ProbeResult) {
        let broker = result.endpoint.as_ref().map(BrokerEndpoint::address);
        let elapsed_ms = result.elapsed.map(millis);

        let Some(failure) = &result.failure else {
            self.log.info(
                &format!("{} ok", result.layer),
                json!({
                    "layer": result.layer,
                    "broker": broker,
                    "addresses": result.addresses,
                    "topic_count": result.topic_count,
                    "elapsed_ms": elapsed_ms,
                }),
            );
            return;
        };

        let severity = if failure.category.is_expected() {
            Severity::Warn
        } else {
            Severity::Error
        };
        self.log.emit(
            severity,
            &format!("{} failed", result.layer),
            json!({
                "layer": result.layer,
                "broker": broker,
                "category": failure.category,
                "error": failure.message,
                "elapsed_ms": elapsed_ms,
            }),
        );
        for hypothesis in &failure.hypotheses {
            self.log.emit(
                severity,
                &format!("possible cause: {hypothesis}"),
                json!({
                    "layer": result.layer,
                    "broker": broker,
                    "hypothesis": hypothesis,
                    "hint": hypothesis.hint(),
                }),
            );
        }
    }

    fn misconfigured(
        &self,
        state: &mut ProbeState,
        error: &PreflightError,
        started: Instant,
    ) -> HealthVerdict {
        self.log.error(error.message(), json!({ "category": error.category() }));
        self.finish(
            state,
            Some((error.category(), error.message().to_string())),
            Vec::new(),
            Vec::new(),
            started,
        )
    }

    fn finish(
        &self,
        state: &mut ProbeState,
        failure: Option<(ErrorCategory, String)>,
        results: Vec<ProbeResult>,
        topics: Vec<String>,
        started: Instant,
    ) -> HealthVerdict {
        advance(state, ProbeState::Done);
        let verdict = HealthVerdict::new(failure, results, topics, started.elapsed());

        let hypotheses: Vec<String> = verdict.hypotheses().iter().map(ToString::to_string).collect();
        if verdict.healthy {
            self.log.info(
                "preflight passed",
                json!({
                    "topic_count": verdict.topics.len(),
                    "partial_failures": verdict.diagnoses.len(),
                    "hypotheses": hypotheses,
                    "elapsed_ms": verdict.elapsed_ms,
                }),
            );
        } else {
            self.log.error(
                "preflight failed",
                json!({
                    "failure": verdict.failure,
                    "reason": verdict.reason,
                    "hypotheses": hypotheses,
                    "recommended_exit_code": verdict.exit_code(),
                    "elapsed_ms": verdict.elapsed_ms,
                }),
            );
        }
        verdict
    }
}

//! Test helpers
//!
//! Mock collaborators and an in-memory log sink.

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{PreflightError, PreflightResult};
use crate::traits::{AdminSession, BrokerClient, LogRecord, LogSink, NetworkProbe, Severity};
use crate::types::{
    BrokerEndpoint, EndpointProbe, ProbeConfig, ProbeFailure, ProbeLayer, ProbeResult,
};

// ===== RecordingSink =====

pub struct RecordingSink {
    records: Mutex<Vec<LogRecord>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
        }
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn has_message(&self, severity: Severity, message: &str) -> bool {
        self.records()
            .iter()
            .any(|r| r.severity == severity && r.message == message)
    }
}

impl LogSink for RecordingSink {
    fn emit(&self, record: &LogRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(record.clone());
    }
}

// ===== MockNetworkProbe =====

/// Succeeds for every host unless a failure was registered for it.
pub struct MockNetworkProbe {
    dns_failures: HashMap<String, String>,
    tcp_failures: HashMap<String, String>,
    calls: AtomicUsize,
}

impl MockNetworkProbe {
    pub fn new() -> Self {
        Self {
            dns_failures: HashMap::new(),
            tcp_failures: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_dns_failure(mut self, host: &str, message: &str) -> Self {
        self.dns_failures.insert(host.to_string(), message.to_string());
        self
    }

    pub fn with_tcp_failure(mut self, host: &str, message: &str) -> Self {
        self.tcp_failures.insert(host.to_string(), message.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn step(
        layer: ProbeLayer,
        endpoint: &BrokerEndpoint,
        failure: Option<&String>,
    ) -> ProbeResult {
        match failure {
            None => ProbeResult::success(layer, Some(endpoint.clone())),
            Some(message) => ProbeResult::failed(
                layer,
                Some(endpoint.clone()),
                ProbeFailure::from_error(&PreflightError::Network(message.clone()), Default::default()),
            ),
        }
    }
}

#[async_trait]
impl NetworkProbe for MockNetworkProbe {
    async fn probe(&self, endpoint: &BrokerEndpoint, _timeout: Duration) -> EndpointProbe {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut dns = Self::step(ProbeLayer::Dns, endpoint, self.dns_failures.get(&endpoint.host));
        if dns.ok {
            dns = dns.with_addresses(vec![IpAddr::V4(Ipv4Addr::LOCALHOST)]);
        }
        EndpointProbe {
            dns,
            tcp: Self::step(ProbeLayer::Tcp, endpoint, self.tcp_failures.get(&endpoint.host)),
        }
    }
}

// ===== MockBrokerClient =====

enum ConnectBehavior {
    Ok,
    Fail(String),
    Hang,
}

pub struct MockBrokerClient {
    connect: ConnectBehavior,
    list: Result<Vec<String>, String>,
    disconnect_error: Option<String>,
    connects: Arc<AtomicUsize>,
    disconnects: Arc<AtomicUsize>,
}

impl MockBrokerClient {
    fn with(connect: ConnectBehavior, list: Result<Vec<String>, String>) -> Self {
        Self {
            connect,
            list,
            disconnect_error: None,
            connects: Arc::new(AtomicUsize::new(0)),
            disconnects: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn healthy(topics: &[&str]) -> Self {
        Self::with(
            ConnectBehavior::Ok,
            Ok(topics.iter().map(ToString::to_string).collect()),
        )
    }

    pub fn failing_connect(message: &str) -> Self {
        Self::with(ConnectBehavior::Fail(message.to_string()), Ok(Vec::new()))
    }

    pub fn failing_list(message: &str) -> Self {
        Self::with(ConnectBehavior::Ok, Err(message.to_string()))
    }

    pub fn hanging_connect() -> Self {
        Self::with(ConnectBehavior::Hang, Ok(Vec::new()))
    }

    pub fn with_disconnect_error(mut self, message: &str) -> Self {
        self.disconnect_error = Some(message.to_string());
        self
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn disconnects(&self) -> usize {
        self.disconnects.load(Ordering::SeqCst)
    }
}

struct MockSession {
    list: Result<Vec<String>, String>,
    disconnect_error: Option<String>,
    disconnects: Arc<AtomicUsize>,
}

#[async_trait]
impl BrokerClient for MockBrokerClient {
    async fn connect_admin(
        &self,
        _config: &ProbeConfig,
        _endpoints: &[BrokerEndpoint],
    ) -> PreflightResult<Box<dyn AdminSession>> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        match &self.connect {
            ConnectBehavior::Ok => Ok(Box::new(MockSession {
                list: self.list.clone(),
                disconnect_error: self.disconnect_error.clone(),
                disconnects: self.disconnects.clone(),
            })),
            ConnectBehavior::Fail(message) => Err(PreflightError::Protocol(message.clone())),
            ConnectBehavior::Hang => {
                futures::future::pending::<()>().await;
                Err(PreflightError::Protocol("unreachable".to_string()))
            }
        }
    }
}

#[async_trait]
impl AdminSession for MockSession {
    async fn list_topics(&self) -> PreflightResult<Vec<String>> {
        self.list.clone().map_err(PreflightError::Application)
    }

    async fn disconnect(self: Box<Self>) -> PreflightResult<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        match self.disconnect_error {
            Some(message) => Err(PreflightError::Protocol(message)),
            None => Ok(()),
        }
    }
}

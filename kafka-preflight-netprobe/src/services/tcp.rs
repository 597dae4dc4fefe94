//! TCP reachability step

use std::time::{Duration, Instant};

use kafka_preflight_core::error::PreflightError;
use kafka_preflight_core::services::diagnosis::classify_layer;
use kafka_preflight_core::types::{BrokerEndpoint, ProbeFailure, ProbeLayer, ProbeResult};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;

/// Open and immediately close a TCP connection to the endpoint.
///
/// Produces exactly one of: success, `timeout after Nms`, or the socket error.
/// The stream is shut down and dropped before returning on the success path;
/// the other paths never hold a socket.
pub(crate) async fn connect(endpoint: &BrokerEndpoint, limit: Duration) -> ProbeResult {
    let started = Instant::now();
    log::debug!("[Probe] TCP connect to {endpoint}");

    let connect = TcpStream::connect((endpoint.host.as_str(), endpoint.port));
    let message = match timeout(limit, connect).await {
        Ok(Ok(mut stream)) => {
            if let Err(e) = stream.shutdown().await {
                log::trace!("[Probe] Shutdown of {endpoint} failed: {e}");
            }
            drop(stream);
            log::debug!("[Probe] TCP connect to {endpoint} succeeded");
            return ProbeResult::success(ProbeLayer::Tcp, Some(endpoint.clone()))
                .with_elapsed(started.elapsed());
        }
        Ok(Err(e)) => e.to_string(),
        Err(_) => format!("timeout after {}ms", limit.as_millis()),
    };

    log::debug!("[Probe] TCP connect to {endpoint} failed: {message}");
    let error = PreflightError::Network(message);
    let hypotheses = classify_layer(ProbeLayer::Tcp, error.message());
    ProbeResult::failed(
        ProbeLayer::Tcp,
        Some(endpoint.clone()),
        ProbeFailure::from_error(&error, hypotheses),
    )
    .with_elapsed(started.elapsed())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use kafka_preflight_core::types::Hypothesis;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn success_releases_socket() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 16];
            socket.read(&mut buf).await.unwrap()
        });

        let result = connect(&BrokerEndpoint::new("127.0.0.1", port), Duration::from_secs(2)).await;
        assert!(result.ok);
        assert!(result.failure.is_none());
        assert!(result.elapsed.is_some());

        // Zero bytes read means the server saw EOF.
        let read = timeout(Duration::from_secs(2), server).await.unwrap().unwrap();
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn refused_port_is_an_error_outcome() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let result = connect(&BrokerEndpoint::new("127.0.0.1", port), Duration::from_secs(2)).await;
        assert!(!result.ok);
        let failure = result.failure.unwrap();
        assert!(!failure.message.starts_with("timeout after"));
        assert!(failure.hypotheses.contains(&Hypothesis::NetworkUnreachable));
    }

    #[tokio::test]
    #[ignore = "requires network access"]
    async fn blackholed_address_times_out() {
        let result = connect(
            &BrokerEndpoint::new("10.255.255.1", 9092),
            Duration::from_millis(300),
        )
        .await;
        assert!(!result.ok);
        assert_eq!(result.message(), Some("timeout after 300ms"));
        assert!(result
            .failure
            .unwrap()
            .hypotheses
            .contains(&Hypothesis::NetworkUnreachable));
    }
}

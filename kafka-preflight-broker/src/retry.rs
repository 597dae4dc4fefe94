//! Handshake retry with exponential backoff

use std::future::Future;
use std::time::Duration;

use kafka_preflight_core::services::diagnosis::classify;
use kafka_preflight_core::types::{Hypothesis, RetryPolicy};
use kafka_preflight_core::{DiagnosticLog, PreflightResult};
use serde_json::json;

/// Whether a failed handshake is worth another attempt.
///
/// Only transient transport or metadata trouble is retried. Anything that
/// looks like an authentication or TLS problem will fail the same way again.
pub(crate) fn is_retryable(message: &str) -> bool {
    let hypotheses = classify(message);
    let transient = hypotheses.contains(&Hypothesis::NetworkUnreachable)
        || hypotheses.contains(&Hypothesis::LeaderMetadataMismatch);
    let fatal = hypotheses.contains(&Hypothesis::SaslAuthFailure)
        || hypotheses.contains(&Hypothesis::TlsMismatch);
    transient && !fatal
}

/// Delay before retry number `attempt + 1`: `initial * 2^attempt`, capped at `max`.
pub(crate) fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    policy
        .initial_backoff
        .saturating_mul(1_u32 << capped_attempt)
        .min(policy.max_backoff)
}

/// Run `operation` up to `policy.max_attempts` times (at least once).
///
/// Each retried failure is reported on `log` at WARN.
pub(crate) async fn with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    log: &DiagnosticLog,
    mut operation: F,
) -> PreflightResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = PreflightResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt + 1 < attempts && is_retryable(e.message()) => {
                let delay = backoff_delay(policy, attempt);
                log.warn(
                    "handshake attempt failed, retrying",
                    json!({
                        "attempt": attempt + 1,
                        "max_attempts": attempts,
                        "retry_in_ms": u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "error": e.message(),
                    }),
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}

use crate::error::{TransportError, TransportErrorKind};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use std::thread;
use std::time::Duration;
use tracing::warn;

/// Bounded retry with a fixed delay between attempts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total executions, including the first one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    /// Whether `outcome` is worth another attempt.
    pub fn is_retryable(outcome: &Result<ApiResponse, TransportError>) -> bool {
        match outcome {
            Ok(response) => is_transient_status(response.status),
            Err(err) => is_transient_kind(err.kind),
        }
    }
}

/// Network failures that may heal on their own. Timeouts are not retried.
pub fn is_transient_kind(kind: TransportErrorKind) -> bool {
    matches!(
        kind,
        TransportErrorKind::UnknownHost
            | TransportErrorKind::ConnectionRefused
            | TransportErrorKind::ConnectionReset
            | TransportErrorKind::Tls
    )
}

/// 429 Too Many Requests, 502 Bad Gateway, 503 Service Unavailable.
pub fn is_transient_status(status: u16) -> bool {
    matches!(status, 429 | 502 | 503)
}

/// Decorator that re-executes transient failures of the wrapped transport.
#[derive(Clone, Debug)]
pub struct Retrying<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T> Retrying<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }
}

impl<T: Transport> Transport for Retrying<T> {
    fn execute(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let mut attempt = 1u32;
        loop {
            let outcome = self.inner.execute(request);
            if attempt >= self.policy.max_attempts || !RetryPolicy::is_retryable(&outcome) {
                return outcome;
            }

            let cause = match &outcome {
                Ok(response) => format!("HTTP {}", response.status),
                Err(err) => format!("{}: {}", err.kind, err.message),
            };
            warn!(
                method = request.method.as_str(),
                path = %request.path(),
                attempt,
                max_attempts = self.policy.max_attempts,
                delay_ms = self.policy.delay.as_millis() as u64,
                %cause,
                "transient failure, retrying"
            );

            if !self.policy.delay.is_zero() {
                thread::sleep(self.policy.delay);
            }
            attempt += 1;
        }
    }
}

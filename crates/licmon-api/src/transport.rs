// Shared transport configuration for building reqwest::Client instances.
//
// TLS, timeout, and retry settings live here so the license client only
// deals with URL construction and authentication.

use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

use crate::error::Error;

/// HTTP statuses the transport retries before giving up.
pub const RETRY_STATUSES: [u16; 3] = [500, 502, 503];

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (for self-signed license servers).
    DangerAcceptInvalid,
}

/// Bounded retry with exponential backoff.
///
/// Applies to the statuses in [`RETRY_STATUSES`] and to connect/timeout
/// transport errors. Everything else is returned to the caller on the
/// first attempt.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based), doubling each time.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2_u32.saturating_pow(attempt);
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Send a request, rebuilding it for every attempt.
    ///
    /// A retryable status that survives every attempt is returned as the
    /// final `Ok(response)` so the caller can map it like any other status.
    pub(crate) async fn send<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn() -> reqwest::RequestBuilder,
    {
        let mut attempt = 0;
        loop {
            let outcome = build().send().await;

            if !is_retryable(&outcome) || attempt >= self.max_retries {
                return outcome.map_err(Error::Transport);
            }

            let wait = self.backoff(attempt);
            match &outcome {
                Ok(resp) => warn!(
                    status = resp.status().as_u16(),
                    attempt = attempt + 1,
                    "server error, retrying in {wait:?}"
                ),
                Err(e) => warn!(attempt = attempt + 1, "transport error ({e}), retrying in {wait:?}"),
            }
            tokio::time::sleep(wait).await;
            attempt += 1;
        }
    }
}

/// A retryable status, or a transport error that never reached the server
/// or ran out of time.
fn is_retryable(outcome: &Result<reqwest::Response, reqwest::Error>) -> bool {
    match outcome {
        Ok(resp) => RETRY_STATUSES.contains(&resp.status().as_u16()),
        Err(e) => e.is_connect() || e.is_timeout(),
    }
}

/// Shared transport configuration for building HTTP clients.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::System,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("licmon/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}

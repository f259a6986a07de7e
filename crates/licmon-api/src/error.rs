use thiserror::Error;

/// Top-level error type for the `licmon-api` crate.
///
/// Covers every failure mode of the license server REST API:
/// authentication, transport, endpoint resolution, and response decoding.
/// `licmon-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// The authorize endpoint rejected the credentials.
    #[error("Authentication failed (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },

    /// A signed request was rejected even after re-authenticating.
    #[error("Request to {url} unauthorized after re-authentication")]
    Unauthorized { url: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Endpoint ────────────────────────────────────────────────────
    /// Neither a server URL nor a valid cloud license service id.
    #[error("Invalid license server endpoint '{value}': {reason}")]
    InvalidEndpoint { value: String, reason: String },

    // ── API ─────────────────────────────────────────────────────────
    /// Non-success status from a data endpoint.
    #[error("License server error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// The HTTP status attached to this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Unauthorized { .. } => Some(401),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

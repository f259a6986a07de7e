// ── Core error types ──
//
// User-facing errors from licmon-core. Consumers never match on HTTP
// status codes or JSON parse failures directly; the
// `From<licmon_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to license server at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        message: String,
        /// HTTP status returned by the server, if one was received.
        status: Option<u16>,
    },

    #[error("License server request timed out: {url}")]
    Timeout { url: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("License server error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    #[error("Unexpected response from license server: {message}")]
    InvalidResponse { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // ── Reporting errors ─────────────────────────────────────────────
    #[error("Failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<licmon_api::Error> for CoreError {
    fn from(err: licmon_api::Error) -> Self {
        match err {
            licmon_api::Error::Authentication { status, message } => {
                CoreError::AuthenticationFailed {
                    message,
                    status: Some(status),
                }
            }
            licmon_api::Error::Unauthorized { url } => CoreError::AuthenticationFailed {
                message: format!("token rejected by {url} after re-authentication"),
                status: Some(401),
            },
            licmon_api::Error::Transport(ref e) => {
                let url = e.url().map_or_else(|| "<unknown>".into(), ToString::to_string);
                if e.is_timeout() {
                    CoreError::Timeout { url }
                } else if e.is_connect() || e.is_request() {
                    CoreError::ConnectionFailed {
                        url,
                        reason: e.to_string(),
                    }
                } else if e.is_decode() {
                    CoreError::InvalidResponse {
                        message: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            licmon_api::Error::InvalidUrl(e) => CoreError::Validation {
                field: "server URL".into(),
                reason: e.to_string(),
            },
            licmon_api::Error::InvalidEndpoint { value, reason } => CoreError::Validation {
                field: "license server".into(),
                reason: format!("'{value}': {reason}"),
            },
            licmon_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            licmon_api::Error::Api { status, message } => CoreError::Api {
                message: format!("HTTP {status}: {message}"),
                status: Some(status),
            },
            licmon_api::Error::Deserialization { message, body: _ } => {
                CoreError::InvalidResponse { message }
            }
        }
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and a stable process exit code.

use miette::Diagnostic;
use thiserror::Error;

use licmon_config::ConfigError;
use licmon_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to license server at {url}")]
    #[diagnostic(
        code(licmon::connection_failed),
        help(
            "Check that the license server is running and reachable.\n\
             Reason: {reason}\n\
             For a self-signed certificate try --insecure (-k) or --ca-cert."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Request to {url} timed out")]
    #[diagnostic(
        code(licmon::timeout),
        help("Increase the timeout with --timeout or check the server's responsiveness.")
    )]
    Timeout { url: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(
        code(licmon::auth_failed),
        help(
            "Verify the license server URI or cloud service id, the username, and the password.\n\
             Use --ls-uri/--ls-username/--ls-password or LS_URI/LS_USERNAME/LS_PASSWORD."
        )
    )]
    AuthFailed { message: String, status: Option<u16> },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(licmon::no_credentials),
        help(
            "Pass --ls-username and --ls-password (or set LS_USERNAME / LS_PASSWORD),\n\
             or configure a profile with: licmon config init"
        )
    )]
    NoCredentials { profile: String },

    // ── Server responses ─────────────────────────────────────────────
    #[error("{resource} '{identifier}' not found")]
    #[diagnostic(
        code(licmon::not_found),
        help("Run: licmon features to see available feature ids")
    )]
    NotFound { resource: String, identifier: String },

    #[error("License server error{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    #[diagnostic(code(licmon::api_error))]
    ApiError { message: String, status: Option<u16> },

    #[error("Unexpected response from license server: {message}")]
    #[diagnostic(
        code(licmon::invalid_response),
        help("The endpoint may not be a license server. Check --ls-uri.")
    )]
    InvalidResponse { message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(licmon::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(licmon::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: licmon config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No license server configured")]
    #[diagnostic(
        code(licmon::no_server),
        help(
            "Pass --ls-uri (or set LS_URI), or create a profile with: licmon config init\n\
             Config expected at: {path}"
        )
    )]
    NoServer { path: String },

    #[error(transparent)]
    #[diagnostic(code(licmon::config))]
    Config(Box<figment::Error>),

    #[error("Failed to write config: {0}")]
    #[diagnostic(code(licmon::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(licmon::io))]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(licmon::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(licmon::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::ProfileNotFound { .. }
            | Self::NoServer { .. }
            | Self::Config(_) => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => CliError::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message, status } => {
                CliError::AuthFailed { message, status }
            }
            CoreError::Timeout { url } => CliError::Timeout { url },
            CoreError::Api { message, status } => CliError::ApiError { message, status },
            CoreError::InvalidResponse { message } => CliError::InvalidResponse { message },
            CoreError::Validation { field, reason } => CliError::Validation { field, reason },
            CoreError::Report(e) => CliError::Io(e),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoServer { .. } => CliError::NoServer {
                path: licmon_config::config_path().display().to_string(),
            },
            ConfigError::NoCredentials { profile } => CliError::NoCredentials { profile },
            ConfigError::UnknownProfile { name } => CliError::ProfileNotFound {
                name,
                available: "(none)".into(),
            },
            ConfigError::Serialization(e) => CliError::ConfigWrite(e),
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Io(e) => CliError::Io(e),
        }
    }
}

// License server HTTP client
//
// Wraps `reqwest::Client` with instance-scoped URL construction, bearer
// token storage, and response decoding. Authentication lives in `auth.rs`;
// endpoint methods are implemented as inherent methods in separate files.

use std::sync::{PoisonError, RwLock};

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::auth::Credentials;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::transport::{RetryPolicy, TransportConfig};

const BODY_PREVIEW_CHARS: usize = 200;

/// HTTP client for one license server instance.
///
/// Holds the credentials for the lifetime of the process and the current
/// bearer token, which is replaced whenever the client re-authenticates.
/// Every signed request goes through [`with_reauth`](Self::with_reauth).
pub struct LicenseClient {
    http: reqwest::Client,
    endpoint: Endpoint,
    credentials: Credentials,
    retry: RetryPolicy,
    /// Bearer token from the last successful authorization.
    token: RwLock<Option<SecretString>>,
}

impl LicenseClient {
    /// Create a client from a `TransportConfig`. Does not authenticate.
    pub fn new(
        endpoint: Endpoint,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(
            http,
            endpoint,
            credentials,
            transport.retry.clone(),
        ))
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        endpoint: Endpoint,
        credentials: Credentials,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            endpoint,
            credentials,
            retry,
            token: RwLock::new(None),
        }
    }

    /// Create a client and authenticate immediately.
    pub async fn connect(
        endpoint: Endpoint,
        credentials: Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let client = Self::new(endpoint, credentials, transport)?;
        client.authenticate().await?;
        Ok(client)
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Whether a bearer token is currently held.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    pub(crate) fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    // ── Token management ──────────────────────────────────────────────

    pub(crate) fn token(&self) -> Option<SecretString> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn set_token(&self, token: SecretString) {
        debug!("storing bearer token");
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{base}/api/1.0/instances/{scope}/{path}`
    pub(crate) fn instance_url(&self, path: &str) -> Result<Url, Error> {
        self.endpoint.instance_url(path)
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// Signed GET with re-authentication, decoded as JSON.
    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.get_url(self.instance_url(path)?).await
    }

    /// Signed GET of an already-built instance URL.
    pub(crate) async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!(%url, "GET");

        let resp = self
            .with_reauth(|token| self.http.get(url.clone()).bearer_auth(token))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Api {
                status: status.as_u16(),
                message: preview(&body),
            });
        }

        decode_json(resp).await
    }
}

/// Read the body and deserialize it, keeping the raw text on failure.
pub(crate) async fn decode_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await.map_err(Error::Transport)?;
    serde_json::from_str(&body).map_err(|e| Error::Deserialization {
        message: format!("{e} (body preview: {:?})", preview(&body)),
        body,
    })
}

/// First few hundred characters of a response body.
pub(crate) fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}

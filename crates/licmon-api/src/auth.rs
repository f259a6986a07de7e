// Bearer-token authentication
//
// `POST {instance}/authorize` exchanges the credentials for a token. Signed
// calls go through `with_reauth`, which retries exactly once after
// re-authenticating when the server answers 401.

use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use crate::client::{LicenseClient, decode_json, preview};
use crate::error::Error;
use crate::models::{AuthorizeRequest, AuthorizeResponse};

/// Username and password for the license server's REST API.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

impl LicenseClient {
    /// Exchange the credentials for a bearer token.
    ///
    /// Replaces any token already held. Fails with
    /// [`Error::Authentication`] carrying the response status when the
    /// server does not answer with a success status.
    pub async fn authenticate(&self) -> Result<(), Error> {
        self.login().await.map(drop)
    }

    async fn login(&self) -> Result<SecretString, Error> {
        let url = self.instance_url("authorize")?;
        info!(endpoint = %self.endpoint(), user = self.username(), "authenticating");

        let creds = self.credentials();
        let body = AuthorizeRequest {
            user: &creds.username,
            password: creds.password.expose_secret(),
        };

        let resp = self
            .retry()
            .send(|| self.http().post(url.clone()).json(&body))
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = if body.trim().is_empty() {
                "credentials rejected".to_owned()
            } else {
                preview(&body)
            };
            return Err(Error::Authentication {
                status: status.as_u16(),
                message,
            });
        }

        let AuthorizeResponse { token } = decode_json(resp).await?;
        let token = SecretString::from(token);
        self.set_token(token.clone());
        debug!("authentication successful");
        Ok(token)
    }

    /// The held token, or a fresh one if none has been issued yet.
    async fn signing_token(&self) -> Result<SecretString, Error> {
        match self.token() {
            Some(token) => Ok(token),
            None => self.login().await,
        }
    }

    /// Send a signed request, re-authenticating once on 401.
    ///
    /// `build` receives the bearer token and returns the request to send;
    /// it is called again with the new token for the single retry. A second
    /// 401 is returned as [`Error::Unauthorized`] without further attempts.
    /// Any other status is handed back to the caller untouched.
    pub(crate) async fn with_reauth<F>(&self, build: F) -> Result<reqwest::Response, Error>
    where
        F: Fn(&str) -> reqwest::RequestBuilder,
    {
        let token = self.signing_token().await?;
        let resp = self
            .retry()
            .send(|| build(token.expose_secret()))
            .await?;
        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        debug!(url = %resp.url(), "token rejected, re-authenticating");
        let token = self.login().await?;
        let resp = self
            .retry()
            .send(|| build(token.expose_secret()))
            .await?;
        if resp.status() == StatusCode::UNAUTHORIZED {
            return Err(Error::Unauthorized {
                url: resp.url().to_string(),
            });
        }
        Ok(resp)
    }
}

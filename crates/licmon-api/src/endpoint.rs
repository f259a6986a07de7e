use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::Error;

/// Base URL of the hosted cloud license service.
pub const CLOUD_LICENSE_SERVICE_URL: &str = "https://teradici.compliance.flexnetoperations.com";

/// Instance scope used by a local license server.
const LOCAL_SCOPE: &str = "~";

const CLOUD_ID_LEN: usize = 12;

/// Where the license server lives.
///
/// Determines the base URL and the `{scope}` segment of every
/// `/api/1.0/instances/{scope}/...` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Self-hosted license server, addressed by URL. Scope `~`.
    Local { base_url: Url },
    /// Hosted cloud license service, addressed by its 12-character id.
    Cloud { base_url: Url, service_id: String },
}

impl Endpoint {
    /// Parse a server URL (`http://` / `https://`) or a cloud service id.
    pub fn parse(value: &str) -> Result<Self, Error> {
        let value = value.trim();
        if value.starts_with("http://") || value.starts_with("https://") {
            let base_url = Url::parse(value)?;
            return Ok(Self::Local { base_url });
        }

        validate_cloud_id(value)?;
        Ok(Self::Cloud {
            base_url: Url::parse(CLOUD_LICENSE_SERVICE_URL)?,
            service_id: value.to_owned(),
        })
    }

    /// Point a cloud endpoint at a different service host.
    ///
    /// No-op for local endpoints.
    pub fn with_cloud_url(self, url: Url) -> Self {
        match self {
            Self::Cloud { service_id, .. } => Self::Cloud {
                base_url: url,
                service_id,
            },
            local @ Self::Local { .. } => local,
        }
    }

    pub fn base_url(&self) -> &Url {
        match self {
            Self::Local { base_url } | Self::Cloud { base_url, .. } => base_url,
        }
    }

    /// The `{scope}` path segment: `~` or the cloud service id.
    pub fn scope(&self) -> &str {
        match self {
            Self::Local { .. } => LOCAL_SCOPE,
            Self::Cloud { service_id, .. } => service_id,
        }
    }

    /// Credentials and tokens would cross the network unencrypted.
    pub fn is_cleartext(&self) -> bool {
        self.base_url().scheme() == "http"
    }

    /// Build `{base}/api/1.0/instances/{scope}` with an optional sub-path.
    pub fn instance_url(&self, path: &str) -> Result<Url, Error> {
        let base = self.base_url().as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let full = if path.is_empty() {
            format!("{base}/api/1.0/instances/{}", self.scope())
        } else {
            format!("{base}/api/1.0/instances/{}/{path}", self.scope())
        };
        Ok(Url::parse(&full)?)
    }
}

impl FromStr for Endpoint {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local { base_url } => write!(f, "{}", base_url.as_str().trim_end_matches('/')),
            Self::Cloud { service_id, .. } => write!(f, "cloud license service {service_id}"),
        }
    }
}

/// Cloud license service ids are 12 characters of `0-9` and `A-Z`.
fn validate_cloud_id(value: &str) -> Result<(), Error> {
    let valid = value.len() == CLOUD_ID_LEN
        && value
            .bytes()
            .all(|b| b.is_ascii_digit() || b.is_ascii_uppercase());
    if valid {
        Ok(())
    } else {
        Err(Error::InvalidEndpoint {
            value: value.to_owned(),
            reason: "expected an http(s) URL, or a cloud license service id that is \
                     12 characters long and only includes 0-9,A-Z"
                .into(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn url_is_local_with_tilde_scope() {
        let ep = Endpoint::parse("https://10.0.1.1:7071").unwrap();
        assert!(matches!(ep, Endpoint::Local { .. }));
        assert_eq!(ep.scope(), "~");
        assert!(!ep.is_cleartext());
        assert_eq!(
            ep.instance_url("features").unwrap().as_str(),
            "https://10.0.1.1:7071/api/1.0/instances/~/features"
        );
    }

    #[test]
    fn trailing_slash_does_not_double_up() {
        let ep = Endpoint::parse("http://ls.example.com:7070/").unwrap();
        assert!(ep.is_cleartext());
        assert_eq!(
            ep.instance_url("/authorize").unwrap().as_str(),
            "http://ls.example.com:7070/api/1.0/instances/~/authorize"
        );
        assert_eq!(
            ep.instance_url("").unwrap().as_str(),
            "http://ls.example.com:7070/api/1.0/instances/~"
        );
    }

    #[test]
    fn cloud_id_uses_hosted_service() {
        let ep = Endpoint::parse("1EJD8DXUKQWQ").unwrap();
        assert_eq!(ep.scope(), "1EJD8DXUKQWQ");
        assert_eq!(
            ep.instance_url("features").unwrap().as_str(),
            "https://teradici.compliance.flexnetoperations.com/api/1.0/instances/1EJD8DXUKQWQ/features"
        );
    }

    #[test]
    fn cloud_url_override_keeps_service_id() {
        let ep = Endpoint::parse("1EJD8DXUKQWQ")
            .unwrap()
            .with_cloud_url(Url::parse("http://127.0.0.1:9000").unwrap());
        assert_eq!(
            ep.instance_url("authorize").unwrap().as_str(),
            "http://127.0.0.1:9000/api/1.0/instances/1EJD8DXUKQWQ/authorize"
        );
    }

    #[test]
    fn malformed_cloud_ids_are_rejected() {
        for bad in ["1ejd8dxukqwq", "1EJD8DXUKQW", "1EJD8DXUKQWQX", "1EJD-DXUKQWQ", ""] {
            assert!(
                matches!(Endpoint::parse(bad), Err(Error::InvalidEndpoint { .. })),
                "expected {bad:?} to be rejected"
            );
        }
    }
}

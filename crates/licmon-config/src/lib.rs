//! Configuration profiles for licmon.
//!
//! TOML profiles, credential resolution (env + plaintext), and
//! translation to `licmon_core::ConnectionConfig`. The CLI layers its
//! flag and environment overrides on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use licmon_api::{Credentials, Endpoint, TlsMode};
use licmon_core::ConnectionConfig;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no license server configured for profile '{profile}'")]
    NoServer { profile: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found in config")]
    UnknownProfile { name: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named license server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Look up a profile by name, or the default profile when `name` is `None`.
    ///
    /// A missing default profile is not an error; an explicitly requested
    /// one is.
    pub fn profile(&self, name: Option<&str>) -> Result<Option<(&str, &Profile)>, ConfigError> {
        if let Some(name) = name {
            return self
                .profiles
                .get_key_value(name)
                .map(|(k, p)| Some((k.as_str(), p)))
                .ok_or_else(|| ConfigError::UnknownProfile { name: name.into() });
        }

        let default = self.default_profile.as_deref().unwrap_or("default");
        Ok(self
            .profiles
            .get_key_value(default)
            .map(|(k, p)| (k.as_str(), p)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_format")]
    pub format: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            format: default_format(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
        }
    }
}

fn default_format() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named license server profile. Every field is optional so a profile
/// can be completed from flags or the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Server URL (`https://host:7070`) or 12-character cloud service id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ls_uri: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Password in plaintext. Prefer `password_env`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Environment variable holding the password.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_env: Option<String>,

    /// Override the cloud license service host.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,

    /// Reporting window length in minutes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_threshold: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_file: Option<PathBuf>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "licmon", "licmon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("licmon");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file. A missing file yields the defaults.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("LICMON_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if it can't be read.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the password from the profile's `password_env`, then plaintext.
pub fn resolve_password(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = profile.password_env {
        if let Ok(val) = std::env::var(env_name) {
            return Ok(SecretString::from(val));
        }
    }

    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation to core types ───────────────────────────────────────

/// Parse a server URL or cloud id, applying an optional cloud host override.
pub fn resolve_endpoint(ls_uri: &str, cloud_url: Option<&str>) -> Result<Endpoint, ConfigError> {
    let endpoint = Endpoint::parse(ls_uri).map_err(|e| ConfigError::Validation {
        field: "ls_uri".into(),
        reason: e.to_string(),
    })?;

    match cloud_url {
        Some(raw) => {
            let url = Url::parse(raw).map_err(|e| ConfigError::Validation {
                field: "cloud_url".into(),
                reason: format!("invalid URL '{raw}': {e}"),
            })?;
            Ok(endpoint.with_cloud_url(url))
        }
        None => Ok(endpoint),
    }
}

/// `insecure` wins over a custom CA; otherwise the system roots are used.
pub fn tls_mode(insecure: bool, ca_cert: Option<&Path>) -> TlsMode {
    if insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(path) = ca_cert {
        TlsMode::CustomCa(path.to_path_buf())
    } else {
        TlsMode::System
    }
}

/// Build a `ConnectionConfig` from a profile, no CLI flag overrides.
pub fn profile_to_connection_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<ConnectionConfig, ConfigError> {
    let ls_uri = profile
        .ls_uri
        .as_deref()
        .ok_or_else(|| ConfigError::NoServer {
            profile: profile_name.into(),
        })?;
    let endpoint = resolve_endpoint(ls_uri, profile.cloud_url.as_deref())?;

    let username = profile
        .username
        .clone()
        .ok_or_else(|| ConfigError::NoCredentials {
            profile: profile_name.into(),
        })?;
    let password = resolve_password(profile, profile_name)?;

    let mut config = ConnectionConfig::new(endpoint, Credentials { username, password });
    config.tls = tls_mode(
        profile.insecure.unwrap_or(defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    fn local_profile() -> Profile {
        Profile {
            ls_uri: Some("https://licenses.example.com:7070".into()),
            username: Some("admin".into()),
            password: Some("hunter2".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.default_profile.as_deref(), Some("default"));
        assert_eq!(config.defaults.timeout, 30);
        assert_eq!(config.defaults.format, "table");
    }

    #[test]
    fn loads_profiles_from_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
default_profile = "lab"

[defaults]
timeout = 10

[profiles.lab]
ls_uri = "1EJD8DXUKQWQ"
username = "ops"
password_env = "LICMON_TEST_UNSET_PASSWORD_VAR"
duration_minutes = 60
alert_threshold = 90
"#,
        )
        .unwrap();

        let config = load_config_from(&path).unwrap();
        let (name, profile) = config.profile(None).unwrap().unwrap();

        assert_eq!(name, "lab");
        assert_eq!(profile.ls_uri.as_deref(), Some("1EJD8DXUKQWQ"));
        assert_eq!(profile.duration_minutes, Some(60));
        assert_eq!(profile.alert_threshold, Some(90));
        assert_eq!(config.defaults.timeout, 10);
        assert_eq!(config.defaults.color, "auto");
    }

    #[test]
    fn save_then_load_preserves_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.profiles.insert("default".into(), local_profile());
        save_config_to(&config, &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("[profiles.default]"));
        assert!(!written.contains("cloud_url"));

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.profiles["default"], local_profile());
    }

    #[test]
    fn explicit_unknown_profile_is_an_error() {
        let config = Config::default();
        assert!(config.profile(None).unwrap().is_none());
        assert!(matches!(
            config.profile(Some("nope")),
            Err(ConfigError::UnknownProfile { .. })
        ));
    }

    #[test]
    fn password_falls_back_to_plaintext_when_env_is_unset() {
        let profile = Profile {
            password_env: Some("LICMON_TEST_UNSET_PASSWORD_VAR".into()),
            ..local_profile()
        };
        let pw = resolve_password(&profile, "default").unwrap();
        assert_eq!(pw.expose_secret(), "hunter2");

        let none = Profile {
            password: None,
            ..profile
        };
        assert!(matches!(
            resolve_password(&none, "default"),
            Err(ConfigError::NoCredentials { .. })
        ));
    }

    #[test]
    fn tls_mode_precedence() {
        let ca = Path::new("/etc/ssl/ls.pem");
        assert_eq!(tls_mode(true, Some(ca)), TlsMode::DangerAcceptInvalid);
        assert_eq!(tls_mode(false, Some(ca)), TlsMode::CustomCa(ca.to_path_buf()));
        assert_eq!(tls_mode(false, None), TlsMode::System);
    }

    #[test]
    fn cloud_url_override_applies_to_cloud_ids() {
        let endpoint = resolve_endpoint("1EJD8DXUKQWQ", Some("https://staging.example.com")).unwrap();
        assert_eq!(endpoint.base_url().as_str(), "https://staging.example.com/");
        assert_eq!(endpoint.scope(), "1EJD8DXUKQWQ");

        assert!(matches!(
            resolve_endpoint("not-a-cloud-id", None),
            Err(ConfigError::Validation { ref field, .. }) if field == "ls_uri"
        ));
    }

    #[test]
    fn profile_translates_to_connection_config() {
        let profile = Profile {
            timeout: Some(5),
            insecure: Some(true),
            ..local_profile()
        };
        let config =
            profile_to_connection_config(&profile, "default", &Defaults::default()).unwrap();

        assert_eq!(config.credentials.username, "admin");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.tls, TlsMode::DangerAcceptInvalid);
        assert_eq!(config.endpoint.scope(), "~");
    }

    #[test]
    fn profile_without_server_is_rejected() {
        let profile = Profile {
            ls_uri: None,
            ..local_profile()
        };
        assert!(matches!(
            profile_to_connection_config(&profile, "lab", &Defaults::default()),
            Err(ConfigError::NoServer { ref profile }) if profile == "lab"
        ));
    }
}

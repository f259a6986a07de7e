//! CLI configuration: thin wrapper around `licmon_config` shared types.
//!
//! Adds the `GlobalOpts`-aware resolution: flag > environment > profile >
//! built-in default. Clap already folds the environment into the flags.

use std::io::IsTerminal;
use std::path::PathBuf;
use std::time::Duration;

use clap::ValueEnum;

use licmon_core::{AlertThreshold, ConnectionConfig, MonitorConfig};

use crate::cli::{
    ColorMode, DEFAULT_ALERT_THRESHOLD, DEFAULT_DURATION_MINUTES, GlobalOpts, MonitorArgs,
    OutputFormat,
};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use licmon_config::{
    Config, Profile, config_path, load_config, load_config_or_default, save_config,
};

const MINUTE: Duration = Duration::from_secs(60);

// ── Profile selection ───────────────────────────────────────────────

/// The selected profile's name and contents, if one exists.
pub fn active_profile(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, Option<Profile>), CliError> {
    match config.profile(global.profile.as_deref()) {
        Ok(Some((name, profile))) => Ok((name.to_owned(), Some(profile.clone()))),
        Ok(None) => Ok((
            config
                .default_profile
                .clone()
                .unwrap_or_else(|| "default".into()),
            None,
        )),
        Err(licmon_config::ConfigError::UnknownProfile { name }) => {
            let mut names: Vec<_> = config.profiles.keys().cloned().collect();
            names.sort();
            let available = if names.is_empty() {
                "(none)".into()
            } else {
                names.join(", ")
            };
            Err(CliError::ProfileNotFound { name, available })
        }
        Err(e) => Err(e.into()),
    }
}

// ── Connection ──────────────────────────────────────────────────────

/// Translate flags + profile into a `ConnectionConfig`.
///
/// Flags are laid over the selected profile, then the merged profile goes
/// through the same translation a flag-less run would use.
pub fn resolve_connection(
    global: &GlobalOpts,
    config: &Config,
) -> Result<ConnectionConfig, CliError> {
    let (profile_name, profile) = active_profile(global, config)?;
    let mut merged = profile.unwrap_or_default();

    // 1. Server (flag/env > profile)
    if let Some(ref uri) = global.ls_uri {
        merged.ls_uri = Some(uri.clone());
    }
    if merged.ls_uri.is_none() {
        return Err(CliError::NoServer {
            path: config_path().display().to_string(),
        });
    }

    // 2. Credentials
    if let Some(ref user) = global.ls_username {
        merged.username = Some(user.clone());
    }
    if let Some(ref pw) = global.ls_password {
        merged.password = Some(pw.clone());
        merged.password_env = None;
    } else if let Some(pw) = prompt_password(&merged, &profile_name)? {
        merged.password = Some(pw);
    }

    // 3. TLS and timeout
    if global.insecure {
        merged.insecure = Some(true);
    }
    if let Some(ref ca) = global.ca_cert {
        merged.ca_cert = Some(ca.clone());
    }
    if let Some(secs) = global.timeout {
        merged.timeout = Some(secs);
    }

    Ok(licmon_config::profile_to_connection_config(
        &merged,
        &profile_name,
        &config.defaults,
    )?)
}

/// Ask on the terminal when the profile chain has no password.
///
/// `None` means there is nothing to ask for (no username, or the profile
/// already resolves a password) or no terminal to ask on; a missing
/// password is then reported by the translation.
fn prompt_password(profile: &Profile, profile_name: &str) -> Result<Option<String>, CliError> {
    if profile.username.is_none()
        || licmon_config::resolve_password(profile, profile_name).is_ok()
        || !std::io::stdin().is_terminal()
    {
        return Ok(None);
    }
    rpassword::prompt_password("License server password: ")
        .map(Some)
        .map_err(|e| CliError::Validation {
            field: "password".into(),
            reason: format!("prompt failed: {e}"),
        })
}

// ── Monitoring ──────────────────────────────────────────────────────

/// Sampling settings and output file for `licmon monitor`.
#[derive(Debug)]
pub struct MonitorSettings {
    pub monitor: MonitorConfig,
    pub output_file: Option<PathBuf>,
}

pub fn resolve_monitor(
    args: &MonitorArgs,
    profile: Option<&Profile>,
) -> Result<MonitorSettings, CliError> {
    let duration_minutes = args
        .duration
        .or_else(|| profile.and_then(|p| p.duration_minutes))
        .unwrap_or(DEFAULT_DURATION_MINUTES);
    let threshold = args
        .alert_threshold
        .or_else(|| profile.and_then(|p| p.alert_threshold))
        .unwrap_or(DEFAULT_ALERT_THRESHOLD);

    let monitor = MonitorConfig::new(
        MINUTE * u32::try_from(duration_minutes).map_err(|_| CliError::Validation {
            field: "duration".into(),
            reason: format!("{duration_minutes} minutes is out of range"),
        })?,
        MINUTE * u32::try_from(args.delay).map_err(|_| CliError::Validation {
            field: "delay".into(),
            reason: format!("{} minutes is out of range", args.delay),
        })?,
        AlertThreshold::new(threshold)?,
    )?
    .with_max_windows(args.windows);

    let output_file = args
        .output_file
        .clone()
        .or_else(|| profile.and_then(|p| p.output_file.clone()));

    Ok(MonitorSettings {
        monitor,
        output_file,
    })
}

// ── Output settings ─────────────────────────────────────────────────

/// `--format`, else `[defaults].format`, else table.
pub fn output_format(global: &GlobalOpts, config: &Config) -> OutputFormat {
    global
        .format
        .or_else(|| OutputFormat::from_str(&config.defaults.format, true).ok())
        .unwrap_or(OutputFormat::Table)
}

/// `--color`, else `[defaults].color`, else auto.
pub fn color_mode(global: &GlobalOpts, config: &Config) -> ColorMode {
    global
        .color
        .or_else(|| ColorMode::from_str(&config.defaults.color, true).ok())
        .unwrap_or(ColorMode::Auto)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::{Cli, Command};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("licmon").chain(args.iter().copied())).unwrap()
    }

    fn config_with_lab() -> Config {
        let mut config = Config::default();
        config.default_profile = Some("lab".into());
        config.defaults.timeout = 12;
        config.profiles.insert(
            "lab".into(),
            Profile {
                ls_uri: Some("https://lab-ls:7070".into()),
                username: Some("lab-user".into()),
                password: Some("lab-pass".into()),
                duration_minutes: Some(60),
                alert_threshold: Some(90),
                ..Profile::default()
            },
        );
        config
    }

    #[test]
    fn flags_override_profile() {
        let cli = parse(&[
            "--ls-uri",
            "https://other:7070",
            "--ls-username",
            "ops",
            "--ls-password",
            "pw",
            "--timeout",
            "5",
            "features",
        ]);
        let conn = resolve_connection(&cli.global, &config_with_lab()).unwrap();

        assert_eq!(conn.endpoint.base_url().as_str(), "https://other:7070/");
        assert_eq!(conn.credentials.username, "ops");
        assert_eq!(conn.credentials.password.expose_secret(), "pw");
        assert_eq!(conn.timeout, Duration::from_secs(5));
    }

    #[test]
    fn profile_fills_what_flags_leave_out() {
        let cli = parse(&["instance"]);
        let conn = resolve_connection(&cli.global, &config_with_lab()).unwrap();

        assert_eq!(conn.endpoint.base_url().as_str(), "https://lab-ls:7070/");
        assert_eq!(conn.credentials.username, "lab-user");
        assert_eq!(conn.credentials.password.expose_secret(), "lab-pass");
        assert_eq!(conn.timeout, Duration::from_secs(12));
    }

    #[test]
    fn tls_flags_are_laid_over_the_profile() {
        let mut config = config_with_lab();
        if let Some(lab) = config.profiles.get_mut("lab") {
            lab.ca_cert = Some(PathBuf::from("/etc/lab-ca.pem"));
            lab.password_env = Some("LICMON_TEST_UNSET_PASSWORD_VAR".into());
        }

        let cli = parse(&["instance"]);
        let conn = resolve_connection(&cli.global, &config).unwrap();
        assert_eq!(
            conn.tls,
            licmon_api::TlsMode::CustomCa(PathBuf::from("/etc/lab-ca.pem"))
        );
        assert_eq!(conn.credentials.password.expose_secret(), "lab-pass");

        let cli = parse(&["-k", "--ls-password", "flag-pass", "instance"]);
        let conn = resolve_connection(&cli.global, &config).unwrap();
        assert_eq!(conn.tls, licmon_api::TlsMode::DangerAcceptInvalid);
        assert_eq!(conn.credentials.password.expose_secret(), "flag-pass");
    }

    #[test]
    fn missing_server_is_reported() {
        let cli = parse(&["features"]);
        let err = resolve_connection(&cli.global, &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoServer { .. }));
    }

    #[test]
    fn unknown_profile_lists_available_ones() {
        let cli = parse(&["--profile", "prod", "features"]);
        match resolve_connection(&cli.global, &config_with_lab()) {
            Err(CliError::ProfileNotFound { name, available }) => {
                assert_eq!(name, "prod");
                assert_eq!(available, "lab");
            }
            other => panic!("expected ProfileNotFound, got {other:?}"),
        }
    }

    #[test]
    fn monitor_defaults_and_profile_values() {
        let cli = parse(&["monitor"]);
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor command");
        };

        let defaults = resolve_monitor(&args, None).unwrap();
        assert_eq!(defaults.monitor.duration, MINUTE * 480);
        assert_eq!(defaults.monitor.delay, MINUTE);
        assert_eq!(defaults.monitor.alert_threshold.percent(), 80);
        assert_eq!(defaults.monitor.iterations(), 480);
        assert_eq!(defaults.monitor.max_windows, None);

        let config = config_with_lab();
        let from_profile = resolve_monitor(&args, config.profiles.get("lab")).unwrap();
        assert_eq!(from_profile.monitor.duration, MINUTE * 60);
        assert_eq!(from_profile.monitor.alert_threshold.percent(), 90);
    }

    #[test]
    fn monitor_flags_win_over_profile() {
        let cli = parse(&[
            "watch",
            "--duration",
            "10",
            "--delay",
            "5",
            "--alert-threshold",
            "50",
            "--windows",
            "2",
        ]);
        let Command::Monitor(args) = cli.command else {
            panic!("expected monitor command");
        };
        let config = config_with_lab();
        let settings = resolve_monitor(&args, config.profiles.get("lab")).unwrap();

        assert_eq!(settings.monitor.iterations(), 2);
        assert_eq!(settings.monitor.alert_threshold.percent(), 50);
        assert_eq!(settings.monitor.max_windows, Some(2));
    }

    #[test]
    fn format_and_color_fall_back_to_config_defaults() {
        let mut config = Config::default();
        config.defaults.format = "yaml".into();
        config.defaults.color = "never".into();

        let cli = parse(&["features"]);
        assert_eq!(output_format(&cli.global, &config), OutputFormat::Yaml);
        assert_eq!(color_mode(&cli.global, &config), ColorMode::Never);

        let cli = parse(&["--format", "json", "features"]);
        assert_eq!(output_format(&cli.global, &config), OutputFormat::Json);

        config.defaults.format = "bogus".into();
        let cli = parse(&["features"]);
        assert_eq!(output_format(&cli.global, &config), OutputFormat::Table);
    }
}

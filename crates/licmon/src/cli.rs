//! Clap derive structures for the `licmon` CLI.
//!
//! Defines the command tree, global flags, and the limits of every numeric
//! argument. Also compiled by `build.rs`, so only clap types belong here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Defaults & limits ───────────────────────────────────────────────

/// Reporting window length in minutes (8 hours).
pub const DEFAULT_DURATION_MINUTES: u64 = 480;
/// Ten days.
pub const MAX_DURATION_MINUTES: u64 = 14_400;
pub const DEFAULT_DELAY_MINUTES: u64 = 1;
pub const MAX_DELAY_MINUTES: u64 = 5;
pub const DEFAULT_ALERT_THRESHOLD: u8 = 80;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// licmon -- license server usage monitor
#[derive(Debug, Parser)]
#[command(
    name = "licmon",
    version,
    about = "Monitor license server usage and alert before pools run out",
    long_about = "Polls a local license server or the cloud license service for\n\
        Agent-Session (standard) and Agent-Graphics feature usage, reports the\n\
        peak of every window, and flags pools at or above the alert threshold.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config profile to use
    #[arg(long, short = 'p', env = "LICMON_PROFILE", global = true)]
    pub profile: Option<String>,

    /// License server URL (http[s]://host:port) or 12-character cloud service id
    #[arg(long, env = "LS_URI", global = true, value_name = "URI")]
    pub ls_uri: Option<String>,

    /// License server username
    #[arg(long, env = "LS_USERNAME", global = true, value_name = "USER")]
    pub ls_username: Option<String>,

    /// License server password
    #[arg(
        long,
        env = "LS_PASSWORD",
        global = true,
        hide_env_values = true,
        value_name = "PASSWORD"
    )]
    pub ls_password: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// PEM file with the CA that signed the server certificate
    #[arg(long, global = true, value_name = "PATH")]
    pub ca_cert: Option<PathBuf>,

    /// Request timeout in seconds [default: 30]
    #[arg(long, global = true, value_name = "SECS",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Output format for one-shot commands [default: table]
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// When to use color output [default: auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll usage continuously and report the peak of every window
    #[command(alias = "watch")]
    Monitor(MonitorArgs),

    /// List license features
    #[command(alias = "ls")]
    Features,

    /// Show a single license feature
    Feature {
        /// Feature id
        id: String,
    },

    /// List clients holding a feature
    Clients {
        /// Feature id
        feature_id: String,
    },

    /// Show license server instance details
    Instance,

    /// List reservation groups
    ReservationGroups,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  MONITOR
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct MonitorArgs {
    /// Reporting window length in minutes, 1-14400 [default: 480]
    #[arg(long, short = 'd', value_name = "MINUTES",
          value_parser = clap::value_parser!(u64).range(1..=MAX_DURATION_MINUTES))]
    pub duration: Option<u64>,

    /// Minutes between samples, 1-5
    #[arg(long, hide = true, value_name = "MINUTES", default_value_t = DEFAULT_DELAY_MINUTES,
          value_parser = clap::value_parser!(u64).range(1..=MAX_DELAY_MINUTES))]
    pub delay: u64,

    /// Usage percentage that triggers an alert, 0-100 [default: 80]
    #[arg(long, short = 'a', value_name = "PERCENT",
          value_parser = clap::value_parser!(u8).range(0..=100))]
    pub alert_threshold: Option<u8>,

    /// Append one JSON line per window to this file
    #[arg(long, short = 'o', value_name = "PATH")]
    pub output_file: Option<PathBuf>,

    /// Stop after this many windows instead of running forever
    #[arg(long, value_name = "N",
          value_parser = clap::value_parser!(u64).range(1..))]
    pub windows: Option<u64>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Create or extend the config file with guided setup
    Init,

    /// Display the current configuration (secrets masked)
    Show,

    /// Print the config file location
    Path,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

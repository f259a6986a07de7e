//! Polling and aggregation between `licmon-api` and the CLI.
//!
//! - **[`Monitor`]**: drives a [`UsageSource`] (normally the
//!   [`LicenseClient`](licmon_api::LicenseClient)) on a fixed cadence and
//!   reduces each window of samples to a [`WindowSummary`].
//! - **[`ReportSink`]**: where finished windows go; the CLI provides the
//!   console table and the JSON-lines file.
//! - **Configuration** ([`config`]): connection settings, sampling cadence,
//!   and the [`AlertThreshold`].

pub mod config;
pub mod error;
pub mod monitor;
pub mod summary;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{AlertThreshold, ConnectionConfig, MonitorConfig, sample_iterations};
pub use error::CoreError;
pub use monitor::{Monitor, ReportSink, UsageSource};
pub use summary::{Report, TIMESTAMP_FORMAT, WindowRecord, WindowSummary};

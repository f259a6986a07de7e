// ── Polling loop ──
//
// Drives a usage source on a fixed cadence, one window at a time, and hands
// each window's report to the configured sinks. Sequential: one sample in
// flight at most, and the sleep between samples suspends all work.

use licmon_api::{FeatureSnapshot, LicenseClient};
use tracing::{debug, info};

use crate::config::MonitorConfig;
use crate::error::CoreError;
use crate::summary::{Report, WindowSummary};

/// Anything that can produce a usage reading on demand.
#[allow(async_fn_in_trait)]
pub trait UsageSource {
    async fn sample(&self) -> Result<FeatureSnapshot, CoreError>;
}

impl UsageSource for LicenseClient {
    async fn sample(&self) -> Result<FeatureSnapshot, CoreError> {
        Ok(self.get_used_features().await?)
    }
}

/// Destination for per-window reports (console, file, ...).
pub trait ReportSink {
    /// Called once before the first window is sampled.
    fn start(&mut self) -> Result<(), CoreError> {
        Ok(())
    }

    fn emit(&mut self, report: &Report) -> Result<(), CoreError>;
}

/// The polling aggregator.
///
/// `delay` separates consecutive samples, including across window
/// boundaries: the first sample is taken immediately and there is no
/// trailing sleep after the last sample of a window. Every window takes the
/// full iteration count.
pub struct Monitor<S> {
    source: S,
    config: MonitorConfig,
    samples_taken: u64,
}

impl<S: UsageSource> Monitor<S> {
    pub fn new(source: S, config: MonitorConfig) -> Self {
        Self {
            source,
            config,
            samples_taken: 0,
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Total samples taken since the monitor was created.
    pub fn samples_taken(&self) -> u64 {
        self.samples_taken
    }

    /// Sample one full window and reduce it.
    pub async fn next_window(&mut self) -> Result<WindowSummary, CoreError> {
        let iterations = self.config.iterations();
        let mut snapshots = Vec::new();

        for i in 0..iterations {
            if self.samples_taken > 0 {
                tokio::time::sleep(self.config.delay).await;
            }
            let snapshot = self.source.sample().await?;
            self.samples_taken += 1;
            debug!(sample = i + 1, of = iterations, "sampled usage");
            snapshots.push(snapshot);
        }

        Ok(WindowSummary::from_snapshots(
            &snapshots,
            self.config.alert_threshold,
        ))
    }

    /// Report window after window until `max_windows` is reached.
    ///
    /// Without a window cap this only returns on error. Returns the number
    /// of windows reported.
    pub async fn run(&mut self, sinks: &mut [Box<dyn ReportSink>]) -> Result<u64, CoreError> {
        for sink in sinks.iter_mut() {
            sink.start()?;
        }

        info!(
            iterations = self.config.iterations(),
            delay = ?self.config.delay,
            threshold = %self.config.alert_threshold,
            "monitoring started"
        );

        let mut windows = 0;
        while self.config.max_windows.is_none_or(|max| windows < max) {
            let summary = self.next_window().await?;
            let report = Report::now(summary);
            info!(
                timestamp = %report.timestamp_string(),
                standard_used = report.summary.peak.standard.used,
                graphics_used = report.summary.peak.graphics.used,
                note = %report.summary.note,
                "window complete"
            );
            for sink in sinks.iter_mut() {
                sink.emit(&report)?;
            }
            windows += 1;
        }
        Ok(windows)
    }
}

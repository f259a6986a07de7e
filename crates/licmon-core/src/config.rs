// ── Runtime monitoring configuration ──
//
// These types describe *how* to reach the license server and *how* to
// sample it. They carry credential data and timing, but never touch disk.
// The CLI constructs them from flags, environment, and profiles.

use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

use licmon_api::{
    Credentials, Endpoint, FeatureUsage, LicenseClient, RetryPolicy, TlsMode, TransportConfig,
};

use crate::error::CoreError;

// ── Connection ───────────────────────────────────────────────────────

/// Everything needed to build an authenticated [`LicenseClient`].
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    pub endpoint: Endpoint,
    pub credentials: Credentials,
    pub tls: TlsMode,
    /// Per-request timeout.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ConnectionConfig {
    pub fn new(endpoint: Endpoint, credentials: Credentials) -> Self {
        Self {
            endpoint,
            credentials,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            retry: self.retry.clone(),
        }
    }

    /// Build a client and authenticate it.
    pub async fn connect(&self) -> Result<LicenseClient, CoreError> {
        let client = LicenseClient::connect(
            self.endpoint.clone(),
            self.credentials.clone(),
            &self.transport(),
        )
        .await?;
        Ok(client)
    }
}

// ── Alert threshold ──────────────────────────────────────────────────

/// Usage percentage (0–100) at or above which a feature class alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct AlertThreshold(u8);

impl AlertThreshold {
    pub const MAX: u8 = 100;

    pub fn new(percent: u8) -> Result<Self, CoreError> {
        if percent > Self::MAX {
            return Err(CoreError::Validation {
                field: "alert threshold".into(),
                reason: format!("{percent} is not a percentage between 0 and {}", Self::MAX),
            });
        }
        Ok(Self(percent))
    }

    pub fn percent(self) -> u8 {
        self.0
    }

    /// `100 * used / count >= threshold`, only when `count > 0`.
    ///
    /// Evaluated as `100 * used >= threshold * count` so no precision is lost.
    pub fn is_breached_by(self, usage: FeatureUsage) -> bool {
        if usage.count == 0 {
            return false;
        }
        let used = u128::from(usage.used) * 100;
        let limit = u128::from(self.0) * u128::from(usage.count);
        used >= limit
    }
}

impl fmt::Display for AlertThreshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ── Sampling ─────────────────────────────────────────────────────────

/// Sampling cadence and alerting for the polling loop.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Length of one reporting window.
    pub duration: Duration,
    /// Pause between consecutive samples.
    pub delay: Duration,
    pub alert_threshold: AlertThreshold,
    /// Stop after this many reports. `None` runs until the process ends.
    pub max_windows: Option<u64>,
}

impl MonitorConfig {
    pub fn new(
        duration: Duration,
        delay: Duration,
        alert_threshold: AlertThreshold,
    ) -> Result<Self, CoreError> {
        if delay.is_zero() {
            return Err(CoreError::Validation {
                field: "delay".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(Self {
            duration,
            delay,
            alert_threshold,
            max_windows: None,
        })
    }

    pub fn with_max_windows(mut self, max_windows: Option<u64>) -> Self {
        self.max_windows = max_windows;
        self
    }

    /// Samples per window.
    pub fn iterations(&self) -> u64 {
        sample_iterations(self.duration, self.delay)
    }
}

/// `round(duration / delay)`, never less than 1.
///
/// Ties round to even, computed on whole milliseconds.
pub fn sample_iterations(duration: Duration, delay: Duration) -> u64 {
    let total = duration.as_millis();
    let step = delay.as_millis();
    if step == 0 {
        return 1;
    }

    let quotient = total / step;
    let remainder = total % step;
    let rounded = match (remainder * 2).cmp(&step) {
        Ordering::Less => quotient,
        Ordering::Greater => quotient + 1,
        Ordering::Equal if quotient % 2 == 0 => quotient,
        Ordering::Equal => quotient + 1,
    };

    u64::try_from(rounded).unwrap_or(u64::MAX).max(1)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const MINUTE: Duration = Duration::from_secs(60);

    #[test]
    fn iterations_divide_duration_by_delay() {
        assert_eq!(sample_iterations(MINUTE * 480, MINUTE), 480);
        assert_eq!(sample_iterations(MINUTE * 10, MINUTE * 5), 2);
        assert_eq!(sample_iterations(Duration::from_secs(8 * 3600), Duration::from_secs(30)), 960);
    }

    #[test]
    fn iterations_round_to_nearest() {
        assert_eq!(sample_iterations(MINUTE * 7, MINUTE * 4), 2);
        assert_eq!(sample_iterations(MINUTE * 9, MINUTE * 5), 2);
        assert_eq!(sample_iterations(MINUTE * 11, MINUTE * 5), 2);
        assert_eq!(sample_iterations(MINUTE * 13, MINUTE * 5), 3);
    }

    #[test]
    fn iterations_ties_go_to_even() {
        assert_eq!(sample_iterations(MINUTE * 5, MINUTE * 2), 2);
        assert_eq!(sample_iterations(MINUTE * 7, MINUTE * 2), 4);
        assert_eq!(sample_iterations(MINUTE * 3, MINUTE * 2), 2);
    }

    #[test]
    fn iterations_never_drop_below_one() {
        assert_eq!(sample_iterations(MINUTE, MINUTE * 5), 1);
        assert_eq!(sample_iterations(Duration::ZERO, MINUTE), 1);
        assert_eq!(sample_iterations(MINUTE, Duration::ZERO), 1);
    }

    #[test]
    fn threshold_is_inclusive() {
        let threshold = AlertThreshold::new(80).unwrap();
        assert!(threshold.is_breached_by(FeatureUsage { count: 10, used: 8 }));
        assert!(!threshold.is_breached_by(FeatureUsage { count: 10, used: 7 }));
        assert!(threshold.is_breached_by(FeatureUsage { count: 3, used: 3 }));
    }

    #[test]
    fn threshold_ignores_empty_pools() {
        let zero = AlertThreshold::new(0).unwrap();
        assert!(!zero.is_breached_by(FeatureUsage { count: 0, used: 0 }));
        assert!(!zero.is_breached_by(FeatureUsage { count: 0, used: 5 }));
        assert!(zero.is_breached_by(FeatureUsage { count: 1, used: 0 }));
    }

    #[test]
    fn threshold_rejects_more_than_one_hundred() {
        assert!(AlertThreshold::new(100).is_ok());
        assert!(matches!(
            AlertThreshold::new(101),
            Err(CoreError::Validation { .. })
        ));
    }

    #[test]
    fn zero_delay_is_rejected() {
        let threshold = AlertThreshold::new(80).unwrap();
        assert!(MonitorConfig::new(MINUTE, Duration::ZERO, threshold).is_err());
        let config = MonitorConfig::new(MINUTE * 10, MINUTE, threshold).unwrap();
        assert_eq!(config.iterations(), 10);
    }
}

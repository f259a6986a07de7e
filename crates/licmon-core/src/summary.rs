// ── Window aggregation ──
//
// Reduces the snapshots of one reporting window to peak usage per feature
// class and derives the alert note.

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use strum::IntoEnumIterator;

use licmon_api::{FeatureClass, FeatureSnapshot, FeatureUsage};

use crate::config::AlertThreshold;

/// Timestamp format used on the console and as the record key.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Peak usage over one window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowSummary {
    /// Highest `count` and highest `used` seen per class.
    pub peak: FeatureSnapshot,
    /// Comma-joined `"<class> threshold alert"` entries, standard first.
    pub note: String,
    /// Number of snapshots that went into the summary.
    pub samples: usize,
}

impl WindowSummary {
    pub fn from_snapshots(snapshots: &[FeatureSnapshot], threshold: AlertThreshold) -> Self {
        let peak = peak_usage(snapshots);
        Self {
            note: alert_note(&peak, threshold),
            peak,
            samples: snapshots.len(),
        }
    }

    pub fn usage(&self, class: FeatureClass) -> FeatureUsage {
        self.peak.usage(class)
    }

    pub fn has_alert(&self) -> bool {
        !self.note.is_empty()
    }
}

/// Element-wise maximum of every field of every class.
///
/// The two maxima of a class may come from different snapshots.
pub fn peak_usage(snapshots: &[FeatureSnapshot]) -> FeatureSnapshot {
    snapshots
        .iter()
        .fold(FeatureSnapshot::default(), |acc, snap| FeatureSnapshot {
            standard: acc.standard.max(snap.standard),
            graphics: acc.graphics.max(snap.graphics),
        })
}

/// Classes at or over the threshold, in declaration order.
pub fn breached_classes(
    snapshot: &FeatureSnapshot,
    threshold: AlertThreshold,
) -> Vec<FeatureClass> {
    FeatureClass::iter()
        .filter(|class| threshold.is_breached_by(snapshot.usage(*class)))
        .collect()
}

pub fn alert_note(snapshot: &FeatureSnapshot, threshold: AlertThreshold) -> String {
    breached_classes(snapshot, threshold)
        .iter()
        .map(|class| format!("{class} threshold alert"))
        .collect::<Vec<_>>()
        .join(",")
}

// ── Reports ──────────────────────────────────────────────────────────

/// A window summary stamped with the local time it was produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub timestamp: NaiveDateTime,
    pub summary: WindowSummary,
}

impl Report {
    pub fn new(timestamp: NaiveDateTime, summary: WindowSummary) -> Self {
        Self { timestamp, summary }
    }

    pub fn now(summary: WindowSummary) -> Self {
        Self::new(Local::now().naive_local(), summary)
    }

    pub fn timestamp_string(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn record(&self) -> WindowRecord {
        let peak = &self.summary.peak;
        WindowRecord {
            available_standard_agent: peak.standard.count,
            max_used_standard_agent: peak.standard.used,
            available_graphics_agent: peak.graphics.count,
            max_used_graphics_agent: peak.graphics.used,
            note: self.summary.note.clone(),
        }
    }

    /// `{"<timestamp>": {<record>}}`, the persisted form of one window.
    pub fn keyed_record(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        map.insert(self.timestamp_string(), serde_json::json!(self.record()));
        serde_json::Value::Object(map)
    }
}

/// Flat per-window record as written to the output file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowRecord {
    pub available_standard_agent: u64,
    pub max_used_standard_agent: u64,
    pub available_graphics_agent: u64,
    pub max_used_graphics_agent: u64,
    pub note: String,
}

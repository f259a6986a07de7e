// License server response types
//
// Wire models for the `/api/1.0/instances/{scope}/...` endpoints plus the
// per-class usage snapshot derived from the feature list. Optional fields
// use `#[serde(default)]` because local and cloud servers differ in what
// they return.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoStaticStr};

use crate::error::Error;

// ── Authorization ────────────────────────────────────────────────────

/// Body of `POST .../authorize`.
#[derive(Debug, Serialize)]
pub(crate) struct AuthorizeRequest<'a> {
    pub user: &'a str,
    pub password: &'a str,
}

/// Response of `POST .../authorize`.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeResponse {
    pub token: String,
}

// ── Features ─────────────────────────────────────────────────────────

/// A licensed feature as returned by `GET .../features`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    pub feature_name: String,
    #[serde(default)]
    pub feature_version: Option<String>,
    /// Total seats for this feature. Uncounted features send `null` or omit it.
    #[serde(default)]
    pub feature_count: Option<u64>,
    /// Seats currently checked out.
    #[serde(default)]
    pub used: Option<u64>,
    #[serde(default)]
    pub overdraft_count: Option<u64>,
    #[serde(default)]
    pub expiry: Option<String>,
    /// Everything else the server sends.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Feature {
    /// The usage class this feature counts towards, if any.
    pub fn class(&self) -> Option<FeatureClass> {
        FeatureClass::from_feature_name(&self.feature_name)
    }
}

// ── Usage snapshot ───────────────────────────────────────────────────

/// The two license pools that are monitored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FeatureClass {
    /// `Agent-Session` seats.
    Standard,
    /// `Agent-Graphics` seats.
    Graphics,
}

impl FeatureClass {
    pub const AGENT_SESSION: &'static str = "Agent-Session";
    pub const AGENT_GRAPHICS: &'static str = "Agent-Graphics";

    pub fn from_feature_name(name: &str) -> Option<Self> {
        match name {
            Self::AGENT_SESSION => Some(Self::Standard),
            Self::AGENT_GRAPHICS => Some(Self::Graphics),
            _ => None,
        }
    }
}

/// Seat totals for one feature class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureUsage {
    /// Total licenses.
    pub count: u64,
    /// Concurrently active licenses.
    pub used: u64,
}

impl FeatureUsage {
    /// Field-wise maximum of two readings.
    pub fn max(self, other: Self) -> Self {
        Self {
            count: self.count.max(other.count),
            used: self.used.max(other.used),
        }
    }
}

/// A point-in-time reading of both feature classes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub standard: FeatureUsage,
    pub graphics: FeatureUsage,
}

/// Seat counts of a feature in a monitored class; both are mandatory there.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CountedFeature {
    feature_count: u64,
    used: u64,
}

impl FeatureSnapshot {
    /// Sum `featureCount` / `used` per class from a raw feature list.
    ///
    /// Entries whose `featureName` is not a monitored class are skipped
    /// without looking at their other fields, so an odd-shaped add-on can
    /// never fail a poll. Monitored entries must carry both counts.
    pub fn from_feature_list(features: &[serde_json::Value]) -> Result<Self, Error> {
        let mut snapshot = Self::default();
        for raw in features {
            let Some(class) = raw
                .get("featureName")
                .and_then(serde_json::Value::as_str)
                .and_then(FeatureClass::from_feature_name)
            else {
                continue;
            };
            let counted =
                CountedFeature::deserialize(raw).map_err(|e| Error::Deserialization {
                    message: format!("{class} feature without usable seat counts: {e}"),
                    body: raw.to_string(),
                })?;
            let usage = snapshot.usage_mut(class);
            usage.count = usage.count.saturating_add(counted.feature_count);
            usage.used = usage.used.saturating_add(counted.used);
        }
        Ok(snapshot)
    }

    pub fn usage(&self, class: FeatureClass) -> FeatureUsage {
        match class {
            FeatureClass::Standard => self.standard,
            FeatureClass::Graphics => self.graphics,
        }
    }

    fn usage_mut(&mut self, class: FeatureClass) -> &mut FeatureUsage {
        match class {
            FeatureClass::Standard => &mut self.standard,
            FeatureClass::Graphics => &mut self.graphics,
        }
    }
}

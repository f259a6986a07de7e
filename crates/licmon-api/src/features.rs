// Feature endpoints
//
// Feature inventory, per-feature detail and checkouts, and the reduced
// per-class usage snapshot the monitor polls.

use tracing::debug;
use url::Url;

use crate::client::LicenseClient;
use crate::error::Error;
use crate::models::{Feature, FeatureSnapshot};

impl LicenseClient {
    /// List every feature on the instance.
    ///
    /// `GET {instance}/features`
    pub async fn get_features(&self) -> Result<Vec<Feature>, Error> {
        debug!("listing features");
        self.get("features").await
    }

    /// Fetch a single feature.
    ///
    /// `GET {instance}/features/{id}`
    pub async fn get_feature(&self, feature_id: &str) -> Result<Feature, Error> {
        debug!(feature_id, "fetching feature");
        self.get_url(self.feature_url(feature_id, &[])?).await
    }

    /// Clients currently holding seats of a feature.
    ///
    /// `GET {instance}/features/{id}/clients`
    ///
    /// Returns loosely-typed JSON because the record shape differs between
    /// local and cloud servers.
    pub async fn get_feature_clients(
        &self,
        feature_id: &str,
    ) -> Result<Vec<serde_json::Value>, Error> {
        debug!(feature_id, "listing feature clients");
        self.get_url(self.feature_url(feature_id, &["clients"])?)
            .await
    }

    /// Poll the feature list and reduce it to per-class seat totals.
    ///
    /// Decoded loosely so features outside the monitored classes are never
    /// inspected beyond their name.
    pub async fn get_used_features(&self) -> Result<FeatureSnapshot, Error> {
        let features: Vec<serde_json::Value> = self.get("features").await?;
        let snapshot = FeatureSnapshot::from_feature_list(&features)?;
        debug!(
            standard_count = snapshot.standard.count,
            standard_used = snapshot.standard.used,
            graphics_count = snapshot.graphics.count,
            graphics_used = snapshot.graphics.used,
            "usage snapshot"
        );
        Ok(snapshot)
    }

    /// `{instance}/features/{id}[/tail...]` with `id` encoded as one segment.
    fn feature_url(&self, feature_id: &str, tail: &[&str]) -> Result<Url, Error> {
        let mut url = self.instance_url("features")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(feature_id)
            .extend(tail);
        Ok(url)
    }
}

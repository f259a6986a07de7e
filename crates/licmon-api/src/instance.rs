// Instance-level endpoints
//
// Server instance metadata and reservation groups.

use tracing::debug;

use crate::client::LicenseClient;
use crate::error::Error;

impl LicenseClient {
    /// Describe the license server instance.
    ///
    /// `GET {instance}`
    ///
    /// Returns loosely-typed JSON because the field set varies between
    /// server versions.
    pub async fn get_instance(&self) -> Result<serde_json::Value, Error> {
        debug!("fetching instance");
        self.get("").await
    }

    /// List reservation groups.
    ///
    /// `GET {instance}/reservationgroups`
    pub async fn get_reservation_groups(&self) -> Result<Vec<serde_json::Value>, Error> {
        debug!("listing reservation groups");
        self.get("reservationgroups").await
    }
}

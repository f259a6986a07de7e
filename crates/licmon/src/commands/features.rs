//! Feature command handlers: `features`, `feature <id>`, `clients <id>`.

use tabled::Tabled;

use licmon_api::{Feature, LicenseClient};
use licmon_core::CoreError;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct FeatureRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "Class")]
    class: String,
    #[tabled(rename = "Count")]
    count: String,
    #[tabled(rename = "Used")]
    used: String,
    #[tabled(rename = "Expiry")]
    expiry: String,
}

impl From<&Feature> for FeatureRow {
    fn from(f: &Feature) -> Self {
        Self {
            id: feature_id(f),
            name: f.feature_name.clone(),
            version: f.feature_version.clone().unwrap_or_default(),
            class: f.class().as_ref().map(ToString::to_string).unwrap_or_default(),
            count: seats(f.feature_count),
            used: seats(f.used),
            expiry: f.expiry.clone().unwrap_or_else(|| "permanent".into()),
        }
    }
}

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "Client")]
    client: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&serde_json::Value> for ClientRow {
    fn from(v: &serde_json::Value) -> Self {
        let client = ["clientId", "hostId", "id", "name"]
            .iter()
            .find_map(|key| v.get(key))
            .map(|id| id.as_str().map_or_else(|| id.to_string(), str::to_owned))
            .unwrap_or_default();
        Self {
            client,
            details: v.to_string(),
        }
    }
}

/// Uncounted features show a dash instead of a seat number.
fn seats(value: Option<u64>) -> String {
    value.map_or_else(|| "-".into(), |n| n.to_string())
}

fn feature_id(f: &Feature) -> String {
    match &f.id {
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn feature_detail(f: &Feature) -> Result<String, CliError> {
    let mut value = serde_json::to_value(f)?;
    if let (Some(map), Some(class)) = (value.as_object_mut(), f.class()) {
        map.insert("class".into(), class.to_string().into());
    }
    Ok(output::render_detail(&value))
}

/// A 404 on a feature path means the id is wrong, not that the server failed.
fn not_found_as_missing(err: licmon_api::Error, id: &str) -> CliError {
    if err.status() == Some(404) {
        return CliError::NotFound {
            resource: "feature".into(),
            identifier: id.to_owned(),
        };
    }
    CoreError::from(err).into()
}

// ── Handlers ────────────────────────────────────────────────────────

pub async fn list(
    client: &LicenseClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let features = client.get_features().await.map_err(CoreError::from)?;
    let out = output::render_list(format, &features, |f| FeatureRow::from(f))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn get(
    client: &LicenseClient,
    id: &str,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let feature = client
        .get_feature(id)
        .await
        .map_err(|e| not_found_as_missing(e, id))?;
    let out = output::render_single(format, &feature, feature_detail)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn clients(
    client: &LicenseClient,
    feature_id: &str,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let holders = client
        .get_feature_clients(feature_id)
        .await
        .map_err(|e| not_found_as_missing(e, feature_id))?;
    let out = output::render_list(format, &holders, |c| ClientRow::from(c))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn feature_row_shows_class_and_permanent_expiry() {
        let feature: Feature = serde_json::from_value(json!({
            "id": 7, "featureName": "Agent-Graphics", "featureVersion": "1.0",
            "featureCount": 4, "used": 1
        }))
        .unwrap();
        let row = FeatureRow::from(&feature);

        assert_eq!(row.id, "7");
        assert_eq!(row.class, "graphics");
        assert_eq!(row.count, "4");
        assert_eq!(row.expiry, "permanent");
    }

    #[test]
    fn uncounted_feature_row_shows_dashes() {
        let feature: Feature = serde_json::from_value(json!({
            "featureName": "Uncounted-Addon", "featureCount": null
        }))
        .unwrap();
        let row = FeatureRow::from(&feature);

        assert_eq!(row.count, "-");
        assert_eq!(row.used, "-");
        assert_eq!(row.class, "");
    }

    #[test]
    fn client_row_picks_first_identifier() {
        let row = ClientRow::from(&json!({ "hostId": "HOST-1", "used": 1 }));
        assert_eq!(row.client, "HOST-1");

        let row = ClientRow::from(&json!({ "id": 12 }));
        assert_eq!(row.client, "12");
    }
}

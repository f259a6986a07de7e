//! Instance command handlers: `instance`, `reservation-groups`.

use tabled::Tabled;

use licmon_api::LicenseClient;
use licmon_core::CoreError;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct GroupRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Details")]
    details: String,
}

impl From<&serde_json::Value> for GroupRow {
    fn from(v: &serde_json::Value) -> Self {
        Self {
            name: v
                .get("name")
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_owned(),
            details: v.to_string(),
        }
    }
}

pub async fn show(
    client: &LicenseClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let instance = client.get_instance().await.map_err(CoreError::from)?;
    let out = output::render_single(format, &instance, |v| Ok(output::render_detail(v)))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn reservation_groups(
    client: &LicenseClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    let groups = client
        .get_reservation_groups()
        .await
        .map_err(CoreError::from)?;
    let out = output::render_list(format, &groups, |g| GroupRow::from(g))?;
    output::print_output(&out, global.quiet);
    Ok(())
}

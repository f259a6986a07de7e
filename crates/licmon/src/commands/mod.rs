//! Command dispatch: bridges CLI args -> license server reads -> output formatting.

pub mod config_cmd;
pub mod features;
pub mod instance;
pub mod monitor;

use licmon_api::LicenseClient;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;

/// Dispatch a one-shot read to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    client: &LicenseClient,
    global: &GlobalOpts,
    format: OutputFormat,
) -> Result<(), CliError> {
    match cmd {
        Command::Features => features::list(client, global, format).await,
        Command::Feature { id } => features::get(client, &id, global, format).await,
        Command::Clients { feature_id } => {
            features::clients(client, &feature_id, global, format).await
        }
        Command::Instance => instance::show(client, global, format).await,
        Command::ReservationGroups => instance::reservation_groups(client, global, format).await,
        // Monitor, Config and Completions are handled before dispatch
        Command::Monitor(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Validation {
                field: "command".into(),
                reason: "not a one-shot read".into(),
            })
        }
    }
}

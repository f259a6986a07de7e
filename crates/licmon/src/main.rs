mod cli;
mod commands;
mod config;
mod error;
mod output;
mod report;

use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    init_tracing(cli.global.verbose);

    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Logs go to stderr so they never interleave with the usage table.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a license server
        Command::Config(ref args) => commands::config_cmd::handle(args, &cli.global),

        Command::Completions(ref args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "licmon", &mut std::io::stdout());
            Ok(())
        }

        Command::Monitor(ref args) => {
            let cfg = config::load_config()?;
            commands::monitor::handle(args, &cli.global, &cfg).await
        }

        // One-shot reads
        cmd => {
            let cfg = config::load_config()?;
            let conn = config::resolve_connection(&cli.global, &cfg)?;
            if conn.endpoint.is_cleartext() {
                warn!(endpoint = %conn.endpoint, "credentials are sent over plain HTTP");
            }
            let client = conn.connect().await?;
            let format = config::output_format(&cli.global, &cfg);

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &cli.global, format).await
        }
    }
}

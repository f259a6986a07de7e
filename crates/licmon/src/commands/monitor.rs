//! `licmon monitor`: the continuous polling loop.

use tracing::{info, warn};

use licmon_core::{Monitor, ReportSink};

use crate::cli::{GlobalOpts, MonitorArgs};
use crate::config::{self, Config};
use crate::error::CliError;
use crate::output;
use crate::report::{ConsoleTable, JsonLinesFile};

pub async fn handle(args: &MonitorArgs, global: &GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    let (_, profile) = config::active_profile(global, cfg)?;
    let settings = config::resolve_monitor(args, profile.as_ref())?;
    let conn = config::resolve_connection(global, cfg)?;

    if conn.endpoint.is_cleartext() {
        warn!(
            endpoint = %conn.endpoint,
            "license server is reached over plain HTTP; the username and password \
             are sent in clear text. Prefer an HTTPS license server."
        );
    }

    // Fail fast on bad credentials before the first window starts.
    let client = conn.connect().await?;

    let mut sinks: Vec<Box<dyn ReportSink>> = Vec::new();
    if !global.quiet {
        eprintln!(
            "Output will appear on the console every {}\n",
            humantime::format_duration(settings.monitor.duration)
        );
        let color = output::should_color(config::color_mode(global, cfg));
        sinks.push(Box::new(ConsoleTable::stdout(color)));
    }
    if let Some(ref path) = settings.output_file {
        let file = JsonLinesFile::open(path)?;
        info!(path = %file.path().display(), "writing window records");
        sinks.push(Box::new(file));
    }

    let mut monitor = Monitor::new(client, settings.monitor);
    let windows = monitor.run(&mut sinks).await?;
    info!(windows, samples = monitor.samples_taken(), "monitoring finished");
    Ok(())
}

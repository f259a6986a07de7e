//! Report sinks for `licmon monitor`.
//!
//! - [`ConsoleTable`] prints a fixed-width usage table to stdout.
//! - [`JsonLinesFile`] appends one `{"<timestamp>": {record}}` line per window.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use tracing::debug;

use licmon_core::{CoreError, Report, ReportSink};

// ── Console table ───────────────────────────────────────────────────

const HEADER: [&str; 6] = [
    "Date",
    "Available - Standard Agent",
    "Max Used - Standard Agent",
    "Available - Graphics Agent",
    "Max Used - Graphics Agent",
    "Notes",
];

/// Formats header and rows with the fixed 20/30/30/30/30/60 layout.
fn format_row(cells: [&str; 6]) -> String {
    let [date, avail_std, used_std, avail_gfx, used_gfx, note] = cells;
    format!("{date:>20}{avail_std:>30}{used_std:>30}{avail_gfx:>30}{used_gfx:>30}{note:>60}")
}

pub fn header_line() -> String {
    format_row(HEADER)
}

pub fn report_line(report: &Report) -> String {
    let peak = &report.summary.peak;
    format_row([
        &report.timestamp_string(),
        &peak.standard.count.to_string(),
        &peak.standard.used.to_string(),
        &peak.graphics.count.to_string(),
        &peak.graphics.used.to_string(),
        &report.summary.note,
    ])
}

/// Writes the usage table to any writer, stdout by default.
pub struct ConsoleTable<W = io::Stdout> {
    out: W,
    color: bool,
}

impl ConsoleTable {
    pub fn stdout(color: bool) -> Self {
        Self::new(io::stdout(), color)
    }
}

impl<W: Write> ConsoleTable<W> {
    pub fn new(out: W, color: bool) -> Self {
        Self { out, color }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReportSink for ConsoleTable<W> {
    fn start(&mut self) -> Result<(), CoreError> {
        let header = header_line();
        if self.color {
            writeln!(self.out, "{}", header.bold())?;
        } else {
            writeln!(self.out, "{header}")?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn emit(&mut self, report: &Report) -> Result<(), CoreError> {
        let line = report_line(report);
        if self.color && report.summary.has_alert() {
            writeln!(self.out, "{}", line.red().bold())?;
        } else {
            writeln!(self.out, "{line}")?;
        }
        self.out.flush()?;
        Ok(())
    }
}

// ── JSON lines file ─────────────────────────────────────────────────

/// Appends each window as a single JSON object line.
///
/// Lines are flushed as they are written, so the file is a valid sequence
/// of records even if the process is killed mid-run.
pub struct JsonLinesFile {
    path: PathBuf,
    out: BufWriter<File>,
}

impl JsonLinesFile {
    /// Open `path` for appending, creating it if needed.
    pub fn open(path: &Path) -> Result<Self, CoreError> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        debug!(path = %path.display(), "appending window records");
        Ok(Self {
            path: path.to_path_buf(),
            out: BufWriter::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for JsonLinesFile {
    fn emit(&mut self, report: &Report) -> Result<(), CoreError> {
        let line = serde_json::to_string(&report.keyed_record()).map_err(io::Error::from)?;
        writeln!(self.out, "{line}")?;
        self.out.flush()?;
        Ok(())
    }
}

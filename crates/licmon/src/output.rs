//! Output formatting: table, JSON, YAML.
//!
//! Renders one-shot read results in the format selected by `--format`.
//! Table uses `tabled`, structured formats use serde.

use std::io::{self, IsTerminal, Write};

use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable items in the chosen format.
///
/// - `table`: maps each item through `to_row` and builds a `tabled` table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Render a single item in the chosen format.
///
/// Table rendering uses `detail_fn`, since single-item detail views are
/// key/value listings rather than `Tabled` rows.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> Result<String, CliError>,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => detail_fn(data),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let out = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(out)
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

/// Key/value detail view of a JSON object, one `key: value` per line.
///
/// Nested values are printed as compact JSON; strings without quotes.
pub fn render_detail(value: &serde_json::Value) -> String {
    let Some(map) = value.as_object() else {
        return scalar(value);
    };
    let width = map.keys().map(String::len).max().unwrap_or(0);
    map.iter()
        .map(|(key, val)| format!("{key:<width$}  {}", scalar(val)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "-".into(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    #[test]
    fn structured_formats_serialize_the_data() {
        let data = vec![json!({ "name": "a" })];
        let to_row = |v: &serde_json::Value| Row {
            name: v["name"].as_str().unwrap_or_default().to_owned(),
        };

        let compact = render_list(OutputFormat::JsonCompact, &data, to_row).unwrap();
        assert_eq!(compact, r#"[{"name":"a"}]"#);

        let yaml = render_list(OutputFormat::Yaml, &data, to_row).unwrap();
        assert_eq!(yaml, "- name: a\n");

        let table = render_list(OutputFormat::Table, &data, to_row).unwrap();
        assert!(table.contains("Name"));
        assert!(table.contains('a'));
    }

    #[test]
    fn single_item_detail_errors_propagate() {
        let data = json!({ "name": "a" });
        let err = render_single(OutputFormat::Table, &data, |_| {
            Err(CliError::Validation {
                field: "detail".into(),
                reason: "unrenderable".into(),
            })
        })
        .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));

        let json = render_single(OutputFormat::JsonCompact, &data, |_| Ok(String::new())).unwrap();
        assert_eq!(json, r#"{"name":"a"}"#);
    }

    #[test]
    fn detail_aligns_keys_and_unquotes_strings() {
        let value = json!({ "hostId": "H1", "enabled": true, "expiry": null });
        let detail = render_detail(&value);
        assert_eq!(detail, "enabled  true\nexpiry   -\nhostId   H1");
    }

    #[test]
    fn forced_color_modes_ignore_the_terminal() {
        assert!(should_color(ColorMode::Always));
        assert!(!should_color(ColorMode::Never));
    }
}

//! Output rendering for trial records and summary rows
//!
//! Serialization is deterministic: CSV and TSV carry a stable header
//! derived from the row shape with list-valued fields joined by "; ",
//! JSON is an array of objects with lists kept as arrays, and table is a
//! human-readable grid for terminal use.

use std::str::FromStr;

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::aggregate::{AggregateOutput, SummaryRow, LIST_SEPARATOR};
use crate::error::{CliError, Result};
use crate::record::TrialRecord;

/// Column order for records-mode rows
pub const RECORD_COLUMNS: [&str; 10] = [
    "nct_id",
    "title",
    "year",
    "sponsor_class",
    "status",
    "study_type",
    "intervention_types",
    "conditions",
    "min_age_days",
    "max_age_days",
];

/// Column order for summary-mode rows
pub const SUMMARY_COLUMNS: [&str; 9] = [
    "year",
    "sponsor_class",
    "status",
    "study_type",
    "intervention_type",
    "conditions",
    "count",
    "nct_ids",
    "titles",
];

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Csv,
    Tsv,
    Json,
    Table,
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "json" => Ok(Self::Json),
            "table" => Ok(Self::Table),
            other => Err(CliError::config(format!(
                "Unknown format: '{other}'. Use csv, tsv, json, or table"
            ))),
        }
    }
}

/// Render rows in the requested format
pub fn render(output: &AggregateOutput, format: OutputFormat, no_header: bool) -> Result<String> {
    match format {
        OutputFormat::Csv => Ok(render_delimited(output, ",", no_header, true)),
        OutputFormat::Tsv => Ok(render_delimited(output, "\t", no_header, false)),
        OutputFormat::Json => render_json(output),
        OutputFormat::Table => Ok(render_table(output)),
    }
}

/// Render and write to a file or stdout
pub fn write_output(
    output: &AggregateOutput,
    format: OutputFormat,
    output_path: Option<&str>,
    no_header: bool,
) -> Result<()> {
    let rendered = render(output, format, no_header)?;

    if let Some(path) = output_path {
        std::fs::write(path, rendered)?;
        println!("{} Output written to: {}", "✓".green(), path.cyan());
    } else {
        print!("{rendered}");
    }

    Ok(())
}

fn columns(output: &AggregateOutput) -> &'static [&'static str] {
    match output {
        AggregateOutput::Records(_) => &RECORD_COLUMNS,
        AggregateOutput::Summary(_) => &SUMMARY_COLUMNS,
    }
}

fn rows(output: &AggregateOutput) -> Vec<Vec<String>> {
    match output {
        AggregateOutput::Records(records) => records.iter().map(record_cells).collect(),
        AggregateOutput::Summary(summary) => summary.iter().map(summary_cells).collect(),
    }
}

fn record_cells(record: &TrialRecord) -> Vec<String> {
    vec![
        record.nct_id.clone().unwrap_or_default(),
        record.title.clone().unwrap_or_default(),
        record.year.map(|year| year.to_string()).unwrap_or_default(),
        record.sponsor_class.clone(),
        record.status.clone(),
        record.study_type.clone(),
        record.intervention_types.join(LIST_SEPARATOR),
        record.conditions.join(LIST_SEPARATOR),
        record.min_age_days.map(|days| days.to_string()).unwrap_or_default(),
        record.max_age_days.map(|days| days.to_string()).unwrap_or_default(),
    ]
}

fn summary_cells(row: &SummaryRow) -> Vec<String> {
    vec![
        row.year.to_string(),
        row.sponsor_class.clone(),
        row.status.clone(),
        row.study_type.clone(),
        row.intervention_type.clone(),
        row.conditions.clone(),
        row.count.to_string(),
        row.nct_ids.clone(),
        row.titles.clone(),
    ]
}

fn render_delimited(
    output: &AggregateOutput,
    separator: &str,
    no_header: bool,
    escape: bool,
) -> String {
    let mut rendered = String::new();

    if !no_header {
        rendered.push_str(&columns(output).join(separator));
        rendered.push('\n');
    }

    for row in rows(output) {
        let cells: Vec<String> = if escape {
            row.iter().map(|cell| csv_escape(cell)).collect()
        } else {
            row
        };
        rendered.push_str(&cells.join(separator));
        rendered.push('\n');
    }

    rendered
}

fn render_json(output: &AggregateOutput) -> Result<String> {
    let rendered = match output {
        AggregateOutput::Records(records) => serde_json::to_string_pretty(records)?,
        AggregateOutput::Summary(summary) => serde_json::to_string_pretty(summary)?,
    };

    Ok(format!("{rendered}\n"))
}

fn render_table(output: &AggregateOutput) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(columns(output));

    for row in rows(output) {
        table.add_row(row);
    }

    format!("{table}\n")
}

/// Escape CSV value
fn csv_escape(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

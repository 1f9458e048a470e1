//! `neotrials records` command implementation
//!
//! Exports one row per retained trial, in first-seen order.

use tracing::info;

use crate::aggregate::{aggregate, AggregateMode};
use crate::error::Result;
use crate::export::{self, OutputFormat};
use crate::{FetchArgs, OutputArgs, YearArgs};

/// Run the records command
pub async fn run(fetch: FetchArgs, window: YearArgs, out: OutputArgs) -> Result<()> {
    info!("Running records command");

    let format = out.format.parse::<OutputFormat>()?;
    let range = super::year_range(&window)?;

    let records = super::fetch_trials(&fetch).await?;
    let rows = aggregate(records, AggregateMode::Records, range);

    info!(rows = rows.len(), "Exporting trial records");
    export::write_output(&rows, format, out.output.as_deref(), out.no_header)?;
    super::report_row_count(rows.len(), out.output.is_some());

    Ok(())
}

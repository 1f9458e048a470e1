//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function. The fetch and
//! validation steps shared by both subcommands live here.

pub mod records;
pub mod summary;

use colored::Colorize;
use tracing::info;

use crate::aggregate::YearRange;
use crate::api::{RegistryClient, StudyQuery};
use crate::error::{CliError, Result};
use crate::filter::NeonatalFilter;
use crate::progress;
use crate::record::TrialRecord;
use crate::{FetchArgs, YearArgs};

/// Fetch, normalize, filter, and deduplicate trials for both subcommands
pub(crate) async fn fetch_trials(args: &FetchArgs) -> Result<Vec<TrialRecord>> {
    let mut client = RegistryClient::new(&args.base_urls)?;
    let query = StudyQuery::new(&args.term).with_page_size(args.page_size);

    let filter = if args.no_filter {
        None
    } else {
        Some(NeonatalFilter::new(args.max_age_days))
    };

    let spinner = progress::create_spinner(&format!("Fetching trials matching '{}'...", args.term));
    let result = client
        .fetch_studies(&query, args.max_pages, filter.as_ref())
        .await;
    spinner.finish_and_clear();

    let records = result?;
    info!(records = records.len(), term = %args.term, "Trials ready for aggregation");

    Ok(records)
}

/// Validate the year window and turn it into a [`YearRange`]
pub(crate) fn year_range(args: &YearArgs) -> Result<YearRange> {
    if let (Some(start), Some(end)) = (args.start_year, args.end_year) {
        if start > end {
            return Err(CliError::config(format!(
                "--start-year ({start}) must not be greater than --end-year ({end})"
            )));
        }
    }

    Ok(YearRange::new(args.start_year, args.end_year))
}

/// Print a completion line, but only when rows went to a file.
///
/// Stdout carries the exported rows otherwise and must stay clean for
/// piping.
pub(crate) fn report_row_count(rows: usize, wrote_to_file: bool) {
    if wrote_to_file {
        println!("{} {} row(s) exported", "✓".green(), rows);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_year_range_accepts_open_bounds() {
        let args = YearArgs {
            start_year: Some(2020),
            end_year: None,
        };

        let range = year_range(&args).unwrap();
        assert_eq!(range.start, Some(2020));
        assert_eq!(range.end, None);
    }

    #[test]
    fn test_year_range_rejects_inverted_bounds() {
        let args = YearArgs {
            start_year: Some(2022),
            end_year: Some(2020),
        };

        let err = year_range(&args).unwrap_err();
        assert!(err.to_string().contains("--start-year"));
    }

    #[test]
    fn test_year_range_allows_equal_bounds() {
        let args = YearArgs {
            start_year: Some(2021),
            end_year: Some(2021),
        };

        assert!(year_range(&args).is_ok());
    }
}

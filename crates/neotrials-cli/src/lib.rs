//! Neotrials CLI Library
//!
//! Command-line interface for retrieving and summarizing neonatal clinical
//! trials from the ClinicalTrials.gov registry.
//!
//! # Overview
//!
//! The pipeline runs in stages:
//!
//! - **Retrieval**: paginated fetch with per-page endpoint failover
//!   (`api`)
//! - **Normalization**: schema-tolerant field extraction into trial
//!   records (`extract`, `record`)
//! - **Filtering**: keyword and eligibility-age population filter
//!   (`filter`)
//! - **Aggregation**: per-record rows or grouped counts (`aggregate`)
//! - **Export**: CSV, TSV, JSON, or table rendering (`export`)

pub mod aggregate;
pub mod api;
pub mod commands;
pub mod error;
pub mod export;
pub mod extract;
pub mod filter;
pub mod progress;
pub mod record;

// Re-export commonly used types
pub use error::{CliError, Result};
pub use record::TrialRecord;

use clap::{Args, Parser, Subcommand};

use crate::api::types::{DEFAULT_MAX_PAGES, DEFAULT_PAGE_SIZE, DEFAULT_TERM};
use crate::filter::DEFAULT_MAX_AGE_DAYS;

/// Neotrials - neonatal clinical trial retrieval and summarization
#[derive(Parser, Debug)]
#[command(name = "neotrials")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print help for all commands as markdown
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Export one row per retained trial
    Records {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        window: YearArgs,

        #[command(flatten)]
        out: OutputArgs,
    },

    /// Export grouped trial counts by year, sponsor, status, study type,
    /// intervention type, and conditions
    Summary {
        #[command(flatten)]
        fetch: FetchArgs,

        #[command(flatten)]
        window: YearArgs,

        #[command(flatten)]
        out: OutputArgs,
    },
}

/// Retrieval flags shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Search term sent to the registry
    #[arg(long, default_value = DEFAULT_TERM)]
    pub term: String,

    /// Registry base URL; repeat the flag or comma-separate values to set
    /// the failover order
    #[arg(
        long = "base-url",
        value_name = "URL",
        env = "NEOTRIALS_BASE_URL",
        value_delimiter = ','
    )]
    pub base_urls: Vec<String>,

    /// Studies requested per page
    #[arg(
        long,
        default_value_t = DEFAULT_PAGE_SIZE,
        value_parser = clap::value_parser!(u32).range(1..=1000)
    )]
    pub page_size: u32,

    /// Hard bound on pages fetched in one run
    #[arg(
        long,
        default_value_t = DEFAULT_MAX_PAGES,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_pages: usize,

    /// Keep every record, skipping the neonatal population filter
    #[arg(long)]
    pub no_filter: bool,

    /// Eligibility-age ceiling in days for the population filter
    #[arg(long, value_name = "DAYS", default_value_t = DEFAULT_MAX_AGE_DAYS)]
    pub max_age_days: u32,
}

/// Inclusive year window applied before grouping
#[derive(Args, Debug, Clone, Default)]
pub struct YearArgs {
    /// Earliest start year to include
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Latest start year to include
    #[arg(long)]
    pub end_year: Option<i32>,
}

/// Output flags shared by both subcommands
#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Output format: csv, tsv, json, or table
    #[arg(long, default_value = "csv")]
    pub format: String,

    /// Write rows to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,

    /// Omit the header row in csv/tsv output
    #[arg(long)]
    pub no_header: bool,
}

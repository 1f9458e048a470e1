//! Grouping and year-range filtering of normalized trial records
//!
//! Two modes: records mode passes the filtered set through unchanged, in
//! first-seen order; summary mode folds records into counting buckets, one
//! contribution per intervention type. Buckets are keyed and ordered by
//! ascending `(year, sponsor_class, status, study_type, intervention_type,
//! conditions)`, so output is independent of fetch order.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::record::TrialRecord;

/// Intervention-type sentinel for records with no interventions
pub const NO_INTERVENTION: &str = "None specified";

/// Conditions signature for records with no conditions
pub const UNSPECIFIED_CONDITIONS: &str = "Unspecified";

/// Separator for list-valued output fields
pub const LIST_SEPARATOR: &str = "; ";

/// Inclusive year bounds applied before grouping
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct YearRange {
    pub start: Option<i32>,
    pub end: Option<i32>,
}

impl YearRange {
    pub fn new(start: Option<i32>, end: Option<i32>) -> Self {
        Self { start, end }
    }

    /// `true` when at least one bound is set
    pub fn is_active(&self) -> bool {
        self.start.is_some() || self.end.is_some()
    }

    pub fn contains(&self, year: i32) -> bool {
        if let Some(start) = self.start {
            if year < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if year > end {
                return false;
            }
        }
        true
    }
}

/// Output shape selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateMode {
    /// One row per trial, first-seen order
    Records,
    /// One row per bucket, ascending key order
    Summary,
}

/// One grouped output row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub year: i32,
    pub sponsor_class: String,
    pub status: String,
    pub study_type: String,
    pub intervention_type: String,
    pub conditions: String,
    /// Number of contributing trials
    pub count: u64,
    /// Sorted, joined registry ids of contributing trials
    pub nct_ids: String,
    /// Sorted, joined titles of contributing trials
    pub titles: String,
}

/// Rows produced by [`aggregate`], consumed by the exporter
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutput {
    Records(Vec<TrialRecord>),
    Summary(Vec<SummaryRow>),
}

impl AggregateOutput {
    pub fn len(&self) -> usize {
        match self {
            Self::Records(rows) => rows.len(),
            Self::Summary(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group records into the requested output shape
pub fn aggregate(records: Vec<TrialRecord>, mode: AggregateMode, range: YearRange) -> AggregateOutput {
    match mode {
        AggregateMode::Records => AggregateOutput::Records(filter_records(records, range)),
        AggregateMode::Summary => AggregateOutput::Summary(summarize(&records, range)),
    }
}

/// Apply the year range, preserving order.
///
/// Records with an unknown year are dropped only when a bound is active;
/// an unbounded listing keeps them.
pub fn filter_records(records: Vec<TrialRecord>, range: YearRange) -> Vec<TrialRecord> {
    let drop_unknown = range.is_active();

    records
        .into_iter()
        .filter(|record| match record.year {
            Some(year) => range.contains(year),
            None => !drop_unknown,
        })
        .collect()
}

// Grouping key; derived ordering follows field declaration order
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct BucketKey {
    year: i32,
    sponsor_class: String,
    status: String,
    study_type: String,
    intervention_type: String,
    conditions: String,
}

#[derive(Debug, Default)]
struct BucketAccumulator {
    count: u64,
    nct_ids: BTreeSet<String>,
    titles: BTreeSet<String>,
}

/// Fold records into summary rows.
///
/// Each record contributes once per intervention type, or once under the
/// [`NO_INTERVENTION`] sentinel when it has none. Records with an unknown
/// year never appear in a summary.
pub fn summarize(records: &[TrialRecord], range: YearRange) -> Vec<SummaryRow> {
    let mut buckets: BTreeMap<BucketKey, BucketAccumulator> = BTreeMap::new();

    for record in records {
        let Some(year) = record.year else {
            continue;
        };
        if !range.contains(year) {
            continue;
        }

        let conditions = conditions_signature(&record.conditions);
        let sentinel = [NO_INTERVENTION.to_string()];
        let intervention_types: &[String] = if record.intervention_types.is_empty() {
            &sentinel
        } else {
            &record.intervention_types
        };

        for intervention_type in intervention_types {
            let key = BucketKey {
                year,
                sponsor_class: record.sponsor_class.clone(),
                status: record.status.clone(),
                study_type: record.study_type.clone(),
                intervention_type: intervention_type.clone(),
                conditions: conditions.clone(),
            };

            let bucket = buckets.entry(key).or_default();
            bucket.count += 1;
            if let Some(id) = &record.nct_id {
                bucket.nct_ids.insert(id.clone());
            }
            if let Some(title) = &record.title {
                bucket.titles.insert(title.clone());
            }
        }
    }

    buckets
        .into_iter()
        .map(|(key, bucket)| SummaryRow {
            year: key.year,
            sponsor_class: key.sponsor_class,
            status: key.status,
            study_type: key.study_type,
            intervention_type: key.intervention_type,
            conditions: key.conditions,
            count: bucket.count,
            nct_ids: join_sorted(&bucket.nct_ids),
            titles: join_sorted(&bucket.titles),
        })
        .collect()
}

/// Order-insensitive canonical form of a condition list
fn conditions_signature(conditions: &[String]) -> String {
    if conditions.is_empty() {
        return UNSPECIFIED_CONDITIONS.to_string();
    }

    let mut sorted: Vec<&str> = conditions.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    sorted.dedup();
    sorted.join(LIST_SEPARATOR)
}

fn join_sorted(values: &BTreeSet<String>) -> String {
    values.iter().map(String::as_str).collect::<Vec<_>>().join(LIST_SEPARATOR)
}

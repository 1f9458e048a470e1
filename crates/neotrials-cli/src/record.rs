//! Normalized trial records and the raw-study normalizer
//!
//! Each attribute is resolved through an ordered table of candidate paths,
//! current schema first, then the shapes older registry deployments still
//! answer with. Missing or malformed fields degrade to sentinels; a study
//! can never fail normalization.

use serde::Serialize;
use serde_json::Value;

use crate::extract;

/// Sentinel for missing categorical attributes
pub const UNKNOWN: &str = "Unknown";

/// Candidate paths for the registry identifier
pub const NCT_ID_PATHS: &[&str] = &[
    "protocolSection.identificationModule.nctId",
    "identificationModule.nctId",
    "nct_id",
];

/// Candidate paths for the study title
pub const TITLE_PATHS: &[&str] = &[
    "protocolSection.identificationModule.briefTitle",
    "protocolSection.identificationModule.officialTitle",
    "brief_title",
];

/// Candidate paths for the lead sponsor class
pub const SPONSOR_CLASS_PATHS: &[&str] = &[
    "protocolSection.sponsorCollaboratorsModule.leadSponsor.class",
    "sponsorInfo.leadSponsorClass",
    "sponsors.lead_sponsor_class",
];

/// Candidate paths for the overall status
pub const STATUS_PATHS: &[&str] = &[
    "protocolSection.statusModule.overallStatus",
    "overallStatus",
    "overall_status",
];

/// Candidate paths for the study type
pub const STUDY_TYPE_PATHS: &[&str] = &[
    "protocolSection.designModule.studyType",
    "studyType",
    "study_type",
];

/// Candidate paths for the start date. The first path whose value yields a
/// parseable year wins, so a malformed date in one shape falls through to
/// the next.
pub const DATE_PATHS: &[&str] = &[
    "protocolSection.statusModule.startDateStruct.date",
    "protocolSection.startDateStruct.startDate",
    "protocolSection.startDateStruct.date",
    "protocolSection.firstPostDateStruct.firstPostDate",
];

/// Candidate paths for the condition list
pub const CONDITION_PATHS: &[&str] = &[
    "protocolSection.conditionsModule.conditions",
    "conditionsModule.conditions",
    "conditions",
];

/// Candidate paths for the intervention list
pub const INTERVENTION_PATHS: &[&str] = &[
    "protocolSection.armsInterventionsModule.interventions",
    "armsInterventionsModule.interventions",
    "interventions",
];

/// Candidate paths for the minimum eligible age
pub const MIN_AGE_PATHS: &[&str] = &[
    "protocolSection.eligibilityModule.minimumAge",
    "eligibilityModule.minimumAge",
    "eligibility.minimum_age",
];

/// Candidate paths for the maximum eligible age
pub const MAX_AGE_PATHS: &[&str] = &[
    "protocolSection.eligibilityModule.maximumAge",
    "eligibilityModule.maximumAge",
    "eligibility.maximum_age",
];

/// Field projection sent with every query.
///
/// Covers the current-schema path of every attribute the normalizer reads.
/// Responses are still parsed through the full fallback tables, so servers
/// that ignore the projection or answer in an older shape degrade
/// gracefully.
pub fn requested_fields() -> Vec<String> {
    [
        "protocolSection.identificationModule.nctId",
        "protocolSection.identificationModule.briefTitle",
        "protocolSection.identificationModule.officialTitle",
        "protocolSection.sponsorCollaboratorsModule.leadSponsor.class",
        "protocolSection.statusModule.overallStatus",
        "protocolSection.statusModule.startDateStruct.date",
        "protocolSection.firstPostDateStruct.firstPostDate",
        "protocolSection.designModule.studyType",
        "protocolSection.conditionsModule.conditions",
        "protocolSection.armsInterventionsModule.interventions",
        "protocolSection.eligibilityModule.minimumAge",
        "protocolSection.eligibilityModule.maximumAge",
    ]
    .iter()
    .map(|field| (*field).to_string())
    .collect()
}

/// A normalized clinical trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialRecord {
    /// Registry identifier; dedup key. `None` identities are never merged.
    pub nct_id: Option<String>,

    /// Brief or official title
    pub title: Option<String>,

    /// Start year; `None` is the unknown sentinel
    pub year: Option<i32>,

    /// Lead sponsor class ("Industry", "NIH", ...); open category set
    pub sponsor_class: String,

    /// Overall status ("Recruiting", "Completed", ...)
    pub status: String,

    /// Study type ("Interventional", "Observational", ...)
    pub study_type: String,

    /// Distinct intervention types, in first-seen order
    pub intervention_types: Vec<String>,

    /// Distinct conditions, in first-seen order
    pub conditions: Vec<String>,

    /// Minimum eligible age in days
    pub min_age_days: Option<u32>,

    /// Maximum eligible age in days
    pub max_age_days: Option<u32>,
}

/// Normalize one raw study into a [`TrialRecord`]
pub fn normalize_study(study: &Value) -> TrialRecord {
    TrialRecord {
        nct_id: extract::string_any(study, NCT_ID_PATHS),
        title: extract::string_any(study, TITLE_PATHS),
        year: extract_year(study),
        sponsor_class: categorical(study, SPONSOR_CLASS_PATHS),
        status: categorical(study, STATUS_PATHS),
        study_type: categorical(study, STUDY_TYPE_PATHS),
        intervention_types: intervention_types(study),
        conditions: conditions(study),
        min_age_days: extract::field_any(study, MIN_AGE_PATHS).and_then(extract::parse_age_days),
        max_age_days: extract::field_any(study, MAX_AGE_PATHS).and_then(extract::parse_age_days),
    }
}

fn categorical(study: &Value, paths: &[&str]) -> String {
    extract::string_any(study, paths).unwrap_or_else(|| UNKNOWN.to_string())
}

/// Walk the date table until one value parses to a year
fn extract_year(study: &Value) -> Option<i32> {
    for path in DATE_PATHS {
        if let Some(value) = extract::field(study, path) {
            if let Some(year) = extract::parse_year(value) {
                return Some(year);
            }
        }
    }
    None
}

/// Conditions come as an array of strings in every schema generation, with
/// the occasional bare string. Blanks are dropped and order preserved.
fn conditions(study: &Value) -> Vec<String> {
    let Some(value) = extract::field_any(study, CONDITION_PATHS) else {
        return Vec::new();
    };

    match value {
        Value::Array(entries) => dedup_strings(entries.iter().filter_map(scalar_to_string)),
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Interventions are objects carrying a `type` sub-field; legacy payloads
/// sometimes hold raw strings instead.
fn intervention_types(study: &Value) -> Vec<String> {
    let Some(value) = extract::field_any(study, INTERVENTION_PATHS) else {
        return Vec::new();
    };

    let Value::Array(entries) = value else {
        return Vec::new();
    };

    dedup_strings(entries.iter().filter_map(|entry| match entry {
        Value::Object(map) => map.get("type").and_then(scalar_to_string),
        Value::String(_) => scalar_to_string(entry),
        _ => None,
    }))
}

fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn dedup_strings(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for value in values {
        if !out.contains(&value) {
            out.push(value);
        }
    }
    out
}

//! Tolerant field extraction from untyped study payloads
//!
//! The registry has shipped several response schemas over the years and
//! individual studies routinely omit fields, so every lookup here degrades
//! to `None` instead of failing. Callers pass ordered candidate paths and
//! take the first hit.

use chrono::Datelike;
use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Age strings look like "28 Days", "4 Weeks", or "1 Year"
static AGE_TEXT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+(?:\.\d+)?)\s*([a-z]+)\s*$").expect("age pattern is valid")
});

/// Resolve a dotted path ("protocolSection.statusModule.overallStatus")
/// through nested JSON objects. Any missing segment or non-object
/// intermediate yields `None`.
pub fn field<'a>(study: &'a Value, dotted_path: &str) -> Option<&'a Value> {
    let mut current = study;
    for part in dotted_path.split('.') {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// First candidate path that resolves to a non-null value
pub fn field_any<'a>(study: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|path| field(study, path))
        .find(|value| !value.is_null())
}

/// First candidate path that yields a non-blank string.
///
/// Numbers are stringified; blank and whitespace-only strings are treated as
/// absent so legacy empty fields fall through to the next candidate.
pub fn string_any(study: &Value, paths: &[&str]) -> Option<String> {
    for path in paths {
        let Some(value) = field(study, path) else {
            continue;
        };

        match value {
            Value::String(s) if !s.trim().is_empty() => return Some(s.clone()),
            Value::Number(n) => return Some(n.to_string()),
            _ => continue,
        }
    }
    None
}

/// Normalize a heterogeneous date/year value to a calendar year.
///
/// Accepts JSON numbers, `YYYY-MM-DD`, `YYYY-MM`, bare `YYYY`, and as a last
/// resort scans dash/slash-delimited tokens for the first four-digit one.
/// Malformed input yields `None`, never an error.
pub fn parse_year(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => {
            if let Some(year) = n.as_i64() {
                return i32::try_from(year).ok();
            }
            n.as_f64().map(|year| year.trunc() as i32)
        },
        Value::String(text) => parse_year_text(text),
        _ => None,
    }
}

fn parse_year_text(text: &str) -> Option<i32> {
    let text = text.trim();

    // Full calendar date prefix
    if let Some(prefix) = text.get(..10) {
        if let Ok(date) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
            return Some(date.year());
        }
    }

    // Year-month prefix
    if let Some(prefix) = text.get(..7) {
        if let Some((year, month)) = prefix.split_once('-') {
            if year.len() == 4
                && year.chars().all(|c| c.is_ascii_digit())
                && month.chars().all(|c| c.is_ascii_digit())
            {
                if let (Ok(year), Ok(month)) = (year.parse::<i32>(), month.parse::<u32>()) {
                    if (1..=12).contains(&month) {
                        return Some(year);
                    }
                }
            }
        }
    }

    // Bare year prefix
    if let Some(prefix) = text.get(..4) {
        if prefix.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(year) = prefix.parse::<i32>() {
                return Some(year);
            }
        }
    }

    // Fallback: first four-digit token anywhere in the value
    text.split(['-', '/'])
        .find(|token| token.len() == 4 && token.chars().all(|c| c.is_ascii_digit()))
        .and_then(|token| token.parse().ok())
}

/// Normalize an eligibility age to days.
///
/// The registry serves ages either as strings ("28 Days", "2 Months") or as
/// structured objects (`{"value": 4, "unit": "Weeks"}`). Units convert at
/// day=1, week=7, month=30, year=365. Unparsable values ("N/A") yield `None`.
pub fn parse_age_days(value: &Value) -> Option<u32> {
    match value {
        Value::String(text) => {
            let captures = AGE_TEXT_RE.captures(text)?;
            let magnitude: f64 = captures.get(1)?.as_str().parse().ok()?;
            let multiplier = unit_to_days(captures.get(2)?.as_str())?;
            Some((magnitude * multiplier).round() as u32)
        },
        Value::Object(map) => {
            let magnitude = match map.get("value")? {
                Value::Number(n) => n.as_f64()?,
                Value::String(s) => s.trim().parse().ok()?,
                _ => return None,
            };
            let multiplier = unit_to_days(map.get("unit")?.as_str()?)?;
            Some((magnitude * multiplier).round() as u32)
        },
        _ => None,
    }
}

fn unit_to_days(unit: &str) -> Option<f64> {
    match unit.trim().to_lowercase().trim_end_matches('s') {
        "day" => Some(1.0),
        "week" => Some(7.0),
        "month" => Some(30.0),
        "year" => Some(365.0),
        _ => None,
    }
}

//! Heuristic population filter
//!
//! Retains trials plausibly about neonates, using keyword and
//! eligibility-age signals. Inclusion is deliberately permissive: a record
//! with no age data and no keyword still passes, because it already matched
//! the broad search term and nothing disqualifies it.

use crate::record::TrialRecord;

/// Keyword stems matched case-insensitively against titles and conditions
pub const DEFAULT_KEYWORDS: &[&str] =
    &["neonat", "newborn", "preterm", "premature infant", "infant"];

/// Default eligibility-age ceiling, in days
pub const DEFAULT_MAX_AGE_DAYS: u32 = 90;

/// Decides whether a normalized record stays in the result set.
///
/// Precedence when signals conflict is inclusive: a keyword match retains
/// the record even when its age range says otherwise.
#[derive(Debug, Clone)]
pub struct NeonatalFilter {
    keywords: Vec<String>,
    max_age_days: u32,
}

impl Default for NeonatalFilter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_AGE_DAYS)
    }
}

impl NeonatalFilter {
    /// Build a filter with the default keyword set and the given age ceiling
    pub fn new(max_age_days: u32) -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|kw| kw.to_lowercase()).collect(),
            max_age_days,
        }
    }

    /// Replace the keyword set; entries are matched case-insensitively
    pub fn with_keywords(mut self, keywords: &[&str]) -> Self {
        self.keywords = keywords.iter().map(|kw| kw.to_lowercase()).collect();
        self
    }

    /// `true` if the record should be kept
    pub fn retains(&self, record: &TrialRecord) -> bool {
        if self.matches_keyword(record) {
            return true;
        }

        // Maximum age is the strongest signal when present
        if let Some(max_age) = record.max_age_days {
            return max_age <= self.max_age_days;
        }

        // Without a maximum, a high minimum alone disqualifies
        if let Some(min_age) = record.min_age_days {
            if min_age > self.max_age_days {
                return false;
            }
        }

        true
    }

    fn matches_keyword(&self, record: &TrialRecord) -> bool {
        record
            .conditions
            .iter()
            .chain(record.title.iter())
            .any(|text| {
                let lowered = text.to_lowercase();
                self.keywords.iter().any(|keyword| lowered.contains(keyword.as_str()))
            })
    }
}

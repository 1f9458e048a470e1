//! Registry endpoint rotation and URL builders
//!
//! The study registry has moved its API more than once and its hosts fail
//! independently, so the client works from an ordered list of candidate base
//! URLs instead of a single location.

use crate::api::types::StudyQuery;

/// Candidate base URLs for the study registry, in preference order.
///
/// The modernized v2 API comes first; the `www` host resolves separately and
/// survives some DNS-level outages; the legacy data-api path is kept for
/// deployments still pinned to it.
pub const DEFAULT_BASE_URLS: [&str; 3] = [
    "https://clinicaltrials.gov/api/v2/studies",
    "https://www.clinicaltrials.gov/api/v2/studies",
    "https://clinicaltrials.gov/data-api/api/studies",
];

/// Ordered endpoint candidates with sticky promotion of the last success.
///
/// Scoped to a single retrieval run: the first page may probe several bases,
/// and later pages go straight to whichever base answered most recently.
#[derive(Debug, Clone)]
pub struct EndpointRotation {
    bases: Vec<String>,
    preferred: Option<usize>,
}

impl EndpointRotation {
    /// Build a rotation from configured bases, falling back to
    /// [`DEFAULT_BASE_URLS`] when the list is empty. Trailing slashes are
    /// trimmed so URL building stays uniform.
    pub fn new(bases: &[String]) -> Self {
        let bases: Vec<String> = if bases.is_empty() {
            DEFAULT_BASE_URLS.iter().map(|b| (*b).to_string()).collect()
        } else {
            bases
                .iter()
                .map(|b| b.trim_end_matches('/').to_string())
                .collect()
        };

        Self {
            bases,
            preferred: None,
        }
    }

    /// Candidate bases for the next request, most recently successful first
    pub fn ordered(&self) -> Vec<String> {
        match self.preferred {
            Some(idx) => {
                let mut ordered = Vec::with_capacity(self.bases.len());
                ordered.push(self.bases[idx].clone());
                ordered.extend(
                    self.bases
                        .iter()
                        .enumerate()
                        .filter(|(i, _)| *i != idx)
                        .map(|(_, base)| base.clone()),
                );
                ordered
            },
            None => self.bases.clone(),
        }
    }

    /// Record that `base` answered successfully so later pages try it first
    pub fn mark_success(&mut self, base: &str) {
        self.preferred = self.bases.iter().position(|b| b == base);
    }

    /// Number of configured bases
    pub fn len(&self) -> usize {
        self.bases.len()
    }

    /// Whether the rotation has no bases (only possible via an empty default
    /// list, which `new` prevents)
    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }
}

/// Build the study query URL for one page
pub fn studies_url(base_url: &str, query: &StudyQuery, page_token: Option<&str>) -> String {
    let mut url = format!(
        "{}?query.term={}&fields={}&pageSize={}",
        base_url,
        urlencoding::encode(&query.term),
        urlencoding::encode(&query.fields.join(",")),
        query.page_size
    );

    if let Some(token) = page_token {
        url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
    }

    url.push_str("&format=json");
    url
}

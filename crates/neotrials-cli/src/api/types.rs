//! Registry request and response types
//!
//! The registry's payload shape differs between schema generations, so the
//! page wrapper is unpacked tolerantly instead of through a fixed DTO. Only
//! the envelope is interpreted here; individual studies stay untyped until
//! the record normalizer.

use serde_json::Value;

use crate::record::requested_fields;

/// Default search term for the registry query
pub const DEFAULT_TERM: &str = "neonatal";

/// Default number of studies per page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default hard bound on pages fetched in one run
pub const DEFAULT_MAX_PAGES: usize = 30;

/// Query parameters for one retrieval run
#[derive(Debug, Clone)]
pub struct StudyQuery {
    /// Free-text search term, matched server-side
    pub term: String,

    /// Dotted field paths to request, comma-joined on the wire
    pub fields: Vec<String>,

    /// Studies per page (the v2 API caps this at 1000)
    pub page_size: u32,
}

impl StudyQuery {
    /// Query for `term` with the default field projection
    pub fn new(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            fields: requested_fields(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Override the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }
}

impl Default for StudyQuery {
    fn default() -> Self {
        Self::new(DEFAULT_TERM)
    }
}

/// One parsed page of study results
#[derive(Debug, Clone, Default)]
pub struct StudyPage {
    /// Raw studies, still untyped
    pub studies: Vec<Value>,

    /// Continuation token for the next page, if any
    pub next_page_token: Option<String>,
}

impl StudyPage {
    /// Unpack the studies array and continuation token from a raw payload.
    ///
    /// The v2 API uses `studies`/`nextPageToken`; older deployments use
    /// `results`/`next_page_token`. Anything missing degrades to empty, and
    /// a blank token is treated as absent.
    pub fn from_payload(payload: &Value) -> Self {
        let studies = ["studies", "results"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_array))
            .cloned()
            .unwrap_or_default();

        let next_page_token = ["nextPageToken", "next_page_token"]
            .iter()
            .find_map(|key| payload.get(*key).and_then(Value::as_str))
            .filter(|token| !token.is_empty())
            .map(|token| token.to_string());

        Self {
            studies,
            next_page_token,
        }
    }
}

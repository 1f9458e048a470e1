//! HTTP client for the trial registry
//!
//! Fetches paginated study results with per-page endpoint failover. A page
//! request walks the candidate bases in preference order; the first base
//! that answers with parseable JSON wins and becomes the preferred base for
//! subsequent pages. Retrieval aborts only when every base fails for the
//! same page.

use std::collections::HashSet;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api::endpoints::{studies_url, EndpointRotation};
use crate::api::types::{StudyPage, StudyQuery};
use crate::error::{CliError, FetchFailure, Result};
use crate::filter::NeonatalFilter;
use crate::record::{normalize_study, TrialRecord};

// ============================================================================
// Client Constants
// ============================================================================

/// Default timeout for registry requests in seconds.
/// Can be overridden via NEOTRIALS_TIMEOUT_SECS environment variable.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const USER_AGENT: &str = concat!("neotrials/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Registry Client
// ============================================================================

/// Client for the paginated studies endpoint
pub struct RegistryClient {
    client: Client,
    rotation: EndpointRotation,
}

impl RegistryClient {
    /// Create a new registry client.
    ///
    /// An empty `base_urls` slice falls back to the built-in endpoint list.
    pub fn new(base_urls: &[String]) -> Result<Self> {
        let timeout_secs = std::env::var("NEOTRIALS_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            rotation: EndpointRotation::new(base_urls),
        })
    }

    /// Fetch, normalize, filter, and deduplicate studies matching the query.
    ///
    /// Pages are fetched sequentially until the service stops returning a
    /// continuation token or `max_pages` is reached; hitting the bound
    /// yields a partial but valid result. Records are deduplicated by
    /// registry id, keeping the first occurrence; records without an id are
    /// always kept.
    pub async fn fetch_studies(
        &mut self,
        query: &StudyQuery,
        max_pages: usize,
        filter: Option<&NeonatalFilter>,
    ) -> Result<Vec<TrialRecord>> {
        let mut records: Vec<TrialRecord> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut pages_fetched = 0usize;

        for page_index in 0..max_pages {
            let page = self.fetch_page(query, page_token.as_deref(), page_index).await?;
            pages_fetched += 1;

            debug!(
                page = page_index + 1,
                studies = page.studies.len(),
                "Received studies page"
            );

            for study in &page.studies {
                let record = normalize_study(study);

                if let Some(filter) = filter {
                    if !filter.retains(&record) {
                        continue;
                    }
                }

                if let Some(id) = &record.nct_id {
                    if !seen_ids.insert(id.clone()) {
                        debug!(nct_id = %id, "Skipping duplicate study");
                        continue;
                    }
                }

                records.push(record);
            }

            page_token = page.next_page_token;
            if page_token.is_none() {
                break;
            }
        }

        if page_token.is_some() {
            warn!(
                "Stopped after {} pages with more results available; raise --max-pages to fetch further",
                pages_fetched
            );
        }

        info!(
            records = records.len(),
            pages = pages_fetched,
            "Registry fetch complete"
        );

        Ok(records)
    }

    /// Fetch one page, trying each base in preference order
    async fn fetch_page(
        &mut self,
        query: &StudyQuery,
        page_token: Option<&str>,
        page_index: usize,
    ) -> Result<StudyPage> {
        let mut attempts = Vec::new();

        for base_url in self.rotation.ordered() {
            let url = studies_url(&base_url, query, page_token);
            debug!(page = page_index + 1, url = %url, "Requesting studies page");

            match self.request_page(&url).await {
                Ok(page) => {
                    self.rotation.mark_success(&base_url);
                    return Ok(page);
                },
                Err(failure) => {
                    warn!(
                        "Endpoint {} failed on page {}: {}",
                        base_url,
                        page_index + 1,
                        failure
                    );
                    attempts.push(format!("{base_url}: {failure}"));
                },
            }
        }

        Err(CliError::all_endpoints_failed(page_index + 1, attempts))
    }

    /// Issue one request and classify any failure.
    ///
    /// A non-JSON `Content-Type` is rejected before parsing; proxies and
    /// captive portals tend to answer with HTML and a 200. A missing header
    /// is tolerated and the body parse decides.
    async fn request_page(&self, url: &str) -> std::result::Result<StudyPage, FetchFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchFailure::transport(e.to_string()))?;

        let response = response
            .error_for_status()
            .map_err(|e| FetchFailure::transport(e.to_string()))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        let body = response
            .text()
            .await
            .map_err(|e| FetchFailure::transport(e.to_string()))?;

        if let Some(content_type) = content_type {
            if !content_type.to_lowercase().contains("json") {
                return Err(FetchFailure::unexpected_content_type(content_type, &body));
            }
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| FetchFailure::malformed_payload(e.to_string()))?;

        Ok(StudyPage::from_payload(&payload))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::api::endpoints::DEFAULT_BASE_URLS;

    #[test]
    fn test_client_creation_with_defaults() {
        let client = RegistryClient::new(&[]).unwrap();
        assert_eq!(client.rotation.len(), DEFAULT_BASE_URLS.len());
    }

    #[test]
    fn test_client_creation_with_custom_bases() {
        let bases = vec!["https://mirror.example/api/studies/".to_string()];
        let client = RegistryClient::new(&bases).unwrap();

        assert_eq!(client.rotation.len(), 1);
        assert_eq!(
            client.rotation.ordered(),
            vec!["https://mirror.example/api/studies".to_string()]
        );
    }
}

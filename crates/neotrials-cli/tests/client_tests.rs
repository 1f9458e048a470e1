//! Integration tests for the registry client
//!
//! These tests validate the retrieval pipeline against a mock registry:
//! - Pagination with continuation tokens
//! - Legacy payload key tolerance
//! - Cross-page deduplication and filtering
//! - Endpoint failover, stickiness, and failure aggregation

use neotrials_cli::api::{RegistryClient, StudyQuery};
use neotrials_cli::error::CliError;
use neotrials_cli::filter::NeonatalFilter;
use serde_json::{json, Value};
use wiremock::matchers::{method, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to build a current-schema neonatal study
fn neonatal_study(nct_id: &str, title: &str, date: &str) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {"nctId": nct_id, "briefTitle": title},
            "statusModule": {
                "overallStatus": "Recruiting",
                "startDateStruct": {"date": date}
            },
            "designModule": {"studyType": "Interventional"},
            "conditionsModule": {"conditions": ["Neonatal sepsis"]},
            "armsInterventionsModule": {
                "interventions": [{"type": "Drug", "name": "Agent"}]
            },
            "sponsorCollaboratorsModule": {"leadSponsor": {"class": "Industry"}},
            "eligibilityModule": {"minimumAge": "0 Days", "maximumAge": "28 Days"}
        }
    })
}

/// Helper to build a study the population filter should reject
fn adult_study(nct_id: &str) -> Value {
    json!({
        "protocolSection": {
            "identificationModule": {"nctId": nct_id, "briefTitle": "Adult blood pressure study"},
            "statusModule": {
                "overallStatus": "Recruiting",
                "startDateStruct": {"date": "2020-06-01"}
            },
            "conditionsModule": {"conditions": ["Hypertension"]},
            "eligibilityModule": {"minimumAge": "18 Years", "maximumAge": "65 Years"}
        }
    })
}

fn page(studies: Vec<Value>, token: Option<&str>) -> Value {
    json!({"studies": studies, "nextPageToken": token})
}

fn bases(servers: &[&MockServer]) -> Vec<String> {
    servers.iter().map(|server| server.uri()).collect()
}

// ============================================================================
// Pagination Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_collects_and_normalizes_studies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param("query.term", "neonatal"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 5, None).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].nct_id.as_deref(), Some("NCT001"));
    assert_eq!(records[0].title.as_deref(), Some("Alpha neonatal study"));
    assert_eq!(records[0].year, Some(2020));
    assert_eq!(records[0].sponsor_class, "Industry");
    assert_eq!(records[0].intervention_types, vec!["Drug"]);
    assert_eq!(records[0].max_age_days, Some(28));
}

#[tokio::test]
async fn test_fetch_follows_continuation_tokens() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
            Some("tok2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT002", "Beta neonatal study", "2021-03-01")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 10, None).await.unwrap();

    assert_eq!(records.len(), 2);
    // First-seen order is preserved across pages
    assert_eq!(records[0].nct_id.as_deref(), Some("NCT001"));
    assert_eq!(records[1].nct_id.as_deref(), Some("NCT002"));
}

#[tokio::test]
async fn test_fetch_stops_at_page_bound() {
    let server = MockServer::start().await;

    // Every page advertises another one; only the bound stops the run
    Mock::given(method("GET"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
            Some("more"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("pageToken", "more"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT002", "Beta neonatal study", "2021-03-01")],
            Some("more"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 2, None).await.unwrap();

    // Partial but valid result
    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_fetch_accepts_legacy_payload_keys() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
            // Blank token means no further pages
            "next_page_token": ""
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 5, None).await.unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].nct_id.as_deref(), Some("NCT001"));
}

// ============================================================================
// Deduplication and Filter Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_deduplicates_across_pages_keeping_first() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCTDUPE", "First neonatal title", "2020-01-15")],
            Some("tok2"),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                neonatal_study("NCTDUPE", "Second neonatal title", "2020-01-15"),
                neonatal_study("NCT002", "Beta neonatal study", "2021-03-01"),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 10, None).await.unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].nct_id.as_deref(), Some("NCTDUPE"));
    assert_eq!(records[0].title.as_deref(), Some("First neonatal title"));
}

#[tokio::test]
async fn test_fetch_applies_population_filter() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![
                neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15"),
                adult_study("NCTADULT"),
            ],
            None,
        )))
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");

    let filter = NeonatalFilter::default();
    let filtered = client.fetch_studies(&query, 5, Some(&filter)).await.unwrap();
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].nct_id.as_deref(), Some("NCT001"));

    let unfiltered = client.fetch_studies(&query, 5, None).await.unwrap();
    assert_eq!(unfiltered.len(), 2);
}

// ============================================================================
// Failover Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_fails_over_and_sticks_to_working_base() {
    let broken = MockServer::start().await;
    let working = MockServer::start().await;

    // Intercepting-proxy behavior: HTML with a 200 status
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            "<html><body>Service temporarily unavailable</body></html>",
            "text/html",
        ))
        // Page 1 only: after the first success the working base is preferred
        .expect(1)
        .mount(&broken)
        .await;

    Mock::given(method("GET"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
            Some("tok2"),
        )))
        .expect(1)
        .mount(&working)
        .await;

    Mock::given(method("GET"))
        .and(query_param("pageToken", "tok2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page(
            vec![neonatal_study("NCT002", "Beta neonatal study", "2021-03-01")],
            None,
        )))
        .expect(1)
        .mount(&working)
        .await;

    let mut client = RegistryClient::new(&bases(&[&broken, &working])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 10, None).await.unwrap();

    assert_eq!(records.len(), 2);
}

#[tokio::test]
async fn test_fetch_reports_every_failed_base() {
    let erroring = MockServer::start().await;
    let html = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&erroring)
        .await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
        .expect(1)
        .mount(&html)
        .await;

    let mut client = RegistryClient::new(&bases(&[&erroring, &html])).unwrap();
    let query = StudyQuery::new("neonatal");
    let err = client.fetch_studies(&query, 5, None).await.unwrap_err();

    match err {
        CliError::AllEndpointsFailed { page, attempts } => {
            assert_eq!(page, 1);
            assert_eq!(attempts.len(), 2);
            assert!(attempts[0].contains(&erroring.uri()));
            assert!(attempts[0].contains("transport error"));
            assert!(attempts[1].contains(&html.uri()));
            assert!(attempts[1].contains("unexpected content type"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_rejects_malformed_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("{\"studies\": [", "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let err = client.fetch_studies(&query, 5, None).await.unwrap_err();

    match err {
        CliError::AllEndpointsFailed { attempts, .. } => {
            assert_eq!(attempts.len(), 1);
            assert!(attempts[0].contains("malformed payload"));
        },
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_tolerates_missing_content_type() {
    let server = MockServer::start().await;

    let body = page(
        vec![neonatal_study("NCT001", "Alpha neonatal study", "2020-01-15")],
        None,
    )
    .to_string();

    // No Content-Type header at all; the body parse decides
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.into_bytes()))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = RegistryClient::new(&bases(&[&server])).unwrap();
    let query = StudyQuery::new("neonatal");
    let records = client.fetch_studies(&query, 5, None).await.unwrap();

    assert_eq!(records.len(), 1);
}

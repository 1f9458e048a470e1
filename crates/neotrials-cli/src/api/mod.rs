//! Registry API client module
//!
//! HTTP client for the ClinicalTrials.gov study registry, with endpoint
//! failover and tolerant payload parsing.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::RegistryClient;
pub use endpoints::EndpointRotation;
pub use types::{StudyPage, StudyQuery};

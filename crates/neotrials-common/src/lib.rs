//! Neotrials Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared infrastructure for the neotrials workspace members.
//!
//! # Overview
//!
//! This crate provides functionality used across all neotrials workspace
//! members:
//!
//! - **Logging**: Centralized tracing configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use neotrials_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = LogConfig::builder().level(LogLevel::Debug).build();
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod logging;

// Re-export commonly used types
pub use logging::{init_logging, LogConfig, LogFormat, LogLevel, LogOutput};

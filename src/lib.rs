//! Gossamer: a focused web crawler
//!
//! This crate implements a focused crawler that, given seed URLs and domain
//! allow/deny rules, discovers and classifies pages while tracking visited
//! state, dead links, and extracted file references.

pub mod config;
pub mod crawler;
pub mod job;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for gossamer operations
#[derive(Debug, Error)]
pub enum GossamerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },
}

/// Result type alias for gossamer operations
pub type Result<T> = std::result::Result<T, GossamerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::{Config, JobSpec};
pub use crawler::{CrawlEngine, CrawlOutcome, FetchedPage, PagePipeline, SnapshotPipeline};
pub use job::{CrawlJob, JobStatus};
pub use url::{admit, domain_matches, is_valid_url, url_allowed, AdmissionState};

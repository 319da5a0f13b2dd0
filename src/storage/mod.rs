//! Storage module for persisting crawl data
//!
//! Four independent record stores back the crawler: job records (keyed by
//! the collision-resolved unique name), dead links (keyed by URL), file
//! links, and page snapshots (keyed by URL). No transactional coupling
//! exists between them.

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::job::JobStatus;

/// Persisted representation of a crawl job
///
/// Does not carry the full crawl configuration, only the lifecycle data the
/// status surface reports.
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub name: String,
    pub unique_name: String,
    pub status: JobStatus,
    pub started_at: Option<String>,
    pub finished_at: Option<String>,
    pub crawled_pages: u32,
    pub cycle_number: u32,
}

/// A URL confirmed unreachable or invalid, shared across jobs
#[derive(Debug, Clone)]
pub struct DeadLinkRecord {
    pub url: String,
    pub last_crawled_at: String,
}

/// A discovered downloadable file reference
#[derive(Debug, Clone)]
pub struct FileLinkRecord {
    pub url: String,
    /// Normalized uppercase extension, e.g. "PDF"
    pub extension: String,
}

/// Snapshot of a fetched page, keyed by URL
#[derive(Debug, Clone)]
pub struct PageSnapshotRecord {
    pub url: String,
    pub domain: String,
    pub title: Option<String>,
    pub html: String,
    pub status_code: Option<u16>,
    pub last_modified: Option<String>,
    pub fetched_at: String,
}

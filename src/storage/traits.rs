//! Storage traits and error types

use crate::storage::{DeadLinkRecord, FileLinkRecord, JobRecord, PageSnapshotRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Insert operations on the shared stores must tolerate concurrent inserts
/// from independent jobs; a duplicate-key conflict is benign, not fatal.
pub trait Storage {
    // ===== Job Records =====

    /// Inserts or updates a job record, keyed by its unique name
    fn upsert_job(&mut self, job: &JobRecord) -> StorageResult<()>;

    /// Finds a job by its unique name
    fn find_job(&self, unique_name: &str) -> StorageResult<Option<JobRecord>>;

    /// Lists all job records, sorted by unique name
    fn list_jobs(&self) -> StorageResult<Vec<JobRecord>>;

    // ===== Dead Links =====

    /// Records a dead link; a duplicate URL is silently ignored
    fn insert_dead_link(&mut self, url: &str, last_crawled_at: &str) -> StorageResult<()>;

    /// Finds a dead link by URL
    fn find_dead_link(&self, url: &str) -> StorageResult<Option<DeadLinkRecord>>;

    /// Lists all dead links, sorted by URL
    fn list_dead_links(&self) -> StorageResult<Vec<DeadLinkRecord>>;

    // ===== File Links =====

    /// Records a discovered file link; a duplicate URL is silently ignored
    fn insert_file_link(&mut self, url: &str, extension: &str) -> StorageResult<()>;

    /// Lists all file links, sorted by URL
    fn list_file_links(&self) -> StorageResult<Vec<FileLinkRecord>>;

    // ===== Page Snapshots =====

    /// Inserts or replaces a page snapshot, keyed by URL
    fn upsert_page_snapshot(&mut self, snapshot: &PageSnapshotRecord) -> StorageResult<()>;

    /// Gets a page snapshot by URL
    fn get_page_snapshot(&self, url: &str) -> StorageResult<Option<PageSnapshotRecord>>;

    /// Counts stored page snapshots
    fn count_page_snapshots(&self) -> StorageResult<u64>;
}

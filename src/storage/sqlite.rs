//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::job::JobStatus;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{DeadLinkRecord, FileLinkRecord, JobRecord, PageSnapshotRecord};
use crate::GossamerError;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(GossamerError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, GossamerError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, GossamerError> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn row_to_job(row: &rusqlite::Row<'_>) -> rusqlite::Result<JobRecord> {
    Ok(JobRecord {
        unique_name: row.get(0)?,
        name: row.get(1)?,
        status: JobStatus::from_db_string(&row.get::<_, String>(2)?)
            .unwrap_or(JobStatus::Created),
        started_at: row.get(3)?,
        finished_at: row.get(4)?,
        crawled_pages: row.get(5)?,
        cycle_number: row.get(6)?,
    })
}

impl Storage for SqliteStorage {
    // ===== Job Records =====

    fn upsert_job(&mut self, job: &JobRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO jobs
             (unique_name, name, status, status_id, started_at, finished_at, crawled_pages, cycle_number)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                job.unique_name,
                job.name,
                job.status.to_db_string(),
                job.status.status_id(),
                job.started_at,
                job.finished_at,
                job.crawled_pages,
                job.cycle_number,
            ],
        )?;
        Ok(())
    }

    fn find_job(&self, unique_name: &str) -> StorageResult<Option<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT unique_name, name, status, started_at, finished_at, crawled_pages, cycle_number
             FROM jobs WHERE unique_name = ?1",
        )?;

        let job = stmt.query_row(params![unique_name], row_to_job).optional()?;

        Ok(job)
    }

    fn list_jobs(&self) -> StorageResult<Vec<JobRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT unique_name, name, status, started_at, finished_at, crawled_pages, cycle_number
             FROM jobs ORDER BY unique_name",
        )?;

        let jobs = stmt
            .query_map([], row_to_job)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    // ===== Dead Links =====

    fn insert_dead_link(&mut self, url: &str, last_crawled_at: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO dead_links (url, last_crawled_at) VALUES (?1, ?2)",
            params![url, last_crawled_at],
        )?;
        Ok(())
    }

    fn find_dead_link(&self, url: &str) -> StorageResult<Option<DeadLinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, last_crawled_at FROM dead_links WHERE url = ?1")?;

        let link = stmt
            .query_row(params![url], |row| {
                Ok(DeadLinkRecord {
                    url: row.get(0)?,
                    last_crawled_at: row.get(1)?,
                })
            })
            .optional()?;

        Ok(link)
    }

    fn list_dead_links(&self) -> StorageResult<Vec<DeadLinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, last_crawled_at FROM dead_links ORDER BY url")?;

        let links = stmt
            .query_map([], |row| {
                Ok(DeadLinkRecord {
                    url: row.get(0)?,
                    last_crawled_at: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== File Links =====

    fn insert_file_link(&mut self, url: &str, extension: &str) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR IGNORE INTO file_links (url, extension) VALUES (?1, ?2)",
            params![url, extension],
        )?;
        Ok(())
    }

    fn list_file_links(&self) -> StorageResult<Vec<FileLinkRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, extension FROM file_links ORDER BY url")?;

        let links = stmt
            .query_map([], |row| {
                Ok(FileLinkRecord {
                    url: row.get(0)?,
                    extension: row.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(links)
    }

    // ===== Page Snapshots =====

    fn upsert_page_snapshot(&mut self, snapshot: &PageSnapshotRecord) -> StorageResult<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO page_snapshots
             (url, domain, title, html, status_code, last_modified, fetched_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                snapshot.url,
                snapshot.domain,
                snapshot.title,
                snapshot.html,
                snapshot.status_code,
                snapshot.last_modified,
                snapshot.fetched_at,
            ],
        )?;
        Ok(())
    }

    fn get_page_snapshot(&self, url: &str) -> StorageResult<Option<PageSnapshotRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT url, domain, title, html, status_code, last_modified, fetched_at
             FROM page_snapshots WHERE url = ?1",
        )?;

        let snapshot = stmt
            .query_row(params![url], |row| {
                Ok(PageSnapshotRecord {
                    url: row.get(0)?,
                    domain: row.get(1)?,
                    title: row.get(2)?,
                    html: row.get(3)?,
                    status_code: row.get(4)?,
                    last_modified: row.get(5)?,
                    fetched_at: row.get(6)?,
                })
            })
            .optional()?;

        Ok(snapshot)
    }

    fn count_page_snapshots(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM page_snapshots", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(unique_name: &str) -> JobRecord {
        JobRecord {
            name: "docs".to_string(),
            unique_name: unique_name.to_string(),
            status: JobStatus::Created,
            started_at: None,
            finished_at: None,
            crawled_pages: 0,
            cycle_number: 0,
        }
    }

    #[test]
    fn test_upsert_and_find_job() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .upsert_job(&sample_job("docs-http://example.com/"))
            .unwrap();

        let found = storage.find_job("docs-http://example.com/").unwrap();
        assert!(found.is_some());
        let found = found.unwrap();
        assert_eq!(found.name, "docs");
        assert_eq!(found.status, JobStatus::Created);
    }

    #[test]
    fn test_find_missing_job_returns_none() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.find_job("nope").unwrap().is_none());
    }

    #[test]
    fn test_upsert_job_replaces_existing() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut job = sample_job("docs-http://example.com/");
        storage.upsert_job(&job).unwrap();

        job.status = JobStatus::Finished;
        job.crawled_pages = 42;
        storage.upsert_job(&job).unwrap();

        let found = storage.find_job("docs-http://example.com/").unwrap().unwrap();
        assert_eq!(found.status, JobStatus::Finished);
        assert_eq!(found.crawled_pages, 42);
        assert_eq!(storage.list_jobs().unwrap().len(), 1);
    }

    #[test]
    fn test_list_jobs_sorted_by_unique_name() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage.upsert_job(&sample_job("b-job")).unwrap();
        storage.upsert_job(&sample_job("a-job")).unwrap();

        let jobs = storage.list_jobs().unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].unique_name, "a-job");
        assert_eq!(jobs[1].unique_name, "b-job");
    }

    #[test]
    fn test_duplicate_dead_link_ignored() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_dead_link("http://example.com/gone", "2024-01-01T00:00:00Z")
            .unwrap();
        storage
            .insert_dead_link("http://example.com/gone", "2024-06-01T00:00:00Z")
            .unwrap();

        let links = storage.list_dead_links().unwrap();
        assert_eq!(links.len(), 1);
        // First write wins
        assert_eq!(links[0].last_crawled_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_find_dead_link() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_dead_link("http://example.com/gone", "2024-01-01T00:00:00Z")
            .unwrap();

        assert!(storage
            .find_dead_link("http://example.com/gone")
            .unwrap()
            .is_some());
        assert!(storage
            .find_dead_link("http://example.com/alive")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_file_links_deduplicated_and_sorted() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        storage
            .insert_file_link("http://example.com/b.pdf", "PDF")
            .unwrap();
        storage
            .insert_file_link("http://example.com/a.zip", "ZIP")
            .unwrap();
        storage
            .insert_file_link("http://example.com/b.pdf", "PDF")
            .unwrap();

        let links = storage.list_file_links().unwrap();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "http://example.com/a.zip");
        assert_eq!(links[1].url, "http://example.com/b.pdf");
    }

    #[test]
    fn test_page_snapshot_roundtrip_and_replace() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut snapshot = PageSnapshotRecord {
            url: "http://example.com/".to_string(),
            domain: "example.com".to_string(),
            title: Some("Example".to_string()),
            html: "<html><body>hello</body></html>".to_string(),
            status_code: Some(200),
            last_modified: None,
            fetched_at: "2024-01-01T00:00:00Z".to_string(),
        };
        storage.upsert_page_snapshot(&snapshot).unwrap();
        assert_eq!(storage.count_page_snapshots().unwrap(), 1);

        snapshot.title = Some("Example v2".to_string());
        storage.upsert_page_snapshot(&snapshot).unwrap();

        let stored = storage
            .get_page_snapshot("http://example.com/")
            .unwrap()
            .unwrap();
        assert_eq!(stored.title.as_deref(), Some("Example v2"));
        assert_eq!(storage.count_page_snapshots().unwrap(), 1);
    }
}

//! Page processing pipeline
//!
//! After a page is fetched (and, on revisits, judged worth reprocessing),
//! it is handed to a pipeline. The default pipeline snapshots the page to
//! storage and records any discovered file links; tests substitute their
//! own implementations to observe what the engine admits.

use crate::crawler::extract::{extract_file_links, extract_title, has_text};
use crate::crawler::fetcher::FetchedPage;
use crate::job::CrawlJob;
use crate::storage::{PageSnapshotRecord, SqliteStorage, Storage};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Consumes fetched pages the engine decides to process
pub trait PagePipeline: Send {
    /// Processes one fetched page in the context of its job
    fn process_page(&mut self, page: &FetchedPage, job: &CrawlJob) -> crate::Result<()>;
}

/// Pipeline that snapshots pages and file links into SQLite
pub struct SnapshotPipeline {
    storage: Arc<Mutex<SqliteStorage>>,
}

impl SnapshotPipeline {
    pub fn new(storage: Arc<Mutex<SqliteStorage>>) -> Self {
        Self { storage }
    }

    /// Mail-like URLs and textless documents are not worth keeping
    fn is_processable(page: &FetchedPage) -> bool {
        if page.url.contains("mailto") || page.url.contains('@') {
            return false;
        }
        has_text(&page.body)
    }
}

impl PagePipeline for SnapshotPipeline {
    fn process_page(&mut self, page: &FetchedPage, job: &CrawlJob) -> crate::Result<()> {
        if !Self::is_processable(page) {
            debug!(url = %page.url, "skipping unprocessable page");
            return Ok(());
        }

        let domain = url::Url::parse(&page.url)
            .ok()
            .and_then(|u| u.host_str().map(|h| h.to_string()))
            .unwrap_or_default();

        let snapshot = PageSnapshotRecord {
            url: page.url.clone(),
            domain,
            title: extract_title(&page.body),
            html: page.body.clone(),
            status_code: page.status_code,
            last_modified: page.last_modified.map(|t| t.to_rfc3339()),
            fetched_at: page.fetched_at.to_rfc3339(),
        };

        let file_links = extract_file_links(page, &job.file_extensions);

        let mut storage = self.storage.lock().unwrap();
        storage.upsert_page_snapshot(&snapshot)?;
        for file_link in &file_links {
            storage.insert_file_link(&file_link.url, &file_link.extension)?;
        }

        Ok(())
    }
}

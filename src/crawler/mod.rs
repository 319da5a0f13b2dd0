//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching and failure classification
//! - HTML link and file-link extraction
//! - The revisit (staleness) policy
//! - The per-job crawl engine and its page pipeline

mod engine;
mod extract;
mod fetcher;
mod pipeline;
mod revisit;

pub use engine::{CrawlEngine, CrawlOutcome};
pub use extract::{
    extract_file_links, extract_links, extract_title, file_extension, ExtractedFileLink,
};
pub use fetcher::{build_http_client, fetch_page, FetchFailure, FetchedPage};
pub use pipeline::{PagePipeline, SnapshotPipeline};
pub use revisit::should_reprocess;

use crate::config::JobSpec;
use crate::job::CrawlJob;
use crate::storage::SqliteStorage;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Submits a job and runs it to completion with the snapshot pipeline
///
/// This is the main entry point for crawling one configured job. It will:
/// 1. Resolve the job's unique name and persist it as Created
/// 2. Build the crawl engine with the shared storage handle
/// 3. Run the crawl loop until it terminates or shutdown is signalled
///
/// # Arguments
///
/// * `spec` - The validated job configuration
/// * `user_agent` - Service-wide User-Agent string
/// * `storage` - Shared storage handle
/// * `shutdown` - Shutdown signal receiver
pub async fn run_job(
    spec: &JobSpec,
    user_agent: &str,
    storage: Arc<Mutex<SqliteStorage>>,
    shutdown: watch::Receiver<bool>,
) -> crate::Result<CrawlOutcome> {
    let job = {
        let mut guard = storage.lock().unwrap();
        CrawlJob::submit(spec, user_agent, &mut *guard)?
    };

    let pipeline = SnapshotPipeline::new(storage.clone());
    let engine = CrawlEngine::new(job, storage, pipeline)?.with_shutdown(shutdown);
    engine.run().await
}

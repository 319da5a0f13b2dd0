//! Crawl engine
//!
//! Drives one job from Created through Running to Finished. The engine owns
//! the frontier (FIFO), the visited index, and the job's dead-link set;
//! everything it persists goes through the shared storage handle.

use crate::crawler::extract::extract_links;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchedPage};
use crate::crawler::pipeline::PagePipeline;
use crate::crawler::revisit::should_reprocess;
use crate::job::CrawlJob;
use crate::storage::{SqliteStorage, Storage};
use crate::url::{admit, is_valid_url, url_allowed, AdmissionState};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Final state of a completed crawl
#[derive(Debug)]
pub struct CrawlOutcome {
    pub unique_name: String,
    pub crawled_pages: u32,
    /// URLs still queued when the crawl stopped
    pub frontier_remaining: Vec<String>,
    /// URLs judged dead during the crawl, in-memory set
    pub dead_links: HashSet<String>,
}

/// Sequential crawl loop for a single job
pub struct CrawlEngine<P: PagePipeline> {
    job: CrawlJob,
    client: Client,
    storage: Arc<Mutex<SqliteStorage>>,
    pipeline: P,
    frontier: VecDeque<String>,
    /// Mirror of the frontier for O(1) membership checks
    queued: HashSet<String>,
    /// Fetched URLs and their last-known Last-Modified value
    visited: HashMap<String, Option<DateTime<Utc>>>,
    dead_links: HashSet<String>,
    shutdown: Option<watch::Receiver<bool>>,
}

impl<P: PagePipeline> CrawlEngine<P> {
    /// Creates an engine for a submitted job, seeding the frontier
    pub fn new(
        job: CrawlJob,
        storage: Arc<Mutex<SqliteStorage>>,
        pipeline: P,
    ) -> crate::Result<Self> {
        let client = build_http_client(&job.user_agent, job.timeout_ms, job.follow_redirects)?;

        let mut frontier = VecDeque::new();
        let mut queued = HashSet::new();
        for seed in &job.seed_urls {
            if queued.insert(seed.clone()) {
                frontier.push_back(seed.clone());
            }
        }

        Ok(Self {
            job,
            client,
            storage,
            pipeline,
            frontier,
            queued,
            visited: HashMap::new(),
            dead_links: HashSet::new(),
            shutdown: None,
        })
    }

    /// Attaches a shutdown signal, checked once per cycle
    pub fn with_shutdown(mut self, shutdown: watch::Receiver<bool>) -> Self {
        self.shutdown = Some(shutdown);
        self
    }

    /// Runs the crawl to completion
    ///
    /// The loop ends when the frontier drains, the page budget is reached,
    /// or shutdown is signalled. All three paths transition the job to
    /// Finished; a running job has no failure terminal.
    pub async fn run(mut self) -> crate::Result<CrawlOutcome> {
        self.job.start();
        self.persist_job()?;
        info!(job = %self.job.unique_name, seeds = self.job.seed_urls.len(), "starting crawl");

        let mut crawled_pages = 0u32;

        loop {
            if self.shutdown_requested() {
                info!(job = %self.job.unique_name, "shutdown requested, stopping crawl");
                break;
            }

            let url = match self.frontier.pop_front() {
                Some(url) => url,
                None => break,
            };
            self.queued.remove(&url);

            let admitted = self.crawl_page(&url).await;
            if admitted {
                crawled_pages += 1;
                if self.job.max_pages != 0 && crawled_pages >= self.job.max_pages {
                    info!(job = %self.job.unique_name, "page budget reached");
                    break;
                }
                if self.job.crawl_delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(self.job.crawl_delay_ms)).await;
                }
            }
        }

        self.job.finish(crawled_pages);
        self.persist_job()?;
        info!(
            job = %self.job.unique_name,
            pages = crawled_pages,
            dead_links = self.dead_links.len(),
            "crawl finished"
        );

        Ok(CrawlOutcome {
            unique_name: self.job.unique_name,
            crawled_pages,
            frontier_remaining: self.frontier.into_iter().collect(),
            dead_links: self.dead_links,
        })
    }

    /// Processes one frontier URL; returns true if the cycle was admitted
    async fn crawl_page(&mut self, url: &str) -> bool {
        let evaluating_revisit = self.job.revisiting && self.visited.contains_key(url);

        if !self.is_admissible(url, evaluating_revisit) {
            self.record_if_dead(url);
            return false;
        }

        let page = match fetch_page(&self.client, url).await {
            Ok(page) => page,
            Err(failure) => {
                warn!(url, %failure, "fetch failed");
                self.record_dead(url);
                FetchedPage::placeholder(url)
            }
        };

        if evaluating_revisit {
            let previous = self.visited.get(url).copied().flatten();
            if should_reprocess(page.last_modified, previous, self.job.revisiting) {
                self.process(&page);
                self.merge_links(&page);
            } else {
                // A revisit the policy rejected is skipped entirely; no
                // extraction, nothing new enters the frontier
                debug!(url, "page unchanged since last visit");
            }
        } else {
            self.visited.insert(url.to_string(), page.last_modified);
            self.process(&page);
            self.merge_links(&page);
        }

        // Revisiting jobs cycle their URLs; the page budget is the only
        // termination guard in that mode.
        if self.job.revisiting && !self.dead_links.contains(url) && self.queued.insert(url.to_string())
        {
            self.frontier.push_back(url.to_string());
        }

        true
    }

    fn process(&mut self, page: &FetchedPage) {
        if let Err(e) = self.pipeline.process_page(page, &self.job) {
            error!(url = %page.url, error = %e, "pipeline failed");
        }
    }

    /// Appends extracted links to the frontier
    ///
    /// A link that fails the syntax or domain rules goes onto the in-memory
    /// dead set; an admissible link is enqueued unless already queued,
    /// visited, or dead.
    fn merge_links(&mut self, page: &FetchedPage) {
        for link in extract_links(page) {
            if !url_allowed(&link, &self.job.allowed_domains, &self.job.denied_domains) {
                self.dead_links.insert(link);
            } else if !self.visited.contains_key(&link)
                && !self.dead_links.contains(&link)
                && !self.queued.contains(&link)
            {
                self.queued.insert(link.clone());
                self.frontier.push_back(link);
            }
        }
    }

    fn is_admissible(&self, url: &str, evaluating_revisit: bool) -> bool {
        let state = AdmissionState {
            allowed_domains: &self.job.allowed_domains,
            denied_domains: &self.job.denied_domains,
            visited: &self.visited,
            dead_links: &self.dead_links,
        };
        admit(url, &state, evaluating_revisit)
    }

    /// Persists a dead link only when the URL fails syntax validation
    fn record_if_dead(&mut self, url: &str) {
        if !is_valid_url(url) {
            self.record_dead(url);
        }
    }

    /// Persists a dead link unconditionally
    fn record_dead(&mut self, url: &str) {
        self.dead_links.insert(url.to_string());
        let now = Utc::now().to_rfc3339();
        if let Err(e) = self.storage.lock().unwrap().insert_dead_link(url, &now) {
            error!(url, error = %e, "failed to persist dead link");
        }
    }

    fn persist_job(&self) -> crate::Result<()> {
        self.storage
            .lock()
            .unwrap()
            .upsert_job(&self.job.to_record())?;
        Ok(())
    }

    fn shutdown_requested(&self) -> bool {
        self.shutdown
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false)
    }
}

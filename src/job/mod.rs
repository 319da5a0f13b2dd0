//! Crawl job lifecycle
//!
//! A job is a single submitted crawl: its admission configuration, its
//! collision-resolved unique name, and its lifecycle state. Jobs move
//! through Created, Running, and Finished exactly once, in that order.

use crate::config::{validate_job_spec, JobSpec};
use crate::storage::{JobRecord, Storage};
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;

/// Lifecycle state of a crawl job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Job record exists but the crawl has not started
    Created,

    /// The crawl loop is executing
    Running,

    /// The crawl completed or was stopped; terminal
    Finished,
}

impl JobStatus {
    /// Converts the status to a database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Running => "running",
            Self::Finished => "finished",
        }
    }

    /// Parses a status from a database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "created" => Some(Self::Created),
            "running" => Some(Self::Running),
            "finished" => Some(Self::Finished),
            _ => None,
        }
    }

    /// Numeric status identifier stored alongside the string form
    pub fn status_id(&self) -> u32 {
        match self {
            Self::Created => 1,
            Self::Running => 2,
            Self::Finished => 4,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// A submitted crawl job with its resolved identity and live state
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub name: String,
    /// Collision-resolved identity, derived from name and first seed
    pub unique_name: String,
    pub allowed_domains: Vec<String>,
    pub denied_domains: Vec<String>,
    pub seed_urls: Vec<String>,
    pub revisiting: bool,
    pub crawl_delay_ms: u64,
    pub timeout_ms: u64,
    pub follow_redirects: bool,
    pub max_pages: u32,
    pub user_agent: String,
    pub file_extensions: Vec<String>,
    pub status: JobStatus,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub crawled_pages: u32,
    pub cycle_number: u32,
}

impl CrawlJob {
    /// Submits a job: resolves a unique name against the job store and
    /// persists the record in the Created state
    ///
    /// The base identity is `"{name}-{first_seed}"`. If that name is already
    /// taken, a `-N` suffix is appended, counting up from 1 until a free
    /// name is found.
    pub fn submit<S: Storage>(
        spec: &JobSpec,
        user_agent: &str,
        storage: &mut S,
    ) -> Result<Self> {
        validate_job_spec(spec)?;

        let base = format!("{}-{}", spec.name, spec.seed_urls[0]);

        let mut cycle_number = 0u32;
        let mut unique_name = base.clone();
        while storage.find_job(&unique_name)?.is_some() {
            cycle_number += 1;
            unique_name = format!("{}-{}", base, cycle_number);
        }

        let job = Self {
            name: spec.name.clone(),
            unique_name,
            allowed_domains: spec.allowed_domains.clone(),
            denied_domains: spec.denied_domains.clone(),
            seed_urls: spec.seed_urls.clone(),
            revisiting: spec.revisiting,
            crawl_delay_ms: spec.crawl_delay_ms,
            timeout_ms: spec.timeout_ms,
            follow_redirects: spec.follow_redirects,
            max_pages: spec.max_pages,
            user_agent: user_agent.to_string(),
            file_extensions: spec.file_extensions.clone(),
            status: JobStatus::Created,
            started_at: None,
            finished_at: None,
            crawled_pages: 0,
            cycle_number,
        };

        storage.upsert_job(&job.to_record())?;
        Ok(job)
    }

    /// Marks the job as running and stamps the start time
    pub fn start(&mut self) {
        self.status = JobStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Marks the job as finished with its final page count
    pub fn finish(&mut self, crawled_pages: u32) {
        self.status = JobStatus::Finished;
        self.finished_at = Some(Utc::now());
        self.crawled_pages = crawled_pages;
    }

    /// Projects the job onto its persisted record form
    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            name: self.name.clone(),
            unique_name: self.unique_name.clone(),
            status: self.status,
            started_at: self.started_at.map(|t| t.to_rfc3339()),
            finished_at: self.finished_at.map(|t| t.to_rfc3339()),
            crawled_pages: self.crawled_pages,
            cycle_number: self.cycle_number,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteStorage;

    fn sample_spec() -> JobSpec {
        JobSpec {
            name: "docs".to_string(),
            allowed_domains: vec!["example.com".to_string()],
            denied_domains: vec![],
            seed_urls: vec!["http://example.com/".to_string()],
            revisiting: false,
            crawl_delay_ms: 0,
            timeout_ms: 30000,
            follow_redirects: true,
            max_pages: 0,
            file_extensions: vec!["pdf".to_string()],
        }
    }

    #[test]
    fn test_status_db_string_roundtrip() {
        for status in [JobStatus::Created, JobStatus::Running, JobStatus::Finished] {
            assert_eq!(
                JobStatus::from_db_string(status.to_db_string()),
                Some(status)
            );
        }
        assert_eq!(JobStatus::from_db_string("bogus"), None);
    }

    #[test]
    fn test_status_ids() {
        assert_eq!(JobStatus::Created.status_id(), 1);
        assert_eq!(JobStatus::Running.status_id(), 2);
        assert_eq!(JobStatus::Finished.status_id(), 4);
    }

    #[test]
    fn test_submit_derives_unique_name() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let job = CrawlJob::submit(&sample_spec(), "test-agent", &mut storage).unwrap();

        assert_eq!(job.unique_name, "docs-http://example.com/");
        assert_eq!(job.status, JobStatus::Created);
        assert_eq!(job.cycle_number, 0);

        let record = storage.find_job(&job.unique_name).unwrap().unwrap();
        assert_eq!(record.status, JobStatus::Created);
    }

    #[test]
    fn test_resubmission_gets_numeric_suffix() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let spec = sample_spec();

        let first = CrawlJob::submit(&spec, "test-agent", &mut storage).unwrap();
        let second = CrawlJob::submit(&spec, "test-agent", &mut storage).unwrap();
        let third = CrawlJob::submit(&spec, "test-agent", &mut storage).unwrap();

        assert_eq!(first.unique_name, "docs-http://example.com/");
        assert_eq!(second.unique_name, "docs-http://example.com/-1");
        assert_eq!(third.unique_name, "docs-http://example.com/-2");
        assert_eq!(second.cycle_number, 1);
        assert_eq!(third.cycle_number, 2);
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let mut job = CrawlJob::submit(&sample_spec(), "test-agent", &mut storage).unwrap();

        job.start();
        assert_eq!(job.status, JobStatus::Running);
        assert!(job.started_at.is_some());

        job.finish(7);
        assert_eq!(job.status, JobStatus::Finished);
        assert!(job.finished_at.is_some());
        assert_eq!(job.crawled_pages, 7);
    }
}

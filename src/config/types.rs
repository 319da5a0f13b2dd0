use serde::Deserialize;

/// Main configuration structure for gossamer
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default, rename = "job")]
    pub jobs: Vec<JobSpec>,
}

/// Service-wide configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// User agent sent with every crawl request
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// A single crawl job as submitted by the operator
///
/// This is the job-submission record: everything the engine needs to run
/// one crawl, with the same defaults the service has always applied.
#[derive(Debug, Clone, Deserialize)]
pub struct JobSpec {
    /// Job name; combined with the first seed URL into the unique name
    pub name: String,

    /// Domain tokens the crawl is confined to (fuzzy-matched)
    #[serde(rename = "allowed-domains", default)]
    pub allowed_domains: Vec<String>,

    /// Domain tokens that are always rejected
    #[serde(rename = "denied-domains", default)]
    pub denied_domains: Vec<String>,

    /// URLs the crawl starts from
    #[serde(rename = "seed-urls", default)]
    pub seed_urls: Vec<String>,

    /// Re-fetch already-seen pages when they report a newer Last-Modified
    #[serde(default)]
    pub revisiting: bool,

    /// Politeness delay between fetches, in milliseconds
    #[serde(rename = "crawl-delay-ms", default = "default_crawl_delay_ms")]
    pub crawl_delay_ms: u64,

    /// Per-fetch timeout, in milliseconds
    #[serde(rename = "timeout-ms", default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Follow HTTP redirects during fetches
    #[serde(rename = "follow-redirects", default = "default_follow_redirects")]
    pub follow_redirects: bool,

    /// Stop after this many admitted cycles; 0 means unlimited
    #[serde(rename = "max-pages", default)]
    pub max_pages: u32,

    /// File extensions collected into the file-link store
    #[serde(rename = "file-extensions", default = "default_file_extensions")]
    pub file_extensions: Vec<String>,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (compatible; gossamer/0.1)".to_string()
}

fn default_crawl_delay_ms() -> u64 {
    3000
}

fn default_timeout_ms() -> u64 {
    30000
}

fn default_follow_redirects() -> bool {
    true
}

fn default_file_extensions() -> Vec<String> {
    [
        "pdf", "xls", "xlsx", "doc", "docx", "zip", "rar", "txt", "bin", "csv", "dat",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

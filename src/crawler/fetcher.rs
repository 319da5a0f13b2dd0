//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler: building a client
//! per job configuration, fetching pages, and classifying failures.

use chrono::{DateTime, Utc};
use reqwest::{header::REFERER, redirect::Policy, Client};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

/// Referrer sent with every page request
const REFERRER: &str = "http://www.google.com";

/// A successfully fetched page, before any parsing
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL as requested (not the post-redirect URL)
    pub url: String,
    pub status_code: Option<u16>,
    /// Raw response body
    pub body: String,
    /// Response headers, names lowercased
    pub headers: HashMap<String, String>,
    /// Parsed Last-Modified header, if present and well-formed
    pub last_modified: Option<DateTime<Utc>>,
    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// An empty stand-in for a page whose fetch failed
    ///
    /// Carries no body, so extraction finds nothing and the pipeline
    /// skips it; downstream stages need no failure special-casing.
    pub fn placeholder(url: &str) -> Self {
        Self {
            url: url.to_string(),
            status_code: None,
            body: String::new(),
            headers: HashMap::new(),
            last_modified: None,
            fetched_at: Utc::now(),
        }
    }
}

/// Reason a fetch attempt failed
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed")]
    Connect,

    #[error("HTTP status {0}")]
    Http(u16),

    #[error("{0}")]
    Other(String),
}

/// Builds an HTTP client configured for one job
///
/// # Arguments
///
/// * `user_agent` - User-Agent string sent with every request
/// * `timeout_ms` - Per-request timeout in milliseconds
/// * `follow_redirects` - Whether to follow redirect chains (max 10 hops)
pub fn build_http_client(
    user_agent: &str,
    timeout_ms: u64,
    follow_redirects: bool,
) -> Result<Client, reqwest::Error> {
    let redirect_policy = if follow_redirects {
        Policy::limited(10)
    } else {
        Policy::none()
    };

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_millis(timeout_ms))
        .redirect(redirect_policy)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a page, returning its body and headers on success
///
/// Any non-2xx status is a failure; the engine treats every failure the
/// same way, as a dead link. The Last-Modified header is parsed as an
/// RFC 2822 date; an unparseable value is treated as absent.
pub async fn fetch_page(client: &Client, url: &str) -> Result<FetchedPage, FetchFailure> {
    let response = client
        .get(url)
        .header(REFERER, REFERRER)
        .send()
        .await
        .map_err(classify_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Http(status.as_u16()));
    }

    let headers: HashMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_lowercase(), v.to_string()))
        })
        .collect();

    let last_modified = headers
        .get("last-modified")
        .and_then(|v| DateTime::parse_from_rfc2822(v).ok())
        .map(|d| d.with_timezone(&Utc));

    let body = response.text().await.map_err(classify_error)?;

    Ok(FetchedPage {
        url: url.to_string(),
        status_code: Some(status.as_u16()),
        body,
        headers,
        last_modified,
        fetched_at: Utc::now(),
    })
}

fn classify_error(e: reqwest::Error) -> FetchFailure {
    if e.is_timeout() {
        FetchFailure::Timeout
    } else if e.is_connect() {
        FetchFailure::Connect
    } else {
        FetchFailure::Other(e.to_string())
    }
}

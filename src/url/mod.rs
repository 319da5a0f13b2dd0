//! URL admission filtering
//!
//! This module decides whether a candidate URL may enter (or re-enter) the
//! crawl frontier. Admission is a pure decision over the state the caller
//! supplies; it performs no I/O beyond URI syntax checking. Reachability is
//! the fetch step's concern.

mod matcher;

pub use matcher::domain_matches;

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use url::Url;

/// The crawl state an admission decision is evaluated against
///
/// All fields are borrowed from the engine; the filter never mutates them.
pub struct AdmissionState<'a> {
    /// Domain tokens the crawl is confined to (empty = unrestricted)
    pub allowed_domains: &'a [String],

    /// Domain tokens that are always rejected (deny wins over allow)
    pub denied_domains: &'a [String],

    /// URLs already fetched, with their last-known freshness timestamp
    pub visited: &'a HashMap<String, Option<DateTime<Utc>>>,

    /// URLs confirmed dead during this job
    pub dead_links: &'a HashSet<String>,
}

/// Parses a candidate as a fetchable absolute URL
///
/// Only http/https URLs with a host qualify; everything else (relative
/// references, mailto:, malformed input) is rejected, never an error.
pub fn parse_candidate(candidate: &str) -> Option<Url> {
    let url = Url::parse(candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.host_str()?;
    Some(url)
}

/// Returns true if the candidate is a syntactically valid absolute URL
pub fn is_valid_url(candidate: &str) -> bool {
    parse_candidate(candidate).is_some()
}

/// Checks only the syntax and domain rules, ignoring crawl state
///
/// Used on freshly extracted links, where visited/queued/dead membership
/// decides enqueueing separately:
/// 1. the candidate parses as a valid absolute URL,
/// 2. if the allow list is non-empty, the host matches at least one allowed
///    domain token ([`domain_matches`]),
/// 3. the host matches no denied domain token.
pub fn url_allowed(candidate: &str, allowed: &[String], denied: &[String]) -> bool {
    let Some(url) = parse_candidate(candidate) else {
        return false;
    };

    if !allowed.is_empty() && !allowed.iter().any(|d| domain_matches(d, &url)) {
        tracing::debug!("URL not within allowed domains: {}", candidate);
        return false;
    }

    if denied.iter().any(|d| domain_matches(d, &url)) {
        tracing::debug!("URL within denied domains: {}", candidate);
        return false;
    }

    true
}

/// Decides whether a URL may enter the frontier
///
/// The [`url_allowed`] rules must hold, and additionally:
/// 4. the URL has not been visited — skipped when `evaluating_revisit`,
///    because whether a visited URL is re-fetched is the revisit policy's
///    decision, made upstream,
/// 5. the URL is not in the dead-link set.
pub fn admit(candidate: &str, state: &AdmissionState<'_>, evaluating_revisit: bool) -> bool {
    if !url_allowed(candidate, state.allowed_domains, state.denied_domains) {
        return false;
    }

    if !evaluating_revisit && state.visited.contains_key(candidate) {
        tracing::debug!("URL already visited: {}", candidate);
        return false;
    }

    if state.dead_links.contains(candidate) {
        tracing::debug!("URL is a dead link: {}", candidate);
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state<'a>(
        allowed: &'a [String],
        denied: &'a [String],
        visited: &'a HashMap<String, Option<DateTime<Utc>>>,
        dead: &'a HashSet<String>,
    ) -> AdmissionState<'a> {
        AdmissionState {
            allowed_domains: allowed,
            denied_domains: denied,
            visited,
            dead_links: dead,
        }
    }

    #[test]
    fn test_invalid_url_never_admitted() {
        let visited = HashMap::new();
        let dead = HashSet::new();
        let st = state(&[], &[], &visited, &dead);

        assert!(!admit("not a url", &st, false));
        assert!(!admit("htp:/broken", &st, false));
        assert!(!admit("mailto:user@example.com", &st, false));
        assert!(!admit("/relative/path", &st, false));
    }

    #[test]
    fn test_allow_list_fuzzy_match() {
        let allowed = vec!["example.com".to_string()];
        let visited = HashMap::new();
        let dead = HashSet::new();
        let st = state(&allowed, &[], &visited, &dead);

        assert!(admit("http://sub.example.com/path", &st, false));
        assert!(admit("https://www.example.com", &st, false));
        assert!(!admit("http://other.org", &st, false));
    }

    #[test]
    fn test_empty_allow_list_admits_any_domain() {
        let visited = HashMap::new();
        let dead = HashSet::new();
        let st = state(&[], &[], &visited, &dead);

        assert!(admit("http://anything.example/", &st, false));
    }

    #[test]
    fn test_deny_list_wins_over_allow_list() {
        let allowed = vec!["example.com".to_string()];
        let denied = vec!["bad.example.com".to_string()];
        let visited = HashMap::new();
        let dead = HashSet::new();
        let st = state(&allowed, &denied, &visited, &dead);

        assert!(admit("http://good.example.com/", &st, false));
        assert!(!admit("http://bad.example.com/", &st, false));
        assert!(!admit("http://sub.bad.example.com/", &st, false));
    }

    #[test]
    fn test_visited_url_rejected() {
        let mut visited = HashMap::new();
        visited.insert("http://example.com/".to_string(), None);
        let dead = HashSet::new();
        let st = state(&[], &[], &visited, &dead);

        assert!(!admit("http://example.com/", &st, false));
        assert!(admit("http://example.com/other", &st, false));
    }

    #[test]
    fn test_revisit_bypasses_visited_check() {
        let mut visited = HashMap::new();
        visited.insert("http://example.com/".to_string(), Some(Utc::now()));
        let dead = HashSet::new();
        let st = state(&[], &[], &visited, &dead);

        assert!(admit("http://example.com/", &st, true));
    }

    #[test]
    fn test_dead_link_always_rejected() {
        let visited = HashMap::new();
        let mut dead = HashSet::new();
        dead.insert("http://example.com/gone".to_string());
        let st = state(&[], &[], &visited, &dead);

        assert!(!admit("http://example.com/gone", &st, false));
        // even when evaluating a revisit
        assert!(!admit("http://example.com/gone", &st, true));
    }

    #[test]
    fn test_url_allowed_ignores_crawl_state() {
        let allowed = vec!["example.com".to_string()];
        let denied = vec!["bad.example.com".to_string()];

        assert!(url_allowed("http://example.com/", &allowed, &denied));
        assert!(!url_allowed("http://other.org/", &allowed, &denied));
        assert!(!url_allowed("http://bad.example.com/", &allowed, &denied));
        assert!(!url_allowed("not a url", &allowed, &denied));
    }

    #[test]
    fn test_is_valid_url() {
        assert!(is_valid_url("http://example.com"));
        assert!(is_valid_url("https://example.com/a?b=c"));

        assert!(!is_valid_url("example.com"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url(""));
    }
}

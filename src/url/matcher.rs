use url::Url;

/// Checks whether a URL's host matches a domain token under the fuzzy rule
///
/// A token matches when it appears as a contiguous run of labels in the
/// host, after stripping a leading `www.`. The token may be the whole host,
/// a label prefix, a label suffix, or an interior run:
///
/// - `"example.com"` matches `example.com`, `sub.example.com`,
///   `www.example.com`
/// - `"news.google"` matches `news.google.de` and `www.news.google.de`
/// - `"example.com"` does not match `notexample.com` or `example.com.org`'s
///   sibling `other.org`
///
/// Matching is case-insensitive on the token side; the `url` crate already
/// lowercases hosts.
pub fn domain_matches(pattern: &str, url: &Url) -> bool {
    if pattern.is_empty() {
        return false;
    }
    let pattern = pattern.to_ascii_lowercase();

    let Some(host) = url.host_str() else {
        return false;
    };
    let host = host.strip_prefix("www.").unwrap_or(host);

    if host == pattern {
        return true;
    }
    if let Some(rest) = host.strip_prefix(&pattern) {
        if rest.starts_with('.') {
            return true;
        }
    }
    if let Some(rest) = host.strip_suffix(&pattern) {
        if rest.ends_with('.') {
            return true;
        }
    }
    host.contains(&format!(".{}.", pattern))
}

//! HTML link and content extraction
//!
//! Parsing happens on the raw body, synchronously, so the crawl futures
//! stay Send. `scraper::Html` never crosses an await point.

use crate::crawler::fetcher::FetchedPage;
use scraper::{Html, Selector};

/// A link to a downloadable file discovered on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFileLink {
    pub url: String,
    /// Normalized uppercase extension, e.g. "PDF"
    pub extension: String,
}

/// Extracts all followable page links from a fetched page
///
/// Absolute http(s) URLs are kept as written. Relative links are resolved
/// against the page URL; if that fails, the response Host header is used
/// to rebuild an absolute URL. Anchors that are neither (mail links,
/// javascript pseudo-URLs, protocol-relative links) are dropped.
pub fn extract_links(page: &FetchedPage) -> Vec<String> {
    let document = Html::parse_document(&page.body);
    let selector = Selector::parse("a[href]").unwrap();

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };
        if href.is_empty() {
            continue;
        }

        if href.starts_with("http://") || href.starts_with("https://") {
            links.push(href.to_string());
        } else if is_relative_link(href) {
            if let Some(resolved) = resolve_relative_link(page, href) {
                links.push(resolved);
            }
        }
    }
    links
}

/// Extracts links to downloadable files matching the allowed extensions
///
/// The link's extension is the substring after its last `.`, compared
/// case-insensitively, so a link named `notapdf` does not match `pdf`.
pub fn extract_file_links(page: &FetchedPage, extensions: &[String]) -> Vec<ExtractedFileLink> {
    let document = Html::parse_document(&page.body);
    let selector = Selector::parse("a[href]").unwrap();

    let mut file_links = Vec::new();
    for element in document.select(&selector) {
        let href = match element.value().attr("href") {
            Some(href) => href.trim(),
            None => continue,
        };
        let Some(extension) = file_extension(href) else {
            continue;
        };
        if !extensions.iter().any(|e| e.eq_ignore_ascii_case(&extension)) {
            continue;
        }

        let url = if is_relative_link(href) {
            match resolve_relative_link(page, href) {
                Some(resolved) => resolved,
                None => continue,
            }
        } else {
            href.to_string()
        };
        file_links.push(ExtractedFileLink { url, extension });
    }
    file_links
}

/// The uppercased substring after the last `.`, if any
pub fn file_extension(url: &str) -> Option<String> {
    let (_, extension) = url.rsplit_once('.')?;
    if extension.is_empty() {
        return None;
    }
    Some(extension.to_uppercase())
}

/// Extracts the page title, if any
pub fn extract_title(body: &str) -> Option<String> {
    let document = Html::parse_document(body);
    let selector = Selector::parse("title").unwrap();

    document.select(&selector).next().and_then(|element| {
        let title = element.text().collect::<String>().trim().to_string();
        if title.is_empty() {
            None
        } else {
            Some(title)
        }
    })
}

/// Returns true if the document contains any visible text
pub fn has_text(body: &str) -> bool {
    let document = Html::parse_document(body);
    document
        .root_element()
        .text()
        .any(|t| !t.trim().is_empty())
}

/// A link is relative when it carries no scheme, host, or drive prefix
fn is_relative_link(href: &str) -> bool {
    let lowered = href.to_lowercase();
    !(lowered.starts_with("www.")
        || lowered.starts_with("http://")
        || lowered.starts_with("https://")
        || lowered.starts_with("ftp://")
        || lowered.starts_with("ftps://")
        || lowered.starts_with("//")
        || lowered.starts_with("mailto:")
        || lowered.starts_with("javascript:"))
}

fn resolve_relative_link(page: &FetchedPage, href: &str) -> Option<String> {
    if let Ok(base) = url::Url::parse(&page.url) {
        if let Ok(joined) = base.join(href) {
            return Some(joined.to_string());
        }
    }

    // Fall back on the response Host header
    page.headers
        .get("host")
        .map(|host| format!("http://www.{}{}", host, href))
}

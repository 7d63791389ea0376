//! Link discovery: fetch the directory listing and collect archive links.

use scraper::{Html, Selector};
use url::Url;

use crate::fetch::{self, HttpOptions};
use crate::retry::{run_with_retry, RetryPolicy};
use crate::url_model::{normalize_base_url, ArchiveLink};

/// Fetches `base_url` and returns every `.7z` link on the page in document order.
///
/// A fetch failure (after retries) or an unparsable base URL is logged and yields
/// an empty list; the caller treats "no links" as its own outcome.
pub fn discover_links(base_url: &str, http: &HttpOptions, retry: &RetryPolicy) -> Vec<ArchiveLink> {
    let normalized = normalize_base_url(base_url);
    let base = match Url::parse(&normalized) {
        Ok(u) => u,
        Err(e) => {
            tracing::error!("Invalid base URL {}: {}", base_url, e);
            return Vec::new();
        }
    };

    let html = match run_with_retry(retry, "listing fetch", || {
        fetch::fetch_page(base.as_str(), http)
    }) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!("Failed to access URL {}: {}", base, e);
            return Vec::new();
        }
    };

    let links = extract_archive_links(&base, &html);
    tracing::debug!("found {} archive link(s) at {}", links.len(), base);
    links
}

/// Resolves every `<a href>` in `html` against `base` and keeps the archive links.
/// Duplicates are kept; order follows the document.
pub fn extract_archive_links(base: &Url, html: &str) -> Vec<ArchiveLink> {
    let Ok(anchors) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    document
        .select(&anchors)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| {
            let href = href.trim();
            match base.join(href) {
                Ok(url) => ArchiveLink::from_url(url),
                Err(e) => {
                    tracing::warn!("skipping unresolvable href {:?}: {}", href, e);
                    None
                }
            }
        })
        .collect()
}

//! URL modeling for archive links.
//!
//! Normalizes the listing base URL, decides which hrefs point at archives, and
//! derives the local scratch filename for each archive link.

mod path;
mod sanitize;

pub use path::filename_from_url_path;
pub use sanitize::sanitize_filename_for_linux;

use url::Url;

/// Extension of the archives we verify. Matched case-insensitively on URL paths
/// and scratch files.
pub const ARCHIVE_EXTENSION: &str = ".7z";

/// True if `name` ends with `.7z`, ignoring ASCII case.
pub fn has_archive_extension(name: &str) -> bool {
    let ext = ARCHIVE_EXTENSION.len();
    name.len() >= ext
        && name.is_char_boundary(name.len() - ext)
        && name[name.len() - ext..].eq_ignore_ascii_case(ARCHIVE_EXTENSION)
}

/// Ensures the base URL ends with exactly one `/` so relative hrefs resolve inside
/// the listed directory rather than next to it.
pub fn normalize_base_url(raw: &str) -> String {
    format!("{}/", raw.trim().trim_end_matches('/'))
}

/// An archive referenced by the listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveLink {
    url: Url,
    file_name: String,
}

impl ArchiveLink {
    /// Builds a link from an absolute URL. Returns `None` unless the URL is HTTP(S),
    /// its path ends in `.7z`, and the derived filename still carries that extension
    /// after sanitizing.
    pub fn from_url(url: Url) -> Option<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return None;
        }
        if !has_archive_extension(url.path()) {
            return None;
        }
        let raw = filename_from_url_path(url.as_str())?;
        let file_name = sanitize_filename_for_linux(&raw);
        if !has_archive_extension(&file_name) || file_name.len() == ARCHIVE_EXTENSION.len() {
            return None;
        }
        Some(Self { url, file_name })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Basename of the URL path, safe to use inside the scratch directory.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(s: &str) -> Option<ArchiveLink> {
        ArchiveLink::from_url(Url::parse(s).unwrap())
    }

    #[test]
    fn archive_extension_is_case_insensitive() {
        assert!(has_archive_extension("B.7z"));
        assert!(has_archive_extension("B.7Z"));
        assert!(!has_archive_extension("B.7z.sha256"));
        assert!(!has_archive_extension("7z"));
        assert!(!has_archive_extension(""));
    }

    #[test]
    fn normalize_base_url_adds_single_slash() {
        assert_eq!(
            normalize_base_url("https://builds.example.com/rel"),
            "https://builds.example.com/rel/"
        );
        assert_eq!(
            normalize_base_url("https://builds.example.com/rel///"),
            "https://builds.example.com/rel/"
        );
    }

    #[test]
    fn link_derives_file_name() {
        let l = link("https://builds.example.com/rel/A-12_HIGH.7z").unwrap();
        assert_eq!(l.file_name(), "A-12_HIGH.7z");
        assert_eq!(l.url().as_str(), "https://builds.example.com/rel/A-12_HIGH.7z");
    }

    #[test]
    fn link_ignores_query_for_extension() {
        let l = link("https://builds.example.com/B.7z?sig=abc").unwrap();
        assert_eq!(l.file_name(), "B.7z");
        assert!(link("https://builds.example.com/get?file=B.7z").is_none());
    }

    #[test]
    fn link_rejects_non_http_and_bare_extension() {
        assert!(link("ftp://builds.example.com/B.7z").is_none());
        assert!(link("https://builds.example.com/.7z").is_none());
    }
}

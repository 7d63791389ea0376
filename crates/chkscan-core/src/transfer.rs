//! Archive transfer: download one archive link into the scratch directory.

use std::fs;
use std::path::Path;

use crate::fetch::{self, HttpOptions};
use crate::retry::{run_with_retry, FetchError, RetryPolicy};
use crate::url_model::ArchiveLink;

/// Downloads `link` to `dest`, retrying transient failures per `retry`.
///
/// Returns the byte count on success. On failure the partially written file is
/// removed so nothing half-downloaded is left for inspection.
pub fn download_archive(
    link: &ArchiveLink,
    dest: &Path,
    http: &HttpOptions,
    retry: &RetryPolicy,
) -> Result<u64, FetchError> {
    let what = format!("download of {}", link.file_name());
    let result = run_with_retry(retry, &what, || {
        fetch::stream_to_file(link.url().as_str(), dest, http)
    });
    match result {
        Ok(bytes) => {
            tracing::debug!("downloaded {} bytes to {}", bytes, dest.display());
            Ok(bytes)
        }
        Err(e) => {
            if dest.exists() {
                if let Err(rm) = fs::remove_file(dest) {
                    tracing::warn!("could not remove partial {}: {}", dest.display(), rm);
                }
            }
            Err(e)
        }
    }
}

//! Retry loop shared by discovery and archive transfer.

use super::error::FetchError;
use super::policy::RetryPolicy;

/// Runs `f` until it succeeds, fails with a non-transient error, or `policy`
/// runs out of attempts. Each retry is logged as a warning naming `what`. The
/// last error is returned unchanged.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, what: &str, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        let err = match f() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        let delay = match policy.backoff_after(attempt) {
            Some(d) if err.is_transient() => d,
            _ => return Err(err),
        };
        tracing::warn!(
            "{} failed (attempt {}/{}): {}; retrying in {:?}",
            what,
            attempt,
            policy.max_attempts,
            err,
            delay
        );
        std::thread::sleep(delay);
        attempt += 1;
    }
}

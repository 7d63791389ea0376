//! Blocking HTTP GETs over libcurl (via the `curl` crate).
//!
//! Two shapes: [`fetch_page`] buffers a small body (the directory listing) and
//! [`stream_to_file`] writes a large body to disk as curl delivers it.
//! Both run in the current thread and return a classifiable [`FetchError`].

mod page;
mod stream;

pub use page::fetch_page;
pub use stream::stream_to_file;

use crate::retry::FetchError;
use std::time::Duration;

const USER_AGENT: &str = concat!("chkscan/", env!("CARGO_PKG_VERSION"));

/// Timeouts applied to a single request.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub connect_timeout: Duration,
    /// Cap on the whole transfer; `None` for downloads of unknown size.
    pub total_timeout: Option<Duration>,
    /// Abort when fewer than 1 byte/s arrives for this long.
    pub stall_timeout: Duration,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            total_timeout: None,
            stall_timeout: Duration::from_secs(60),
        }
    }
}

/// Easy handle for a GET that follows redirects, with our timeouts applied.
fn new_easy(url: &str, opts: &HttpOptions) -> Result<curl::easy::Easy, FetchError> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.useragent(USER_AGENT)?;
    easy.connect_timeout(opts.connect_timeout)?;
    if let Some(t) = opts.total_timeout {
        easy.timeout(t)?;
    }
    easy.low_speed_limit(1)?;
    easy.low_speed_time(opts.stall_timeout)?;
    Ok(easy)
}

/// Map the final response code to an error unless it is 2xx.
fn check_status(easy: &mut curl::easy::Easy) -> Result<(), FetchError> {
    let code = easy.response_code()?;
    if !(200..300).contains(&code) {
        return Err(FetchError::Http(code));
    }
    Ok(())
}

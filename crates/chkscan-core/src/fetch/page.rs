//! Buffered GET for small documents.

use super::{check_status, new_easy, HttpOptions};
use crate::retry::FetchError;

/// GETs `url` and returns the body decoded as UTF-8 (lossy).
pub fn fetch_page(url: &str, opts: &HttpOptions) -> Result<String, FetchError> {
    let mut body: Vec<u8> = Vec::new();
    let mut easy = new_easy(url, opts)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }
    check_status(&mut easy)?;
    Ok(String::from_utf8_lossy(&body).into_owned())
}

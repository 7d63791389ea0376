//! Streamed GET straight to a file.

use super::{check_status, new_easy, HttpOptions};
use crate::retry::FetchError;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// GETs `url` into `dest` (created or truncated), chunk by chunk as curl hands
/// them over; memory use does not depend on the archive size.
/// Returns the number of bytes written. On error `dest` may hold a partial body;
/// the caller decides whether to remove it.
pub fn stream_to_file(url: &str, dest: &Path, opts: &HttpOptions) -> Result<u64, FetchError> {
    let mut out = BufWriter::new(File::create(dest)?);
    let mut written: u64 = 0;
    let mut write_err: Option<std::io::Error> = None;

    let mut easy = new_easy(url, opts)?;
    let performed = {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| match out.write_all(data) {
            Ok(()) => {
                written += data.len() as u64;
                Ok(data.len())
            }
            Err(e) => {
                write_err = Some(e);
                Ok(0) // abort transfer
            }
        })?;
        transfer.perform()
    };

    if let Some(e) = write_err {
        return Err(FetchError::Io(e));
    }
    performed?;
    check_status(&mut easy)?;
    out.flush()?;
    Ok(written)
}

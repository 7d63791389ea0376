//! Manifest inspection: list a 7z archive's entries and look for the marker.
//!
//! Only the archive header is read; entry contents are never decoded.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::report::Classification;
use crate::url_model::ARCHIVE_EXTENSION;

/// Chooses which marker path an archive must contain, by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerPolicy {
    default_marker: String,
    special_marker: String,
    special_suffix: String,
}

impl MarkerPolicy {
    pub fn new(default_marker: &str, special_marker: &str, special_suffix: &str) -> Self {
        Self {
            default_marker: default_marker.to_string(),
            special_marker: special_marker.to_string(),
            special_suffix: special_suffix.to_string(),
        }
    }

    /// True when `file_name` is exactly `<stem><special_suffix>.7z` (case-sensitive,
    /// including the extension).
    pub fn is_special(&self, file_name: &str) -> bool {
        file_name
            .strip_suffix(ARCHIVE_EXTENSION)
            .is_some_and(|stem| stem.ends_with(&self.special_suffix))
    }

    /// Marker path expected inside `file_name`.
    pub fn marker_for(&self, file_name: &str) -> &str {
        if self.is_special(file_name) {
            &self.special_marker
        } else {
            &self.default_marker
        }
    }
}

/// The archive could not be opened or its header could not be parsed.
#[derive(Debug, thiserror::Error)]
pub enum InspectError {
    #[error("open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read 7z header of {}: {message}", path.display())]
    Archive { path: PathBuf, message: String },
}

const SIGNATURE: [u8; 6] = [b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C];
const SIGNATURE_HEADER_LEN: u64 = 32;
const CRC32: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_ISO_HDLC);

/// A signature header whose start header checks out and announces a next
/// header of size 0. 7-Zip writes exactly this for an archive with no entries.
fn is_entryless_header(header: &[u8; SIGNATURE_HEADER_LEN as usize]) -> bool {
    if header[..6] != SIGNATURE || header[6] != 0 {
        return false;
    }
    let start_crc = u32::from_le_bytes([header[8], header[9], header[10], header[11]]);
    let mut size = [0u8; 8];
    size.copy_from_slice(&header[20..28]);
    u64::from_le_bytes(size) == 0 && CRC32.checksum(&header[12..]) == start_crc
}

/// Entry paths of the 7z archive at `path`, in header order.
pub fn list_entries(path: &Path) -> Result<Vec<String>, InspectError> {
    let mut file = File::open(path).map_err(|source| InspectError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let len = file
        .metadata()
        .map_err(|source| InspectError::Open {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    let io_err = |source: std::io::Error| InspectError::Open {
        path: path.to_path_buf(),
        source,
    };
    if len >= SIGNATURE_HEADER_LEN {
        let mut header = [0u8; SIGNATURE_HEADER_LEN as usize];
        file.read_exact(&mut header).map_err(io_err)?;
        if is_entryless_header(&header) {
            return Ok(Vec::new());
        }
        file.seek(SeekFrom::Start(0)).map_err(io_err)?;
    }
    let archive = sevenz_rust::Archive::read(&mut file, len, &[]).map_err(|e| {
        InspectError::Archive {
            path: path.to_path_buf(),
            message: e.to_string(),
        }
    })?;
    Ok(archive
        .files
        .iter()
        .map(|entry| entry.name().to_string())
        .collect())
}

/// `HasMarker` iff `expected` appears verbatim among `entries`. No separator or
/// trailing-slash normalization is applied.
pub fn classify_entries<S: AsRef<str>>(entries: &[S], expected: &str) -> Classification {
    if entries.iter().any(|e| e.as_ref() == expected) {
        Classification::HasMarker
    } else {
        Classification::MissingMarker
    }
}

/// Lists the archive at `path` and classifies it against the marker `policy`
/// picks for `file_name`. Only returns `HasMarker` or `MissingMarker`.
pub fn inspect(
    path: &Path,
    file_name: &str,
    policy: &MarkerPolicy,
) -> Result<Classification, InspectError> {
    let entries = list_entries(path)?;
    let expected = policy.marker_for(file_name);
    let verdict = classify_entries(&entries, expected);
    match verdict {
        Classification::HasMarker => tracing::info!("'{}' found in {}", expected, file_name),
        _ => tracing::warn!(
            "'{}' NOT found in {} ({} entries)",
            expected,
            file_name,
            entries.len()
        ),
    }
    Ok(verdict)
}

//! Per-archive verdicts and the end-of-run report.

use std::fmt::Write as _;

/// Timestamp format used in the printed summary.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Verdict for one archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    HasMarker,
    MissingMarker,
    /// Download failed; carries the error text.
    TransferFailed(String),
    /// Downloaded file could not be listed as a 7z archive.
    InspectionFailed(String),
}

/// An archive that could not be verified either way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArchive {
    pub file_name: String,
    pub reason: String,
}

/// Aggregate result of one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub timestamp: String,
    pub with_marker: Vec<String>,
    pub without_marker: Vec<String>,
    pub failed: Vec<FailedArchive>,
}

impl RunReport {
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            with_marker: Vec::new(),
            without_marker: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Report stamped with the current local time.
    pub fn now() -> Self {
        Self::new(chrono::Local::now().format(TIMESTAMP_FORMAT).to_string())
    }

    /// File `file_name` into the bucket matching `verdict`.
    pub fn record(&mut self, file_name: &str, verdict: Classification) {
        let name = file_name.to_string();
        match verdict {
            Classification::HasMarker => self.with_marker.push(name),
            Classification::MissingMarker => self.without_marker.push(name),
            Classification::TransferFailed(reason) => self.failed.push(FailedArchive {
                file_name: name,
                reason: format!("download failed: {}", reason),
            }),
            Classification::InspectionFailed(reason) => self.failed.push(FailedArchive {
                file_name: name,
                reason: format!("could not open archive: {}", reason),
            }),
        }
    }

    /// True when every processed archive carried its marker.
    pub fn all_verified(&self) -> bool {
        self.without_marker.is_empty() && self.failed.is_empty()
    }

    /// Human-readable summary, as printed at the end of a run.
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "--- FINAL SUMMARY ---");
        let _ = writeln!(out, "[{}] Files WITH 'chksum':", self.timestamp);
        push_names(&mut out, self.with_marker.iter().map(String::as_str));
        let _ = writeln!(out);
        let _ = writeln!(out, "[{}] Files WITHOUT 'chksum':", self.timestamp);
        push_names(&mut out, self.without_marker.iter().map(String::as_str));
        if !self.failed.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "[{}] Files that could NOT be verified:", self.timestamp);
            for f in &self.failed {
                let _ = writeln!(out, "   - {} ({})", f.file_name, f.reason);
            }
        }
        let _ = writeln!(out);
        let _ = write!(
            out,
            "Total WITH: {}; WITHOUT: {}",
            self.with_marker.len(),
            self.without_marker.len()
        );
        if !self.failed.is_empty() {
            let _ = write!(out, "; FAILED: {}", self.failed.len());
        }
        let _ = writeln!(out);
        out
    }
}

fn push_names<'a>(out: &mut String, names: impl Iterator<Item = &'a str>) {
    let mut any = false;
    for name in names {
        let _ = writeln!(out, "   - {}", name);
        any = true;
    }
    if !any {
        let _ = writeln!(out, "   - - None -");
    }
}

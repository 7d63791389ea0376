//! Run coordinator: discover → download → inspect each archive → clean up → decide.
//!
//! Everything runs sequentially on the calling thread. Per-archive failures are
//! recorded in the report and never abort the run; only an unusable scratch
//! directory is fatal.

use anyhow::Result;
use std::path::Path;

use crate::config::VerifyConfig;
use crate::discovery;
use crate::fetch::HttpOptions;
use crate::manifest::{self, MarkerPolicy};
use crate::notify::Notifier;
use crate::report::{Classification, RunReport};
use crate::retry::RetryPolicy;
use crate::scratch;
use crate::transfer;
use crate::url_model::ArchiveLink;

/// Every discovered archive carried its marker.
pub const EXIT_OK: i32 = 0;
/// An archive is missing its marker or could not be verified, or nothing was found.
pub const EXIT_VERIFY_FAILED: i32 = 1;
/// Bad invocation, missing configuration, or unusable scratch directory.
pub const EXIT_USAGE: i32 = 2;

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The listing had no archive links (or could not be fetched). No report, no mail.
    NothingToVerify,
    /// All archives verified.
    Verified(RunReport),
    /// At least one archive is missing its marker or could not be verified.
    Failed(RunReport),
}

impl RunOutcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Verified(_) => EXIT_OK,
            RunOutcome::Failed(_) | RunOutcome::NothingToVerify => EXIT_VERIFY_FAILED,
        }
    }

    pub fn report(&self) -> Option<&RunReport> {
        match self {
            RunOutcome::Verified(r) | RunOutcome::Failed(r) => Some(r),
            RunOutcome::NothingToVerify => None,
        }
    }
}

/// Verifies every archive linked from `base_url`.
///
/// `notifier` is called once with the report when verification fails; pass
/// `None` to skip mailing. A notifier error is logged and does not change the
/// outcome.
pub fn run(
    cfg: &VerifyConfig,
    base_url: &str,
    notifier: Option<&dyn Notifier>,
) -> Result<RunOutcome> {
    let scratch_dir = cfg.scratch_dir.as_path();
    scratch::ensure_dir(scratch_dir)?;
    scratch::purge_archives(scratch_dir)?;

    let retry = cfg.retry_policy();
    let links = discovery::discover_links(base_url, &cfg.discovery_http(), &retry);
    if links.is_empty() {
        tracing::info!("No .7z files found at the URL.");
        return Ok(RunOutcome::NothingToVerify);
    }

    let policy = cfg.marker_policy();
    let download_http = cfg.download_http();
    let verdicts: Vec<Classification> = links
        .iter()
        .map(|link| process_link(link, scratch_dir, &policy, &download_http, &retry))
        .collect();

    if let Err(e) = scratch::purge_archives(scratch_dir) {
        tracing::error!("final cleanup failed: {:#}", e);
    }

    // Stamped once every archive is processed and the scratch dir is clean.
    let mut report = RunReport::now();
    for (link, verdict) in links.iter().zip(verdicts) {
        report.record(link.file_name(), verdict);
    }

    println!();
    print!("{}", report.render_summary());
    println!();

    if report.all_verified() {
        tracing::info!("All .7z files contain 'chksum'.");
        return Ok(RunOutcome::Verified(report));
    }

    tracing::error!("One or more .7z files are missing 'chksum' or could not be verified.");
    match notifier {
        Some(n) => {
            if let Err(e) = n.notify(&report) {
                tracing::error!("Failed to send email: {}", e);
            }
        }
        None => tracing::info!("notifications disabled; not sending email"),
    }
    Ok(RunOutcome::Failed(report))
}

/// Download then inspect one archive. Never fails; errors become verdicts.
fn process_link(
    link: &ArchiveLink,
    scratch_dir: &Path,
    policy: &MarkerPolicy,
    http: &HttpOptions,
    retry: &RetryPolicy,
) -> Classification {
    let dest = scratch::scratch_path(scratch_dir, link);
    tracing::info!("Downloading: {} -> {}", link.url(), dest.display());

    if let Err(e) = transfer::download_archive(link, &dest, http, retry) {
        tracing::error!("Failed to download {}: {}", link.url(), e);
        return Classification::TransferFailed(e.to_string());
    }

    match manifest::inspect(&dest, link.file_name(), policy) {
        Ok(verdict) => verdict,
        Err(e) => {
            tracing::error!("Could not open {}: {}", link.file_name(), e);
            Classification::InspectionFailed(e.to_string())
        }
    }
}

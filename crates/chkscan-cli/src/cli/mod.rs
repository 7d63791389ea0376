//! CLI for chkscan: resolve configuration, run the pipeline, map the outcome to an exit code.

use anyhow::Result;
use chkscan_core::config::{self, VerifyConfig};
use chkscan_core::notify::{Notifier, SmtpNotifier};
use chkscan_core::pipeline::{self, EXIT_USAGE};
use chkscan_core::url_model::normalize_base_url;
use clap::Parser;
use std::path::PathBuf;

/// Verify that every .7z archive in a directory listing contains its chksum marker.
#[derive(Debug, Parser)]
#[command(name = "chkscan", version)]
#[command(
    about = "Verify release archives in a directory listing contain their chksum marker",
    long_about = None
)]
pub struct Cli {
    /// Directory listing URL to scan. Falls back to $BASE_URL, then `base_url` in config.
    pub base_url: Option<String>,

    /// Config file (TOML). Defaults to $XDG_CONFIG_HOME/chkscan/config.toml when present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Scratch directory for downloads (overrides $DOWNLOAD_FOLDER).
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Do not send the failure email; SMTP settings are then not required.
    #[arg(long)]
    pub no_notify: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Runs one verification and returns the process exit code.
    pub fn run(self) -> Result<i32> {
        let mut cfg = config::load(self.config.as_deref())?;
        tracing::debug!("loaded config: {:?}", cfg);

        let notifier: Option<SmtpNotifier> = if self.no_notify {
            None
        } else {
            match cfg.smtp.resolve() {
                Ok(smtp) => Some(SmtpNotifier::new(smtp)),
                Err(e) => {
                    tracing::error!("{}", e);
                    return Ok(EXIT_USAGE);
                }
            }
        };

        if let Some(dir) = self.scratch_dir {
            cfg.scratch_dir = dir;
        }

        let Some(base_url) = resolve_base_url(self.base_url, &cfg) else {
            println!("Usage: chkscan <BASE_URL>  OR set BASE_URL env var");
            return Ok(EXIT_USAGE);
        };

        let outcome = pipeline::run(
            &cfg,
            &base_url,
            notifier.as_ref().map(|n| n as &dyn Notifier),
        )?;
        Ok(outcome.exit_code())
    }
}

/// Positional argument wins over env/config; blank values count as absent.
fn resolve_base_url(arg: Option<String>, cfg: &VerifyConfig) -> Option<String> {
    arg.filter(|s| !s.trim().is_empty())
        .or_else(|| cfg.base_url.clone().filter(|s| !s.trim().is_empty()))
        .map(|s| normalize_base_url(&s))
}

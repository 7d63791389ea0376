use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::fetch::HttpOptions;
use crate::manifest::MarkerPolicy;
use crate::retry::RetryPolicy;

/// Scratch directory used when neither the config file nor `DOWNLOAD_FOLDER` names one.
pub const DEFAULT_SCRATCH_DIR: &str = "downloaded_files";

/// Names of the SMTP environment variables, in the order they are reported when missing.
pub const SMTP_ENV_VARS: [&str; 5] = [
    "SMTP_SERVER",
    "SMTP_PORT",
    "SMTP_USERNAME",
    "SMTP_PASSWORD",
    "RECEIVER_EMAIL",
];

/// Marker paths and the file-name suffix that selects the special one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Marker expected in ordinary archives.
    pub default_marker: String,
    /// Marker expected in archives whose name ends with `special_suffix` + `.7z`.
    pub special_marker: String,
    /// Case-sensitive stem suffix, e.g. `-12_HIGH` for `A-12_HIGH.7z`.
    pub special_suffix: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            default_marker: "DeepScreen/GmXmlDeepScreen/chksum".to_string(),
            special_marker: "QNX/chksum".to_string(),
            special_suffix: "-12_HIGH".to_string(),
        }
    }
}

/// Retry policy parameters (optional section in config.toml).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts per request (including the first). 1 disables retries.
    pub max_attempts: u32,
    /// Base delay in milliseconds for exponential backoff.
    pub base_delay_ms: u64,
    /// Maximum backoff delay in milliseconds.
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
            max_delay_ms: 10_000,
        }
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        RetryPolicy {
            max_attempts: cfg.max_attempts.max(1),
            base_delay: Duration::from_millis(cfg.base_delay_ms),
            max_delay: Duration::from_millis(cfg.max_delay_ms),
        }
    }
}

/// Network timeouts for the listing fetch and archive downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Connect timeout for every request.
    pub connect_secs: u64,
    /// Total time allowed for fetching the listing page.
    pub discovery_secs: u64,
    /// A download is aborted when no bytes arrive for this long.
    pub download_stall_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 30,
            discovery_secs: 30,
            download_stall_secs: 60,
        }
    }
}

/// SMTP settings as read from file/env; every field may still be missing.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    pub server: Option<String>,
    pub port: Option<u16>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub receiver: Option<String>,
    /// `From` address; the login is used when unset.
    pub sender: Option<String>,
}

impl fmt::Debug for SmtpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpSettings")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("receiver", &self.receiver)
            .field("sender", &self.sender)
            .finish()
    }
}

/// Fully resolved notification target.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub server: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub receiver: String,
    pub sender: String,
}

impl fmt::Debug for SmtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpConfig")
            .field("server", &self.server)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("receiver", &self.receiver)
            .field("sender", &self.sender)
            .finish_non_exhaustive()
    }
}

/// Required configuration that is absent after file and env layering.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variables: {}", .0.join(", "))]
    Missing(Vec<&'static str>),
    #[error("{name} must be a port number, got {value:?}")]
    InvalidPort { name: &'static str, value: String },
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl SmtpSettings {
    /// Resolve into an `SmtpConfig`, listing every missing variable at once.
    pub fn resolve(&self) -> Result<SmtpConfig, ConfigError> {
        let fields = [
            self.server.is_some(),
            self.port.is_some(),
            self.username.is_some(),
            self.password.is_some(),
            self.receiver.is_some(),
        ];
        let missing: Vec<&'static str> = SMTP_ENV_VARS
            .iter()
            .zip(fields)
            .filter(|(_, present)| !present)
            .map(|(name, _)| *name)
            .collect();
        match (
            &self.server,
            self.port,
            &self.username,
            &self.password,
            &self.receiver,
        ) {
            (Some(server), Some(port), Some(username), Some(password), Some(receiver)) => {
                Ok(SmtpConfig {
                    server: server.clone(),
                    port,
                    username: username.clone(),
                    password: password.clone(),
                    receiver: receiver.clone(),
                    sender: self.sender.clone().unwrap_or_else(|| username.clone()),
                })
            }
            _ => Err(ConfigError::Missing(missing)),
        }
    }
}

/// Configuration for one verification run: optional `config.toml`, then env overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// Directory listing to scan; the CLI argument takes precedence.
    pub base_url: Option<String>,
    /// Where archives are downloaded for inspection. Purged at start and end of a run.
    pub scratch_dir: PathBuf,
    pub markers: MarkerConfig,
    pub smtp: SmtpSettings,
    pub retry: RetryConfig,
    pub timeouts: TimeoutConfig,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            scratch_dir: PathBuf::from(DEFAULT_SCRATCH_DIR),
            markers: MarkerConfig::default(),
            smtp: SmtpSettings::default(),
            retry: RetryConfig::default(),
            timeouts: TimeoutConfig::default(),
        }
    }
}

impl VerifyConfig {
    /// Apply environment overrides. `lookup` is `std::env::var` in production;
    /// empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = get("DOWNLOAD_FOLDER") {
            self.scratch_dir = PathBuf::from(v);
        }
        if let Some(v) = get("DEFAULT_CHKSUM_PATH") {
            self.markers.default_marker = v;
        }
        if let Some(v) = get("SPECIAL_CHKSUM_PATH") {
            self.markers.special_marker = v;
        }
        if let Some(v) = get("SPECIAL_SUFFIX") {
            self.markers.special_suffix = v;
        }
        if let Some(v) = get("SMTP_SERVER") {
            self.smtp.server = Some(v);
        }
        if let Some(v) = get("SMTP_PORT") {
            let port = v.trim().parse::<u16>().map_err(|_| ConfigError::InvalidPort {
                name: "SMTP_PORT",
                value: v.clone(),
            })?;
            self.smtp.port = Some(port);
        }
        if let Some(v) = get("SMTP_USERNAME") {
            self.smtp.username = Some(v);
        }
        if let Some(v) = get("SMTP_PASSWORD") {
            self.smtp.password = Some(v);
        }
        if let Some(v) = get("RECEIVER_EMAIL") {
            self.smtp.receiver = Some(v);
        }
        if let Some(v) = get("SMTP_FROM") {
            self.smtp.sender = Some(v);
        }
        if let Some(v) = get("RETRY_MAX_ATTEMPTS") {
            self.retry.max_attempts = match v.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidNumber {
                        name: "RETRY_MAX_ATTEMPTS",
                        value: v,
                    })
                }
            };
        }
        Ok(())
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.markers.default_marker.is_empty() {
            return Err(ConfigError::Empty("DEFAULT_CHKSUM_PATH"));
        }
        if self.markers.special_marker.is_empty() {
            return Err(ConfigError::Empty("SPECIAL_CHKSUM_PATH"));
        }
        if self.markers.special_suffix.is_empty() {
            return Err(ConfigError::Empty("SPECIAL_SUFFIX"));
        }
        Ok(())
    }

    pub fn marker_policy(&self) -> MarkerPolicy {
        MarkerPolicy::new(
            &self.markers.default_marker,
            &self.markers.special_marker,
            &self.markers.special_suffix,
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from(&self.retry)
    }

    /// Options for the listing page fetch (bounded total time).
    pub fn discovery_http(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.timeouts.connect_secs),
            total_timeout: Some(Duration::from_secs(self.timeouts.discovery_secs)),
            stall_timeout: Duration::from_secs(self.timeouts.discovery_secs),
        }
    }

    /// Options for archive downloads: no total cap, but stalled reads are aborted.
    pub fn download_http(&self) -> HttpOptions {
        HttpOptions {
            connect_timeout: Duration::from_secs(self.timeouts.connect_secs),
            total_timeout: None,
            stall_timeout: Duration::from_secs(self.timeouts.download_stall_secs),
        }
    }
}

/// Finds `chkscan/config.toml` under the XDG config dirs. The file is never created
/// for the user because it may end up holding SMTP credentials.
pub fn find_config_file() -> Option<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("chkscan").ok()?;
    xdg_dirs.find_config_file("config.toml")
}

/// Parse a config file.
pub fn load_from_path(path: &Path) -> Result<VerifyConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: VerifyConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

/// Load configuration: `explicit` file if given (must exist), else the XDG file if
/// present, else defaults; then process environment overrides.
pub fn load(explicit: Option<&Path>) -> Result<VerifyConfig> {
    let mut cfg = match explicit {
        Some(path) => load_from_path(path)?,
        None => match find_config_file() {
            Some(path) => {
                tracing::debug!("loading config from {}", path.display());
                load_from_path(&path)?
            }
            None => VerifyConfig::default(),
        },
    };
    cfg.apply_env(|name| std::env::var(name).ok())?;
    cfg.validate()?;
    Ok(cfg)
}

//! Project configuration file support for pagewatch.
//!
//! Loads configuration from `pagewatch.toml` in the serving directory.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use pagewatch_core::{DocumentPaths, MonitorConfig};

/// Project-level configuration loaded from `pagewatch.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Address to bind the HTTP server to
    pub host: Option<String>,
    /// Port to bind the HTTP server to
    pub port: Option<u16>,
    /// Time between two reads of the active document (e.g. "20s")
    #[serde(default, with = "humantime_serde")]
    pub poll_interval: Option<Duration>,
    /// Length of one unit of session duration (e.g. "1m")
    #[serde(default, with = "humantime_serde")]
    pub duration_unit: Option<Duration>,
    /// Session duration used when a start request omits it
    pub default_duration: Option<f64>,
    /// Where the event log is mirrored
    pub snapshot: Option<PathBuf>,
    /// Directory for process log files
    pub log_dir: Option<PathBuf>,
    /// Open the served page in a browser at startup
    pub open_browser: Option<bool>,
    /// Backing files of the monitored documents
    pub documents: Option<DocumentPaths>,
}

/// The config file name
pub const CONFIG_FILE_NAME: &str = "pagewatch.toml";

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_LOG_DIR: &str = "logs";

impl ProjectConfig {
    /// Load configuration from the serving directory.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if file exists and parses successfully
    /// - `Ok(None)` if file does not exist
    /// - `Err(...)` if file exists but fails to parse (hard error)
    pub fn load(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        Ok(Some(config))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Monitor settings with file values applied over the defaults.
    ///
    /// A relative snapshot path is resolved against `dir`.
    pub fn monitor_config(&self, dir: &Path) -> MonitorConfig {
        let defaults = MonitorConfig::default();

        let snapshot = self
            .snapshot
            .clone()
            .or(defaults.snapshot_path.clone())
            .map(|p| if p.is_absolute() { p } else { dir.join(p) });

        MonitorConfig::default()
            .with_poll_interval(self.poll_interval.unwrap_or(defaults.poll_interval))
            .with_duration_unit(self.duration_unit.unwrap_or(defaults.duration_unit))
            .with_default_duration(self.default_duration.unwrap_or(defaults.default_duration))
            .with_snapshot_path(snapshot)
            .with_documents(self.documents.clone().unwrap_or_default())
    }

    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_HOST)
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.log_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DIR))
    }

    pub fn open_browser(&self) -> bool {
        self.open_browser.unwrap_or(true)
    }
}

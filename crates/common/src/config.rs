//! Application configuration.
//!
//! Read once at startup; nothing mutates it afterwards. Changing a value
//! means restarting the daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DeskreelError, DeskreelResult};

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Root of the date-partitioned capture tree.
    pub storage_root: PathBuf,

    /// Capture loop settings.
    pub capture: CaptureSettings,

    /// Storage retry settings.
    pub storage: StorageSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Capture loop parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// Seconds between scheduled ticks.
    pub interval_secs: u64,

    /// Largest per-channel difference still treated as "unchanged".
    pub change_threshold: u8,

    /// Retain every frame, bypassing change detection.
    pub save_all_captures: bool,

    /// Upper bound for one lock-state query. Defaults to the interval.
    pub lock_probe_timeout_ms: Option<u64>,
}

/// Retry behavior for frame and log writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Attempts per write, including the first one.
    pub max_attempts: u32,

    /// Delay before the first retry; doubled for each further retry.
    pub initial_backoff_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "deskreel=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_root: default_storage_root(),
            capture: CaptureSettings::default(),
            storage: StorageSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            change_threshold: 10,
            save_all_captures: false,
            lock_probe_timeout_ms: None,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 250,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl CaptureSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn lock_probe_timeout(&self) -> Duration {
        self.lock_probe_timeout_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| self.interval())
    }
}

impl StorageSettings {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    ///
    /// Runs before logging is set up, so a file that exists but cannot be
    /// used comes back as a warning for the caller to report.
    pub fn load() -> (Self, Option<String>) {
        Self::load_or_default(&config_file_path())
    }

    /// Like [`AppConfig::load`], for a file at `path`. A missing file is
    /// not a problem; an unreadable or malformed one is.
    pub fn load_or_default(path: &Path) -> (Self, Option<String>) {
        if !path.exists() {
            return (Self::default(), None);
        }
        match Self::load_from(path) {
            Ok(config) => (config, None),
            Err(e) => (Self::default(), Some(format!("{e}; using defaults"))),
        }
    }

    /// Load config from an explicit path. Unlike [`AppConfig::load`], any
    /// failure is reported to the caller.
    pub fn load_from(path: &Path) -> DeskreelResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DeskreelError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            DeskreelError::config(format!("cannot parse {}: {e}", path.display()))
        })
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }

    /// Reject values the capture loop cannot run with.
    pub fn validate(&self) -> DeskreelResult<()> {
        if self.capture.interval_secs == 0 {
            return Err(DeskreelError::config("capture interval must be positive"));
        }
        if self.capture.lock_probe_timeout_ms == Some(0) {
            return Err(DeskreelError::config(
                "capture.lock_probe_timeout_ms must be positive",
            ));
        }
        if self.storage.max_attempts == 0 {
            return Err(DeskreelError::config(
                "storage.max_attempts must be at least 1",
            ));
        }
        if self.storage_root.as_os_str().is_empty() {
            return Err(DeskreelError::config("storage_root must not be empty"));
        }
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("deskreel").join("config.json")
}

/// Default capture root.
fn default_storage_root() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("deskreel").join("captures")
}

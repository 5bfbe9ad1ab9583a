// SPDX-License-Identifier: GPL-3.0-only

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use storage_sys::DEFAULT_MOUNT_TABLE;
use storage_types::RoleParameters;

use crate::error::ConfigFileError;

const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_LOG_RETENTION_DAYS: u64 = 7;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LoggingLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LoggingLevel {
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Run settings of the verifier itself, independent of the role variables.
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
#[serde(default)]
pub struct VerifierConfig {
    /// Per-probe timeout in seconds; 0 disables it
    pub probe_timeout_secs: u64,
    pub mount_table: PathBuf,
    pub output: OutputFormat,
    pub log_level: LoggingLevel,
    /// Also write logs to daily files in this directory
    pub log_dir: Option<PathBuf>,
    /// Daily log files older than this are removed at startup; 0 keeps all
    pub log_retention_days: u64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            probe_timeout_secs: DEFAULT_PROBE_TIMEOUT_SECS,
            mount_table: PathBuf::from(DEFAULT_MOUNT_TABLE),
            output: OutputFormat::default(),
            log_level: LoggingLevel::default(),
            log_dir: None,
            log_retention_days: DEFAULT_LOG_RETENTION_DAYS,
        }
    }
}

impl VerifierConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        let raw = read(path)?;
        toml::from_str(&raw).map_err(|source| ConfigFileError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn probe_timeout(&self) -> Option<Duration> {
        (self.probe_timeout_secs > 0).then(|| Duration::from_secs(self.probe_timeout_secs))
    }

    pub fn log_retention(&self) -> Option<Duration> {
        (self.log_retention_days > 0)
            .then(|| Duration::from_secs(self.log_retention_days * 24 * 60 * 60))
    }
}

fn read(path: &Path) -> Result<String, ConfigFileError> {
    fs::read_to_string(path).map_err(|source| ConfigFileError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Load role variables from a `.json` file, or TOML for any other extension.
pub fn load_role_parameters(path: &Path) -> Result<RoleParameters, ConfigFileError> {
    let raw = read(path)?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json {
        serde_json::from_str(&raw).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    } else {
        toml::from_str(&raw).map_err(|source| ConfigFileError::Toml {
            path: path.to_path_buf(),
            source,
        })
    }
}

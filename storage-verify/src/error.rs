// SPDX-License-Identifier: GPL-3.0-only

use std::path::PathBuf;

use storage_sys::{InquiryError, ParseError};
use thiserror::Error;

/// Expected configurations the verifier refuses to check
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("device_name '{0}' is not allowed for device_type 'disk'")]
    DiskWithDeviceName(String),

    #[error("lvm_vg '{0}' is not allowed for device_type 'disk'")]
    DiskWithVolumeGroup(String),

    #[error("device_type 'disk' accepts exactly one disk, got {0}")]
    MultipleDisks(usize),

    #[error("disks must not be empty")]
    NoDisks,

    #[error("mount_point must not be empty")]
    MissingMountPoint,

    #[error("device_name is required for device_type 'lvm'")]
    MissingDeviceName,

    #[error("lvm_vg is required for device_type 'lvm'")]
    MissingVolumeGroup,

    #[error("unsupported size: {0}")]
    UnsupportedSize(String),
}

/// A single failed check inside a rule. Its `Display` is the diagnostic
/// recorded in the report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    #[error("{subject}: {source}")]
    Inquiry {
        subject: String,
        #[source]
        source: InquiryError,
    },

    #[error("{subject}: {source}")]
    Malformed {
        subject: String,
        #[source]
        source: ParseError,
    },

    #[error("{subject} mismatch: expected '{expected}', observed '{actual}'")]
    ComparisonMismatch {
        subject: String,
        expected: String,
        actual: String,
    },

    #[error("{subject}: no entry found for '{identity}'")]
    Missing { subject: String, identity: String },

    #[error("{subject}: '{identity}' is still present ({detail})")]
    StillPresent {
        subject: String,
        identity: String,
        detail: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

impl CheckFailure {
    pub fn inquiry(subject: impl Into<String>, source: InquiryError) -> Self {
        Self::Inquiry {
            subject: subject.into(),
            source,
        }
    }

    pub fn malformed(subject: impl Into<String>, source: ParseError) -> Self {
        Self::Malformed {
            subject: subject.into(),
            source,
        }
    }

    pub fn mismatch(
        subject: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::ComparisonMismatch {
            subject: subject.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    pub fn missing(subject: impl Into<String>, identity: impl Into<String>) -> Self {
        Self::Missing {
            subject: subject.into(),
            identity: identity.into(),
        }
    }
}

/// Errors loading the verifier's own configuration or the role variables file
#[derive(Error, Debug)]
pub enum ConfigFileError {
    #[error("failed to read {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

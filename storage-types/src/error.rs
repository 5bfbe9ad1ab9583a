// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Errors converting flat role variables into an expected configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("unknown device_type '{0}' (expected 'disk' or 'lvm')")]
    UnknownDeviceType(String),

    #[error("unknown state '{0}' (expected 'present' or 'absent')")]
    UnknownState(String),
}

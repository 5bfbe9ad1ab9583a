// SPDX-License-Identifier: GPL-3.0-only

use storage_sys::SystemInquiry;
use storage_types::{DeviceType, ExpectedConfiguration, RuleOutcome, SizeSpec};

use super::{outcome, VerificationRule};
use crate::error::{CheckFailure, ConfigurationError};

/// Pre-check run before any probing. A failure aborts the run.
pub struct ConfigurationValidityRule;

/// Every reason `expected` cannot be verified, in a stable order.
pub fn validate(expected: &ExpectedConfiguration) -> Vec<ConfigurationError> {
    let mut errors = Vec::new();

    if expected.disks().is_empty() {
        errors.push(ConfigurationError::NoDisks);
    }
    if expected.mount_point().trim().is_empty() {
        errors.push(ConfigurationError::MissingMountPoint);
    }

    match expected.device_type() {
        DeviceType::Disk => {
            if let Some(name) = expected.device_name() {
                errors.push(ConfigurationError::DiskWithDeviceName(name.to_string()));
            }
            if let Some(vg) = expected.volume_group() {
                errors.push(ConfigurationError::DiskWithVolumeGroup(vg.to_string()));
            }
            if expected.disks().len() > 1 {
                errors.push(ConfigurationError::MultipleDisks(expected.disks().len()));
            }
        }
        DeviceType::Lvm => {
            if expected.device_name().is_none() {
                errors.push(ConfigurationError::MissingDeviceName);
            }
            if expected.volume_group().is_none() {
                errors.push(ConfigurationError::MissingVolumeGroup);
            }
        }
    }

    if let SizeSpec::Unsupported { reason } = expected.size_spec() {
        errors.push(ConfigurationError::UnsupportedSize(reason.clone()));
    }

    errors
}

impl VerificationRule for ConfigurationValidityRule {
    fn name(&self) -> &'static str {
        "configuration_validity"
    }

    fn check(&self, expected: &ExpectedConfiguration, _inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let failures = validate(expected)
            .into_iter()
            .map(CheckFailure::from)
            .collect();
        outcome(self.name(), failures)
    }
}

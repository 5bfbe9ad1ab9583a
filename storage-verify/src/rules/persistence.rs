// SPDX-License-Identifier: GPL-3.0-only

use storage_sys::{fstab, SystemInquiry};
use storage_types::{ExpectedConfiguration, MountTableEntry, RuleOutcome};

use super::{normalize_mount_point, outcome, VerificationRule};
use crate::error::CheckFailure;

/// The device has a well-formed mount table entry with the expected
/// filesystem and mount point.
pub struct FilesystemPersistenceRule;

const SUBJECT: &str = "mount table";

pub fn evaluate(expected: &ExpectedConfiguration, entry: &MountTableEntry) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    if entry.filesystem_type != expected.filesystem_type() {
        failures.push(CheckFailure::mismatch(
            format!("mount table filesystem type of {}", entry.device_path),
            expected.filesystem_type(),
            &entry.filesystem_type,
        ));
    }

    if normalize_mount_point(&entry.mount_point) != normalize_mount_point(expected.mount_point()) {
        failures.push(CheckFailure::mismatch(
            format!("mount table mount point of {}", entry.device_path),
            expected.mount_point(),
            &entry.mount_point,
        ));
    }

    failures
}

fn probe(
    expected: &ExpectedConfiguration,
    inquiry: &dyn SystemInquiry,
) -> Result<MountTableEntry, CheckFailure> {
    let Some(device_path) = expected.persisted_device_path() else {
        return Err(CheckFailure::missing(SUBJECT, "<unresolved device>"));
    };

    let table = inquiry
        .read_mount_table()
        .map_err(|error| CheckFailure::inquiry(SUBJECT, error))?;

    fstab::find_entry(&table, &device_path)
        .map_err(|error| CheckFailure::malformed(SUBJECT, error))?
        .ok_or_else(|| CheckFailure::missing(SUBJECT, device_path))
}

impl VerificationRule for FilesystemPersistenceRule {
    fn name(&self) -> &'static str {
        "filesystem_persistence"
    }

    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let failures = match probe(expected, inquiry) {
            Ok(entry) => evaluate(expected, &entry),
            Err(failure) => vec![failure],
        };
        outcome(self.name(), failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(filesystem_type: &str) -> MountTableEntry {
        MountTableEntry {
            device_path: "/dev/mapper/foo-test1".to_string(),
            mount_point: "/opt/test1".to_string(),
            filesystem_type: filesystem_type.to_string(),
            options: "defaults".to_string(),
            dump: "0".to_string(),
            pass: "0".to_string(),
        }
    }

    fn expected() -> ExpectedConfiguration {
        ExpectedConfiguration::builder(["sdb"], "/opt/test1/")
            .device_name("test1")
            .volume_group("foo")
            .build()
    }

    #[test]
    fn matching_entry_passes() {
        assert!(evaluate(&expected(), &entry("xfs")).is_empty());
    }

    #[test]
    fn filesystem_mismatch_fails() {
        let failures = evaluate(&expected(), &entry("ext4"));
        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains("expected 'xfs', observed 'ext4'"));
    }
}

// SPDX-License-Identifier: GPL-3.0-only

use storage_sys::{lsblk, SystemInquiry};
use storage_types::{DeviceRecord, ExpectedConfiguration, RuleOutcome};
use tracing::debug;

use super::{normalize_mount_point, outcome, VerificationRule};
use crate::error::CheckFailure;

/// The device is listed with the expected filesystem and mount point.
pub struct MountRule;

const SUBJECT: &str = "block device";

/// Compare a block device record against the declared filesystem and mount point.
pub fn evaluate(expected: &ExpectedConfiguration, record: &DeviceRecord) -> Vec<CheckFailure> {
    let mut failures = Vec::new();

    if record.filesystem_type != expected.filesystem_type() {
        failures.push(CheckFailure::mismatch(
            format!("filesystem type of {}", record.name),
            expected.filesystem_type(),
            &record.filesystem_type,
        ));
    }

    if normalize_mount_point(&record.mount_point) != normalize_mount_point(expected.mount_point())
    {
        failures.push(CheckFailure::mismatch(
            format!("mount point of {}", record.name),
            expected.mount_point(),
            &record.mount_point,
        ));
    }

    failures
}

/// Search the listing of each backing disk. A logical volume is drawn as a
/// child of the disks its volume group spans.
fn probe(
    expected: &ExpectedConfiguration,
    inquiry: &dyn SystemInquiry,
) -> Result<DeviceRecord, CheckFailure> {
    let Some(identity) = expected.device_identity() else {
        return Err(CheckFailure::missing(SUBJECT, "<unresolved device>"));
    };

    for disk in expected.disks() {
        let target = ExpectedConfiguration::disk_path(disk);
        let listing = inquiry
            .list_block_devices(&target)
            .map_err(|error| CheckFailure::inquiry(SUBJECT, error))?;

        debug!(%identity, %target, "looking up block device record");
        let record = lsblk::find_device_record(&listing, &identity)
            .map_err(|error| CheckFailure::malformed(SUBJECT, error))?;
        if let Some(record) = record {
            return Ok(record);
        }
    }

    Err(CheckFailure::missing(SUBJECT, identity))
}

impl VerificationRule for MountRule {
    fn name(&self) -> &'static str {
        "mount"
    }

    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let failures = match probe(expected, inquiry) {
            Ok(record) => evaluate(expected, &record),
            Err(failure) => vec![failure],
        };
        outcome(self.name(), failures)
    }
}

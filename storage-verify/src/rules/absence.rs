// SPDX-License-Identifier: GPL-3.0-only

//! Rules for `state: absent`
//!
//! Disks and logical volumes disappear differently. A physical disk is never
//! removed, only unmounted and wiped, so it must still be listed but without
//! a filesystem or mount point. A logical volume is deleted outright and must
//! no longer appear in its volume group's listing.

use storage_sys::{fstab, lsblk, lvm_tools, InquiryError, SystemInquiry};
use storage_types::{DeviceType, ExpectedConfiguration, RuleOutcome};
use tracing::debug;

use super::{outcome, VerificationRule};
use crate::error::{CheckFailure, ConfigurationError};

/// No mount table line references the device.
pub struct FstabAbsenceRule;

/// The device is unmounted (disk) or removed (logical volume).
pub struct MountAbsenceRule;

/// Every mount table line that still references `device_path`.
pub fn evaluate_fstab(table: &str, device_path: &str) -> Vec<CheckFailure> {
    fstab::referencing_lines(table, device_path)
        .into_iter()
        .map(|line| CheckFailure::StillPresent {
            subject: "mount table".to_string(),
            identity: device_path.to_string(),
            detail: line.to_string(),
        })
        .collect()
}

/// The disk must be listed, and neither it nor anything below it may report
/// a filesystem or mount point.
pub fn evaluate_disk_listing(listing: &str, disk_path: &str) -> Vec<CheckFailure> {
    let rows = match lsblk::parse_rows(listing) {
        Ok(rows) => rows,
        Err(error) => return vec![CheckFailure::malformed("block device", error)],
    };
    if !rows.iter().any(|row| row.matches(disk_path)) {
        return vec![CheckFailure::missing("block device", disk_path)];
    }

    rows.iter()
        .filter(|row| !row.is_bare())
        .map(|row| CheckFailure::StillPresent {
            subject: "block device".to_string(),
            identity: disk_path.to_string(),
            detail: format!(
                "{} reports filesystem/mount point {}",
                row.name(),
                row.attributes().join(" ").trim()
            ),
        })
        .collect()
}

/// The logical volume must not be listed. An empty listing passes.
pub fn evaluate_lv_listing(
    listing: Result<String, InquiryError>,
    vg: &str,
    lv_name: &str,
) -> Option<CheckFailure> {
    let subject = format!("logical volumes of {vg}");
    let listing = match listing {
        Ok(listing) => listing,
        Err(InquiryError::EmptyResult { .. }) => {
            debug!(vg, "no logical volumes remain");
            return None;
        }
        Err(error) => return Some(CheckFailure::inquiry(subject, error)),
    };

    match lvm_tools::find_logical_volume(&listing, lv_name) {
        Ok(None) => None,
        Ok(Some(lv)) => Some(CheckFailure::StillPresent {
            subject,
            identity: lv_name.to_string(),
            detail: format!("listed as {} with size {}", lv.name, lv.size),
        }),
        Err(error) => Some(CheckFailure::malformed(subject, error)),
    }
}

impl VerificationRule for FstabAbsenceRule {
    fn name(&self) -> &'static str {
        "fstab_absence"
    }

    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let Some(device_path) = expected.persisted_device_path() else {
            return outcome(
                self.name(),
                vec![CheckFailure::missing("mount table", "<unresolved device>")],
            );
        };

        let failures = match inquiry.read_mount_table() {
            Ok(table) => evaluate_fstab(&table, &device_path),
            // An empty table references nothing.
            Err(InquiryError::EmptyResult { .. }) => Vec::new(),
            Err(error) => vec![CheckFailure::inquiry("mount table", error)],
        };
        outcome(self.name(), failures)
    }
}

impl VerificationRule for MountAbsenceRule {
    fn name(&self) -> &'static str {
        "mount_absence"
    }

    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let failures = match expected.device_type() {
            DeviceType::Disk => match expected.first_disk().map(ExpectedConfiguration::disk_path) {
                Some(disk_path) => match inquiry.list_block_devices(&disk_path) {
                    Ok(listing) => evaluate_disk_listing(&listing, &disk_path),
                    Err(error) => vec![CheckFailure::inquiry("block device", error)],
                },
                None => vec![CheckFailure::Configuration(ConfigurationError::NoDisks)],
            },
            DeviceType::Lvm => match (expected.volume_group(), expected.device_name()) {
                (Some(vg), Some(lv_name)) => {
                    evaluate_lv_listing(inquiry.list_logical_volumes(vg), vg, lv_name)
                        .into_iter()
                        .collect()
                }
                _ => vec![CheckFailure::Configuration(
                    ConfigurationError::MissingVolumeGroup,
                )],
            },
        };
        outcome(self.name(), failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fstab_without_device_passes() {
        let table = "UUID=1234 / xfs defaults 0 0\n/dev/sdc /data ext4 defaults 0 2\n";
        assert!(evaluate_fstab(table, "/dev/mapper/foo-test1").is_empty());
    }

    #[test]
    fn fstab_reference_fails() {
        let table = "/dev/mapper/foo-test1 /opt/test1 xfs defaults 0 0\n";
        let failures = evaluate_fstab(table, "/dev/mapper/foo-test1");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains("/opt/test1"));
    }

    const HEADER: &str = "NAME        FSTYPE MOUNTPOINT\n";

    #[test]
    fn wiped_disk_passes() {
        let listing = format!("{HEADER}/dev/sdb\n");
        assert!(evaluate_disk_listing(&listing, "/dev/sdb").is_empty());
    }

    #[test]
    fn mounted_disk_fails() {
        let listing = format!("{HEADER}/dev/sdb    xfs    /mnt/data\n");
        let failures = evaluate_disk_listing(&listing, "/dev/sdb");
        assert_eq!(failures.len(), 1);
        assert!(failures[0].to_string().contains("xfs /mnt/data"));
    }

    #[test]
    fn formatted_partition_of_wiped_disk_fails() {
        let listing = format!("{HEADER}/dev/sdb\n|-/dev/sdb1  xfs    /mnt\n`-/dev/sdb2\n");
        let failures = evaluate_disk_listing(&listing, "/dev/sdb");
        assert_eq!(failures.len(), 1);
        let diagnostic = failures[0].to_string();
        assert!(diagnostic.contains("/dev/sdb1"));
        assert!(diagnostic.contains("xfs /mnt"));
    }

    #[test]
    fn vanished_disk_fails() {
        let listing = format!("{HEADER}/dev/sdc\n");
        assert_eq!(
            evaluate_disk_listing(&listing, "/dev/sdb"),
            vec![CheckFailure::missing("block device", "/dev/sdb")]
        );
    }

    #[test]
    fn remaining_logical_volume_fails() {
        let failure = evaluate_lv_listing(Ok("  test1|10.00g\n".to_string()), "foo", "test1");
        assert!(matches!(failure, Some(CheckFailure::StillPresent { .. })));
    }

    #[test]
    fn empty_logical_volume_listing_passes() {
        let listing = Err(InquiryError::EmptyResult {
            command: "lvs".to_string(),
        });
        assert_eq!(evaluate_lv_listing(listing, "foo", "test1"), None);
        assert_eq!(
            evaluate_lv_listing(Ok("  other|1.00g\n".to_string()), "foo", "test1"),
            None
        );
    }

    #[test]
    fn failed_logical_volume_listing_fails() {
        let listing = Err(InquiryError::CommandFailed {
            command: "lvs".to_string(),
            stderr: "permission denied".to_string(),
        });
        assert!(matches!(
            evaluate_lv_listing(listing, "foo", "test1"),
            Some(CheckFailure::Inquiry { .. })
        ));
    }
}

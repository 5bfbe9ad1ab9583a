mod common;

use common::fixtures::{FixtureInquiry, block_listing, disk_config, lvm_config};
use storage_sys::InquiryError;
use storage_types::DesiredState;
use storage_verify::Verifier;

#[test]
fn removed_logical_volume_passes() {
    let inquiry = FixtureInquiry::new()
        .mount_table("UUID=1234 / xfs defaults 0 0\n")
        .failing(
            "lvs foo",
            InquiryError::EmptyResult {
                command: "lvs".to_string(),
            },
        );

    let report = Verifier::new(inquiry).verify(&lvm_config(None, DesiredState::Absent));

    assert!(report.overall_pass, "unexpected failures: {:?}", report.failures);
    assert_eq!(report.total_rules_run, 3);
}

#[test]
fn lingering_logical_volume_fails_mount_absence_only() {
    let inquiry = FixtureInquiry::new()
        .mount_table("UUID=1234 / xfs defaults 0 0\n")
        .logical_volumes("foo", "  test1|10.00g\n");

    let report = Verifier::new(inquiry).verify(&lvm_config(None, DesiredState::Absent));

    assert!(!report.overall_pass);
    assert_eq!(report.total_passed, 2);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("test1"));
}

#[test]
fn lingering_mount_table_entry_fails() {
    let inquiry = FixtureInquiry::new()
        .mount_table("/dev/mapper/foo-test1 /opt/test1 xfs defaults 0 0\n")
        .logical_volumes("foo", "  other|1.00g\n");

    let report = Verifier::new(inquiry).verify(&lvm_config(None, DesiredState::Absent));

    assert_eq!(report.total_passed, 2);
    assert!(report.failures[0].contains("/dev/mapper/foo-test1"));
}

#[test]
fn wiped_disk_is_still_listed_without_filesystem() {
    let inquiry = FixtureInquiry::new()
        .mount_table("UUID=1234 / xfs defaults 0 0\n")
        .block_devices("/dev/sdb", &block_listing(&[["/dev/sdb", "", ""]]));

    let report = Verifier::new(inquiry).verify(&disk_config(DesiredState::Absent));
    assert!(report.overall_pass, "unexpected failures: {:?}", report.failures);
}

#[test]
fn formatted_partition_of_wiped_disk_fails() {
    let listing = block_listing(&[
        ["/dev/sdb", "", ""],
        ["|-/dev/sdb1", "xfs", "/mnt"],
        ["`-/dev/sdb2", "", ""],
    ]);
    let inquiry = FixtureInquiry::new()
        .mount_table("UUID=1234 / xfs defaults 0 0\n")
        .block_devices("/dev/sdb", &listing);

    let report = Verifier::new(inquiry).verify(&disk_config(DesiredState::Absent));

    assert!(!report.overall_pass);
    assert_eq!(report.failures.len(), 1);
    assert!(report.failures[0].contains("/dev/sdb1"));
    assert!(report.failures[0].contains("xfs /mnt"));
}

#[test]
fn missing_disk_fails_absence() {
    let inquiry = FixtureInquiry::new()
        .mount_table("UUID=1234 / xfs defaults 0 0\n")
        .failing(
            "lsblk /dev/sdb",
            InquiryError::CommandFailed {
                command: "lsblk /dev/sdb".to_string(),
                stderr: "lsblk: /dev/sdb: not a block device".to_string(),
            },
        );

    let report = Verifier::new(inquiry).verify(&disk_config(DesiredState::Absent));

    assert!(!report.overall_pass);
    assert!(report.failures[0].contains("not a block device"));
}

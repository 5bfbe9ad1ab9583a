// SPDX-License-Identifier: GPL-3.0-only

//! Logical volume capacity
//!
//! Percentage sizes are checked against the capacity they were taken of:
//! the volume group total for `%VG`, and the first backing disk's physical
//! volume total for `%PVS` and `%FREE`. A mismatch only fails the rule while
//! that pool has no free space left; with space remaining the pool may be
//! shared with other volumes and the difference is tolerated.

use storage_sys::{lvm_tools, SystemInquiry};
use storage_types::{
    round_capacity, trim_fraction, ExpectedConfiguration, LogicalVolumeReport, PercentBasis,
    PhysicalVolumeReport, RuleOutcome, SizeSpec, VolumeGroupReport,
};
use tracing::debug;

use super::{outcome, VerificationRule};
use crate::error::{CheckFailure, ConfigurationError};

/// The logical volume's size honors the declared `size`. LVM only.
pub struct SizeRule;

/// Total and residual free capacity of the pool a percentage refers to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolCapacity {
    pub total_size: f64,
    pub free_space: f64,
}

impl From<&VolumeGroupReport> for PoolCapacity {
    fn from(vg: &VolumeGroupReport) -> Self {
        Self {
            total_size: vg.total_size,
            free_space: vg.free_space,
        }
    }
}

impl From<&PhysicalVolumeReport> for PoolCapacity {
    fn from(pv: &PhysicalVolumeReport) -> Self {
        Self {
            total_size: pv.total_size,
            free_space: pv.free_space,
        }
    }
}

fn format_gib(value: f64) -> String {
    format!("{value:.2}g")
}

/// `Default` size: the volume group must be fully allocated.
pub fn evaluate_default(vg: &VolumeGroupReport) -> Option<CheckFailure> {
    if round_capacity(vg.free_space) == 0 {
        return None;
    }
    Some(CheckFailure::mismatch(
        format!("free space of volume group {}", vg.name),
        format_gib(0.0),
        format_gib(vg.free_space),
    ))
}

/// Percentage sizes: `percent` of `pool.total_size` against the actual size.
pub fn evaluate_percentage(
    lv_name: &str,
    basis: PercentBasis,
    percent: f64,
    pool: PoolCapacity,
    actual_size: f64,
) -> Option<CheckFailure> {
    let expected_size = percent / 100.0 * pool.total_size;
    if round_capacity(expected_size) == round_capacity(actual_size) {
        return None;
    }

    if round_capacity(pool.free_space) != 0 {
        debug!(
            lv_name,
            expected_size,
            actual_size,
            free_space = pool.free_space,
            "size mismatch tolerated while pool has free space"
        );
        return None;
    }

    Some(CheckFailure::mismatch(
        format!("size of {lv_name} ({percent}%{})", basis.as_str()),
        format_gib(expected_size),
        format_gib(actual_size),
    ))
}

/// Reduce a reported size field to the same shape as an absolute request:
/// `<13.00g` -> `13g`.
pub fn normalize_reported_size(size: &str) -> String {
    let size = size.trim().trim_start_matches(['<', '>']).to_ascii_lowercase();
    let split = size
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(size.len());
    let (number, unit) = size.split_at(split);
    format!("{}{unit}", trim_fraction(number))
}

/// Absolute sizes: the request, in GiB at reporting precision, must be
/// contained in the normalized reported size.
pub fn evaluate_absolute(spec: &SizeSpec, lv: &LogicalVolumeReport) -> Option<CheckFailure> {
    let requested = spec.absolute_gib()?;
    let token = normalize_reported_size(&format_gib(requested));
    if normalize_reported_size(&lv.size).contains(&token) {
        return None;
    }
    Some(CheckFailure::mismatch(
        format!("size of {} ({spec})", lv.name),
        format_gib(requested),
        &lv.size,
    ))
}

fn volume_group(inquiry: &dyn SystemInquiry, vg: &str) -> Result<VolumeGroupReport, CheckFailure> {
    let subject = format!("volume group {vg}");
    let listing = inquiry
        .list_volume_groups(vg)
        .map_err(|error| CheckFailure::inquiry(&subject, error))?;
    lvm_tools::find_volume_group(&listing, vg)
        .map_err(|error| CheckFailure::malformed(&subject, error))?
        .ok_or_else(|| CheckFailure::missing(subject, vg))
}

fn physical_volume(
    inquiry: &dyn SystemInquiry,
    disk: &str,
) -> Result<PhysicalVolumeReport, CheckFailure> {
    let path = ExpectedConfiguration::disk_path(disk);
    let subject = format!("physical volume {path}");
    let listing = inquiry
        .list_physical_volumes(&path)
        .map_err(|error| CheckFailure::inquiry(&subject, error))?;
    lvm_tools::find_physical_volume(&listing, &path)
        .map_err(|error| CheckFailure::malformed(&subject, error))?
        .ok_or_else(|| CheckFailure::missing(subject, path))
}

fn logical_volume(
    inquiry: &dyn SystemInquiry,
    vg: &str,
    name: &str,
) -> Result<LogicalVolumeReport, CheckFailure> {
    let subject = format!("logical volumes of {vg}");
    let listing = inquiry
        .list_logical_volumes(vg)
        .map_err(|error| CheckFailure::inquiry(&subject, error))?;
    lvm_tools::find_logical_volume(&listing, name)
        .map_err(|error| CheckFailure::malformed(&subject, error))?
        .ok_or_else(|| CheckFailure::missing(subject, name))
}

fn pool_for(
    basis: PercentBasis,
    expected: &ExpectedConfiguration,
    inquiry: &dyn SystemInquiry,
    vg: &str,
) -> Result<PoolCapacity, CheckFailure> {
    match basis {
        PercentBasis::VolumeGroup => volume_group(inquiry, vg).map(|vg| PoolCapacity::from(&vg)),
        PercentBasis::Free | PercentBasis::PhysicalVolume => {
            let disk = expected
                .first_disk()
                .ok_or(CheckFailure::Configuration(ConfigurationError::NoDisks))?;
            physical_volume(inquiry, disk).map(|pv| PoolCapacity::from(&pv))
        }
    }
}

fn verify(
    expected: &ExpectedConfiguration,
    inquiry: &dyn SystemInquiry,
) -> Result<Option<CheckFailure>, CheckFailure> {
    let (Some(vg), Some(lv_name)) = (expected.volume_group(), expected.device_name()) else {
        return Err(CheckFailure::Configuration(
            ConfigurationError::MissingVolumeGroup,
        ));
    };

    match expected.size_spec() {
        SizeSpec::Default => Ok(evaluate_default(&volume_group(inquiry, vg)?)),
        SizeSpec::Percentage { basis, percent } => {
            let pool = pool_for(*basis, expected, inquiry, vg)?;
            let lv = logical_volume(inquiry, vg, lv_name)?;
            Ok(evaluate_percentage(lv_name, *basis, *percent, pool, lv.size_gib))
        }
        spec @ SizeSpec::Absolute { .. } => {
            let lv = logical_volume(inquiry, vg, lv_name)?;
            Ok(evaluate_absolute(spec, &lv))
        }
        SizeSpec::Unsupported { reason } => Err(CheckFailure::Configuration(
            ConfigurationError::UnsupportedSize(reason.clone()),
        )),
    }
}

impl VerificationRule for SizeRule {
    fn name(&self) -> &'static str {
        "size"
    }

    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry) -> RuleOutcome {
        let failures = match verify(expected, inquiry) {
            Ok(failure) => failure.into_iter().collect(),
            Err(failure) => vec![failure],
        };
        outcome(self.name(), failures)
    }
}

// SPDX-License-Identifier: GPL-3.0-only

//! Canonical models for storage role verification
//!
//! This crate defines the types shared by the probing layer and the
//! verifier:
//!
//! - **storage-sys**: parses probe output into the fact types here
//! - **storage-verify**: compares facts against an `ExpectedConfiguration`
//!   and produces a `Report`
//!
//! ## Architecture
//!
//! ### Intent
//! - `RoleParameters` → flat role variables as delivered
//! - `ExpectedConfiguration` → validated-shape, strongly typed intent
//! - `SizeSpec` → the `size` variable, resolved once
//!
//! ### Facts
//! - `DeviceRecord` → block device listing row
//! - `MountTableEntry` → persisted mount table line
//! - `VolumeGroupReport`, `PhysicalVolumeReport`, `LogicalVolumeReport` → LVM capacity
//!
//! ### Outcomes
//! - `RuleOutcome` → one rule's verdict
//! - `Report` → the aggregated result

pub mod block;
pub mod config;
pub mod error;
pub mod lvm;
pub mod mount;
pub mod params;
pub mod report;
pub mod size;

pub use block::DeviceRecord;
pub use config::{
    DEFAULT_FILESYSTEM_TYPE, DesiredState, DeviceType, ExpectedConfiguration,
    ExpectedConfigurationBuilder,
};
pub use error::ParameterError;
pub use lvm::{
    LogicalVolumeReport, PhysicalVolumeReport, VolumeGroupReport, round_capacity, unit_scale_gib,
};
pub use mount::{MOUNT_TABLE_FIELDS, MountTableEntry};
pub use params::{DiskList, RoleParameters};
pub use report::{Report, RuleOutcome};
pub use size::{PercentBasis, SizeSpec, normalize_unit, trim_fraction};

// SPDX-License-Identifier: GPL-3.0-only

//! Declared storage intent
//!
//! `ExpectedConfiguration` is the strongly typed form of the provisioning
//! role's variables. It is built once per verification run and never mutated
//! afterwards; the only normalization applied at construction is filling the
//! default filesystem type.

use serde::{Deserialize, Serialize};

use crate::size::SizeSpec;

/// Filesystem assumed when the role variables leave `fs_type` unset.
pub const DEFAULT_FILESYSTEM_TYPE: &str = "xfs";

/// Kind of block device the role provisioned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceType {
    /// A whole physical disk, formatted directly.
    Disk,
    /// A logical volume carved out of a volume group.
    #[default]
    Lvm,
}

impl DeviceType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Disk => "disk",
            Self::Lvm => "lvm",
        }
    }
}

/// Whether the storage is supposed to exist after provisioning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DesiredState {
    #[default]
    Present,
    Absent,
}

impl DesiredState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

/// The declared configuration a verification run compares reality against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedConfiguration {
    device_type: DeviceType,
    device_name: Option<String>,
    disks: Vec<String>,
    volume_group: Option<String>,
    filesystem_type: String,
    filesystem_label: Option<String>,
    filesystem_create_options: Option<String>,
    mount_point: String,
    mount_options: Option<String>,
    size_spec: SizeSpec,
    desired_state: DesiredState,
}

impl ExpectedConfiguration {
    /// Start building a configuration for the given disks and mount point.
    pub fn builder(
        disks: impl IntoIterator<Item = impl Into<String>>,
        mount_point: impl Into<String>,
    ) -> ExpectedConfigurationBuilder {
        ExpectedConfigurationBuilder {
            config: ExpectedConfiguration {
                device_type: DeviceType::default(),
                device_name: None,
                disks: disks.into_iter().map(Into::into).collect(),
                volume_group: None,
                filesystem_type: DEFAULT_FILESYSTEM_TYPE.to_string(),
                filesystem_label: None,
                filesystem_create_options: None,
                mount_point: mount_point.into(),
                mount_options: None,
                size_spec: SizeSpec::Default,
                desired_state: DesiredState::default(),
            },
        }
    }

    pub fn device_type(&self) -> DeviceType {
        self.device_type
    }

    pub fn device_name(&self) -> Option<&str> {
        self.device_name.as_deref()
    }

    pub fn disks(&self) -> &[String] {
        &self.disks
    }

    pub fn first_disk(&self) -> Option<&str> {
        self.disks.first().map(String::as_str)
    }

    pub fn volume_group(&self) -> Option<&str> {
        self.volume_group.as_deref()
    }

    pub fn filesystem_type(&self) -> &str {
        &self.filesystem_type
    }

    pub fn filesystem_label(&self) -> Option<&str> {
        self.filesystem_label.as_deref()
    }

    pub fn filesystem_create_options(&self) -> Option<&str> {
        self.filesystem_create_options.as_deref()
    }

    pub fn mount_point(&self) -> &str {
        &self.mount_point
    }

    pub fn mount_options(&self) -> Option<&str> {
        self.mount_options.as_deref()
    }

    pub fn size_spec(&self) -> &SizeSpec {
        &self.size_spec
    }

    pub fn desired_state(&self) -> DesiredState {
        self.desired_state
    }

    /// Full device path of a disk, accepting both `sdb` and `/dev/sdb`.
    pub fn disk_path(disk: &str) -> String {
        if disk.starts_with("/dev/") {
            disk.to_string()
        } else {
            format!("/dev/{disk}")
        }
    }

    /// Device-mapper name of the logical volume (`{vg}-{lv}`).
    ///
    /// Hyphens inside either name are doubled, as the kernel does for
    /// `/dev/mapper` entries.
    pub fn mapper_name(&self) -> Option<String> {
        let vg = self.volume_group()?;
        let lv = self.device_name()?;
        Some(format!("{}-{}", vg.replace('-', "--"), lv.replace('-', "--")))
    }

    /// Identity used to find this device in a block device listing.
    ///
    /// Disk: the first disk's device path. LVM: the mapper name.
    pub fn device_identity(&self) -> Option<String> {
        match self.device_type {
            DeviceType::Disk => self.first_disk().map(Self::disk_path),
            DeviceType::Lvm => self.mapper_name(),
        }
    }

    /// Path the device is expected to be referenced by in the mount table.
    pub fn persisted_device_path(&self) -> Option<String> {
        match self.device_type {
            DeviceType::Disk => self.first_disk().map(Self::disk_path),
            DeviceType::Lvm => self.mapper_name().map(|name| format!("/dev/mapper/{name}")),
        }
    }
}

/// Builder for [`ExpectedConfiguration`].
///
/// Accepts any combination of fields, including invalid ones; validity is
/// judged by the verifier's pre-check, not here.
#[derive(Debug, Clone)]
pub struct ExpectedConfigurationBuilder {
    config: ExpectedConfiguration,
}

impl ExpectedConfigurationBuilder {
    pub fn device_type(mut self, device_type: DeviceType) -> Self {
        self.config.device_type = device_type;
        self
    }

    pub fn device_name(mut self, name: impl Into<String>) -> Self {
        self.config.device_name = non_empty(name.into());
        self
    }

    pub fn volume_group(mut self, vg: impl Into<String>) -> Self {
        self.config.volume_group = non_empty(vg.into());
        self
    }

    /// Empty values fall back to [`DEFAULT_FILESYSTEM_TYPE`].
    pub fn filesystem_type(mut self, fs_type: impl Into<String>) -> Self {
        let fs_type = fs_type.into();
        self.config.filesystem_type = if fs_type.trim().is_empty() {
            DEFAULT_FILESYSTEM_TYPE.to_string()
        } else {
            fs_type.trim().to_string()
        };
        self
    }

    pub fn filesystem_label(mut self, label: impl Into<String>) -> Self {
        self.config.filesystem_label = non_empty(label.into());
        self
    }

    pub fn filesystem_create_options(mut self, options: impl Into<String>) -> Self {
        self.config.filesystem_create_options = non_empty(options.into());
        self
    }

    pub fn mount_options(mut self, options: impl Into<String>) -> Self {
        self.config.mount_options = non_empty(options.into());
        self
    }

    pub fn size_spec(mut self, size_spec: SizeSpec) -> Self {
        self.config.size_spec = size_spec;
        self
    }

    pub fn desired_state(mut self, state: DesiredState) -> Self {
        self.config.desired_state = state;
        self
    }

    pub fn build(self) -> ExpectedConfiguration {
        self.config
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

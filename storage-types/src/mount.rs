// SPDX-License-Identifier: GPL-3.0-only

//! Persisted mount table facts

use serde::{Deserialize, Serialize};

/// Number of whitespace-separated fields in a well-formed mount table line.
pub const MOUNT_TABLE_FIELDS: usize = 6;

/// One entry of the boot-time mount table (`/etc/fstab`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountTableEntry {
    /// Device spec (e.g., "/dev/mapper/vg0-data", "/dev/sdb")
    pub device_path: String,

    /// Mount point (e.g., "/opt/data")
    pub mount_point: String,

    /// Filesystem type
    pub filesystem_type: String,

    /// Mount options string
    pub options: String,

    /// Dump flag
    pub dump: String,

    /// fsck pass number
    pub pass: String,
}

impl MountTableEntry {
    /// Whether this entry references `device_path`, by substring containment.
    pub fn references(&self, device_path: &str) -> bool {
        !device_path.is_empty() && self.device_path.contains(device_path)
    }
}

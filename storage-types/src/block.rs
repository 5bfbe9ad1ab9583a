// SPDX-License-Identifier: GPL-3.0-only

//! Block device introspection facts

use serde::{Deserialize, Serialize};

/// One device row from a block device listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Device name, with any tree-drawing prefix removed
    pub name: String,

    /// Filesystem type (e.g., "xfs", "ext4")
    pub filesystem_type: String,

    /// Current mount point
    pub mount_point: String,
}

impl DeviceRecord {
    /// Whether this record belongs to `identity`.
    ///
    /// Matching is by substring containment so partial identifiers (a bare
    /// mapper name against a full `/dev/mapper/...` path) still resolve.
    pub fn matches(&self, identity: &str) -> bool {
        !identity.is_empty() && self.name.contains(identity)
    }
}

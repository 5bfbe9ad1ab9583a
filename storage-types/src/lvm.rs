//! LVM (Logical Volume Manager) capacity facts
//!
//! Reports for volume groups, physical volumes and logical volumes. All
//! capacities are expressed in GiB so percentages can be computed across
//! reports.

use serde::{Deserialize, Serialize};

/// Volume group capacity report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeGroupReport {
    /// Volume group name
    pub name: String,

    /// Total size in GiB
    pub total_size: f64,

    /// Free space in GiB
    pub free_space: f64,
}

/// Physical volume capacity report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalVolumeReport {
    /// Device path (e.g., "/dev/sdb")
    pub device: String,

    /// Total size in GiB
    pub total_size: f64,

    /// Free space in GiB
    pub free_space: f64,
}

/// Logical volume size report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogicalVolumeReport {
    /// Logical volume name
    pub name: String,

    /// Size field exactly as reported (e.g., "13.00g", "<9.99g")
    pub size: String,

    /// Size in GiB
    pub size_gib: f64,
}

impl LogicalVolumeReport {
    /// Whether this report belongs to the logical volume `name`.
    pub fn matches(&self, name: &str) -> bool {
        !name.is_empty() && self.name.contains(name)
    }
}

/// GiB per LVM unit letter (`b`, `s`, `k`, `m`, `g`, `t`, `p`, `e`), any case.
pub fn unit_scale_gib(unit: char) -> Option<f64> {
    const KIB: f64 = 1.0 / (1024.0 * 1024.0);
    match unit.to_ascii_lowercase() {
        'b' => Some(KIB / 1024.0),
        's' => Some(512.0 * KIB / 1024.0),
        'k' => Some(KIB),
        'm' => Some(1.0 / 1024.0),
        'g' => Some(1.0),
        't' => Some(1024.0),
        'p' => Some(1024.0 * 1024.0),
        'e' => Some(1024.0 * 1024.0 * 1024.0),
        _ => None,
    }
}

/// A size reading reduced to the reporting precision (hundredths of a GiB).
pub fn round_capacity(value: f64) -> i64 {
    (value * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scales_units_to_gib() {
        assert_eq!(unit_scale_gib('M'), Some(1.0 / 1024.0));
        assert_eq!(unit_scale_gib('g'), Some(1.0));
        assert_eq!(unit_scale_gib('T'), Some(1024.0));
        assert_eq!(unit_scale_gib('q'), None);
    }

    #[test]
    fn rounds_to_reporting_precision() {
        assert_eq!(round_capacity(10.0), round_capacity(9.999));
        assert_ne!(round_capacity(10.0), round_capacity(9.98));
    }
}

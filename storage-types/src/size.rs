// SPDX-License-Identifier: GPL-3.0-only

//! Logical volume size requests
//!
//! The role's `size` variable is a free-form string (`"10G"`, `"50%VG"`,
//! `"100%FREE"`, ...). It is resolved once into a [`SizeSpec`] so rules
//! never re-parse it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::lvm::unit_scale_gib;

/// Capacity a percentage size is taken of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PercentBasis {
    /// Remaining free space (`%FREE`).
    Free,
    /// Total size of the volume group (`%VG`).
    VolumeGroup,
    /// Total size of the physical volumes (`%PVS`).
    PhysicalVolume,
}

impl PercentBasis {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::VolumeGroup => "VG",
            Self::PhysicalVolume => "PVS",
        }
    }
}

/// Resolved form of the role's `size` variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SizeSpec {
    /// Unset, or all remaining free space.
    Default,
    /// A percentage of some capacity, `0 < percent <= 100`.
    Percentage { basis: PercentBasis, percent: f64 },
    /// An absolute size with a normalized single-letter unit (`G`, `M`, ...).
    Absolute { value: String, unit: String },
    /// Anything the verifier refuses to check.
    Unsupported { reason: String },
}

const UNITS: &[&str] = &["B", "S", "K", "M", "G", "T", "P", "E"];

/// Unit the provisioning tool assumes for a bare number.
const DEFAULT_UNIT: &str = "M";

impl SizeSpec {
    /// Resolve an optional raw size string.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|raw| !raw.is_empty()) else {
            return Self::Default;
        };

        if raw.starts_with('+') {
            return Self::Unsupported {
                reason: format!("incremental extension '{raw}' cannot be verified"),
            };
        }

        match raw.split_once('%') {
            Some((percent, basis)) => parse_percentage(raw, percent, basis),
            None => parse_absolute(raw),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// An absolute size converted to GiB, the unit LVM reports are read in.
    pub fn absolute_gib(&self) -> Option<f64> {
        let Self::Absolute { value, unit } = self else {
            return None;
        };
        let value: f64 = value.parse().ok()?;
        let scale = unit.chars().next().and_then(unit_scale_gib)?;
        Some(value * scale)
    }
}

impl fmt::Display for SizeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "100%FREE"),
            Self::Percentage { basis, percent } => write!(f, "{percent}%{}", basis.as_str()),
            Self::Absolute { value, unit } => write!(f, "{value}{unit}"),
            Self::Unsupported { reason } => write!(f, "unsupported ({reason})"),
        }
    }
}

fn parse_percentage(raw: &str, percent: &str, basis: &str) -> SizeSpec {
    let Ok(percent) = percent.trim().parse::<f64>() else {
        return SizeSpec::Unsupported {
            reason: format!("invalid percentage in '{raw}'"),
        };
    };
    if !(percent > 0.0 && percent <= 100.0) {
        return SizeSpec::Unsupported {
            reason: format!("percentage out of range in '{raw}'"),
        };
    }

    let basis = match basis.trim().to_ascii_uppercase().as_str() {
        "" | "FREE" => PercentBasis::Free,
        "VG" => PercentBasis::VolumeGroup,
        "PV" | "PVS" => PercentBasis::PhysicalVolume,
        other => {
            return SizeSpec::Unsupported {
                reason: format!("unknown percentage basis '%{other}'"),
            };
        }
    };

    if basis == PercentBasis::Free && percent == 100.0 {
        return SizeSpec::Default;
    }

    SizeSpec::Percentage { basis, percent }
}

fn parse_absolute(raw: &str) -> SizeSpec {
    let split = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(raw.len());
    let (value, unit) = raw.split_at(split);

    if value.is_empty() || value.parse::<f64>().is_err() {
        return SizeSpec::Unsupported {
            reason: format!("invalid size '{raw}'"),
        };
    }

    let Some(unit) = normalize_unit(unit) else {
        return SizeSpec::Unsupported {
            reason: format!("unknown size unit in '{raw}'"),
        };
    };

    SizeSpec::Absolute {
        value: trim_fraction(value),
        unit,
    }
}

/// Map unit aliases onto a single letter: `GiB` -> `G`, `MiB` -> `M`, `g` -> `G`.
pub fn normalize_unit(unit: &str) -> Option<String> {
    let unit = unit.trim().to_ascii_uppercase();
    if unit.is_empty() {
        return Some(DEFAULT_UNIT.to_string());
    }

    let letter = if unit.len() == 3 && unit.ends_with("IB") {
        &unit[..1]
    } else if unit.len() == 2 && unit.ends_with('B') {
        &unit[..1]
    } else {
        unit.as_str()
    };

    UNITS.contains(&letter).then(|| letter.to_string())
}

/// Drop trailing fractional zeros: `13.00` -> `13`, `13.50` -> `13.5`.
pub fn trim_fraction(value: &str) -> String {
    if !value.contains('.') {
        return value.to_string();
    }
    value
        .trim_end_matches('0')
        .trim_end_matches('.')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_and_full_free_are_default() {
        assert_eq!(SizeSpec::parse(None), SizeSpec::Default);
        assert_eq!(SizeSpec::parse(Some("   ")), SizeSpec::Default);
        assert_eq!(SizeSpec::parse(Some("100%FREE")), SizeSpec::Default);
        assert_eq!(SizeSpec::parse(Some("100% free")), SizeSpec::Default);
        assert_eq!(SizeSpec::parse(Some("100%")), SizeSpec::Default);
    }

    #[test]
    fn parses_percentage_bases() {
        assert_eq!(
            SizeSpec::parse(Some("50%VG")),
            SizeSpec::Percentage {
                basis: PercentBasis::VolumeGroup,
                percent: 50.0
            }
        );
        assert_eq!(
            SizeSpec::parse(Some("25%pvs")),
            SizeSpec::Percentage {
                basis: PercentBasis::PhysicalVolume,
                percent: 25.0
            }
        );
        assert_eq!(
            SizeSpec::parse(Some("40%FREE")),
            SizeSpec::Percentage {
                basis: PercentBasis::Free,
                percent: 40.0
            }
        );
    }

    #[test]
    fn rejects_extension_and_bad_percentages() {
        assert!(SizeSpec::parse(Some("+10G")).is_unsupported());
        assert!(SizeSpec::parse(Some("+50%FREE")).is_unsupported());
        assert!(SizeSpec::parse(Some("150%VG")).is_unsupported());
        assert!(SizeSpec::parse(Some("0%VG")).is_unsupported());
        assert!(SizeSpec::parse(Some("50%ORIGIN")).is_unsupported());
        assert!(SizeSpec::parse(Some("lots")).is_unsupported());
        assert!(SizeSpec::parse(Some("10Q")).is_unsupported());
    }

    #[test]
    fn normalizes_absolute_units() {
        assert_eq!(
            SizeSpec::parse(Some("13GiB")),
            SizeSpec::Absolute {
                value: "13".to_string(),
                unit: "G".to_string()
            }
        );
        assert_eq!(
            SizeSpec::parse(Some("512MiB")),
            SizeSpec::Absolute {
                value: "512".to_string(),
                unit: "M".to_string()
            }
        );
    }

    #[test]
    fn converts_absolute_sizes_to_gib() {
        assert_eq!(SizeSpec::parse(Some("512MiB")).absolute_gib(), Some(0.5));
        assert_eq!(SizeSpec::parse(Some("2.50t")).absolute_gib(), Some(2560.0));
        assert_eq!(SizeSpec::parse(Some("1024GiB")).absolute_gib(), Some(1024.0));
        assert_eq!(SizeSpec::parse(Some("256")).absolute_gib(), Some(0.25));
        assert_eq!(SizeSpec::parse(Some("50%VG")).absolute_gib(), None);
    }

    #[test]
    fn trims_fractional_zeros() {
        assert_eq!(trim_fraction("13.00"), "13");
        assert_eq!(trim_fraction("13.50"), "13.5");
        assert_eq!(trim_fraction("100"), "100");
    }
}

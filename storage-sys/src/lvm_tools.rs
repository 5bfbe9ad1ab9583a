// SPDX-License-Identifier: GPL-3.0-only

//! LVM reporting tools: argument lists and output parsers
//!
//! Every report is requested with `--noheadings --separator |` so columns can
//! be split without guessing at whitespace, and with `--units g` so every
//! capacity is printed in one unit.

use storage_types::{
    unit_scale_gib, LogicalVolumeReport, PhysicalVolumeReport, VolumeGroupReport,
};

use crate::ParseError;

pub const SEPARATOR: char = '|';

const LV_FIELDS: usize = 2;
const VG_FIELDS: usize = 3;
const PV_FIELDS: usize = 3;

pub fn lvs_args(vg: &str) -> Vec<String> {
    // A selection keeps a missing volume group an empty listing instead of an error.
    vec![
        "--noheadings".to_string(),
        "--separator".to_string(),
        SEPARATOR.to_string(),
        "--units".to_string(),
        "g".to_string(),
        "--select".to_string(),
        format!("vg_name={vg}"),
        "--options".to_string(),
        "lv_name,lv_size".to_string(),
    ]
}

pub fn vgs_args(vg: &str) -> Vec<String> {
    vec![
        "--noheadings".to_string(),
        "--separator".to_string(),
        SEPARATOR.to_string(),
        "--units".to_string(),
        "g".to_string(),
        "--options".to_string(),
        "vg_name,vg_size,vg_free".to_string(),
        vg.to_string(),
    ]
}

pub fn pvs_args(disk: &str) -> Vec<String> {
    vec![
        "--noheadings".to_string(),
        "--separator".to_string(),
        SEPARATOR.to_string(),
        "--units".to_string(),
        "g".to_string(),
        "--options".to_string(),
        "pv_name,pv_size,pv_free".to_string(),
        disk.to_string(),
    ]
}

fn parse_separated_line(line: &str) -> Vec<String> {
    line.split(SEPARATOR)
        .map(|part| part.trim().to_string())
        .collect()
}

fn report_rows(output: &str, expected_fields: usize) -> Result<Vec<Vec<String>>, ParseError> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let cols = parse_separated_line(line);
            if cols.len() != expected_fields {
                return Err(ParseError::MalformedOutput {
                    expected_fields,
                    actual_fields: cols.len(),
                    line: line.to_string(),
                });
            }
            Ok(cols)
        })
        .collect()
}

/// Convert an LVM size field (`13.00g`, `<9.99g`, `512.00m`, `20`) to GiB.
///
/// Fields without a suffix are taken to already be in GiB.
pub fn parse_capacity(field: &str) -> Result<f64, ParseError> {
    let invalid = || ParseError::InvalidCapacity(field.to_string());

    let trimmed = field.trim().trim_start_matches(['<', '>']);
    let (number, unit) = match trimmed.chars().last() {
        Some(last) if last.is_ascii_alphabetic() => (&trimmed[..trimmed.len() - 1], last),
        Some(_) => (trimmed, 'g'),
        None => return Err(invalid()),
    };

    let value: f64 = number.parse().map_err(|_| invalid())?;
    let scale = unit_scale_gib(unit).ok_or_else(invalid)?;

    Ok(value * scale)
}

pub fn parse_lvs(output: &str) -> Result<Vec<LogicalVolumeReport>, ParseError> {
    report_rows(output, LV_FIELDS)?
        .into_iter()
        .map(|cols| {
            Ok(LogicalVolumeReport {
                size_gib: parse_capacity(&cols[1])?,
                name: cols[0].clone(),
                size: cols[1].clone(),
            })
        })
        .collect()
}

pub fn parse_vgs(output: &str) -> Result<Vec<VolumeGroupReport>, ParseError> {
    report_rows(output, VG_FIELDS)?
        .into_iter()
        .map(|cols| {
            Ok(VolumeGroupReport {
                name: cols[0].clone(),
                total_size: parse_capacity(&cols[1])?,
                free_space: parse_capacity(&cols[2])?,
            })
        })
        .collect()
}

pub fn parse_pvs(output: &str) -> Result<Vec<PhysicalVolumeReport>, ParseError> {
    report_rows(output, PV_FIELDS)?
        .into_iter()
        .map(|cols| {
            Ok(PhysicalVolumeReport {
                device: cols[0].clone(),
                total_size: parse_capacity(&cols[1])?,
                free_space: parse_capacity(&cols[2])?,
            })
        })
        .collect()
}

pub fn find_logical_volume(
    output: &str,
    name: &str,
) -> Result<Option<LogicalVolumeReport>, ParseError> {
    Ok(parse_lvs(output)?.into_iter().find(|lv| lv.matches(name)))
}

pub fn find_volume_group(output: &str, vg: &str) -> Result<Option<VolumeGroupReport>, ParseError> {
    Ok(parse_vgs(output)?.into_iter().find(|row| row.name == vg))
}

pub fn find_physical_volume(
    output: &str,
    disk: &str,
) -> Result<Option<PhysicalVolumeReport>, ParseError> {
    Ok(parse_pvs(output)?
        .into_iter()
        .find(|row| !disk.is_empty() && row.device.contains(disk)))
}

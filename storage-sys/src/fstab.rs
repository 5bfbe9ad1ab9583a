// SPDX-License-Identifier: GPL-3.0-only

//! Persisted mount table parser

use storage_types::{MountTableEntry, MOUNT_TABLE_FIELDS};

use crate::ParseError;

/// Non-comment, non-blank lines of a mount table.
pub fn entry_lines(input: &str) -> impl Iterator<Item = &str> {
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

pub fn parse_entry(line: &str) -> Result<MountTableEntry, ParseError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    match fields.as_slice() {
        [device_path, mount_point, filesystem_type, options, dump, pass] => Ok(MountTableEntry {
            device_path: device_path.to_string(),
            mount_point: mount_point.to_string(),
            filesystem_type: filesystem_type.to_string(),
            options: options.to_string(),
            dump: dump.to_string(),
            pass: pass.to_string(),
        }),
        _ => Err(ParseError::MalformedOutput {
            expected_fields: MOUNT_TABLE_FIELDS,
            actual_fields: fields.len(),
            line: line.to_string(),
        }),
    }
}

/// Entry whose device column references `device_path`.
///
/// Lines for other devices are never parsed, so a malformed line elsewhere in
/// the table does not affect the result.
pub fn find_entry(input: &str, device_path: &str) -> Result<Option<MountTableEntry>, ParseError> {
    entry_lines(input)
        .find(|line| {
            line.split_whitespace()
                .next()
                .is_some_and(|device| device.contains(device_path))
        })
        .map(parse_entry)
        .transpose()
}

/// Every entry line that mentions `device_path` in any column.
pub fn referencing_lines<'a>(input: &'a str, device_path: &str) -> Vec<&'a str> {
    if device_path.is_empty() {
        return Vec::new();
    }
    entry_lines(input)
        .filter(|line| line.contains(device_path))
        .collect()
}

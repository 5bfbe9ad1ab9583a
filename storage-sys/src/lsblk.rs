// SPDX-License-Identifier: GPL-3.0-only

//! Block device listing parser
//!
//! Input is `lsblk --ascii --paths --output NAME,FSTYPE,MOUNTPOINT <target>`,
//! header line included. Columns are left aligned under their heading, so
//! every row is cut at the header's column offsets and a device without a
//! filesystem or mount point keeps those columns, empty. Children of a
//! device are printed as a tree: the name column may start with branch
//! glyphs (`|-`, `` `- ``, or their unicode forms) that are not part of the
//! device name.

use storage_types::DeviceRecord;

use crate::ParseError;

/// Requested columns, in output order.
pub const COLUMNS: [&str; 3] = ["NAME", "FSTYPE", "MOUNTPOINT"];

/// Columns in every row: name, filesystem type, mount point.
pub const DEVICE_RECORD_FIELDS: usize = COLUMNS.len();

const TREE_GLYPHS: &[char] = &['|', '`', '-', '├', '└', '─', '│'];

/// One raw row of a block device listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDeviceRow {
    pub line: String,
    pub fields: Vec<String>,
}

impl BlockDeviceRow {
    pub fn name(&self) -> &str {
        self.fields.first().map(String::as_str).unwrap_or_default()
    }

    /// Filesystem type and mount point columns.
    pub fn attributes(&self) -> &[String] {
        self.fields.get(1..).unwrap_or_default()
    }

    /// Neither a filesystem nor a mount point is reported.
    pub fn is_bare(&self) -> bool {
        self.attributes().iter().all(String::is_empty)
    }

    pub fn matches(&self, identity: &str) -> bool {
        !identity.is_empty() && self.name().contains(identity)
    }
}

impl TryFrom<&BlockDeviceRow> for DeviceRecord {
    type Error = ParseError;

    fn try_from(row: &BlockDeviceRow) -> Result<Self, Self::Error> {
        match row.fields.as_slice() {
            [name, filesystem_type, mount_point] => Ok(DeviceRecord {
                name: name.clone(),
                filesystem_type: filesystem_type.clone(),
                mount_point: mount_point.clone(),
            }),
            fields => Err(ParseError::MalformedOutput {
                expected_fields: DEVICE_RECORD_FIELDS,
                actual_fields: fields.len(),
                line: row.line.clone(),
            }),
        }
    }
}

/// Remove any leading tree-drawing prefix from a device name.
pub fn strip_tree_prefix(name: &str) -> &str {
    name.trim_start_matches(|c: char| c.is_whitespace() || TREE_GLYPHS.contains(&c))
}

/// Character offset of each column, taken from the header line.
fn column_offsets(header: &str) -> Result<Vec<usize>, ParseError> {
    let line = header.trim_end();
    let names: Vec<&str> = line.split_whitespace().collect();
    if names.len() != DEVICE_RECORD_FIELDS {
        return Err(ParseError::MalformedOutput {
            expected_fields: DEVICE_RECORD_FIELDS,
            actual_fields: names.len(),
            line: line.to_string(),
        });
    }
    if names != COLUMNS {
        return Err(ParseError::UnexpectedHeader {
            expected: COLUMNS.join(" "),
            line: line.to_string(),
        });
    }

    let mut offsets = Vec::with_capacity(DEVICE_RECORD_FIELDS);
    let mut previous = ' ';
    for (index, c) in line.chars().enumerate() {
        if !c.is_whitespace() && previous.is_whitespace() {
            offsets.push(index);
        }
        previous = c;
    }
    Ok(offsets)
}

fn split_row(line: &str, offsets: &[usize]) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    offsets
        .iter()
        .enumerate()
        .map(|(column, &start)| {
            let end = offsets
                .get(column + 1)
                .copied()
                .unwrap_or(chars.len())
                .min(chars.len());
            let start = start.min(end);
            chars[start..end].iter().collect::<String>().trim().to_string()
        })
        .collect()
}

/// Every device row below the header. An empty listing has no rows.
pub fn parse_rows(output: &str) -> Result<Vec<BlockDeviceRow>, ParseError> {
    let mut lines = output.lines().filter(|line| !line.trim().is_empty());
    let Some(header) = lines.next() else {
        return Ok(Vec::new());
    };
    let offsets = column_offsets(header)?;

    Ok(lines
        .map(|line| {
            let mut fields = split_row(line, &offsets);
            if let Some(name) = fields.first_mut() {
                *name = strip_tree_prefix(name).to_string();
            }
            BlockDeviceRow {
                line: line.trim_end().to_string(),
                fields,
            }
        })
        .collect())
}

/// First row whose device name contains `identity`.
pub fn find_row(output: &str, identity: &str) -> Result<Option<BlockDeviceRow>, ParseError> {
    Ok(parse_rows(output)?
        .into_iter()
        .find(|row| row.matches(identity)))
}

/// Parsed record for `identity`, or `None` when no row names it.
pub fn find_device_record(
    output: &str,
    identity: &str,
) -> Result<Option<DeviceRecord>, ParseError> {
    find_row(output, identity)?
        .map(|row| DeviceRecord::try_from(&row))
        .transpose()
}

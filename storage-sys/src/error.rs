// SPDX-License-Identifier: GPL-3.0-only

use thiserror::Error;

/// Failure of a read-only system probe
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InquiryError {
    #[error("command failed: {command}; stderr: {stderr}")]
    CommandFailed { command: String, stderr: String },

    #[error("empty result from: {command}")]
    EmptyResult { command: String },

    #[error("timed out after {seconds}s: {command}")]
    Timeout { command: String, seconds: u64 },
}

/// Probe output that does not have the expected shape
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed output: expected {expected_fields} fields, found {actual_fields} in '{line}'")]
    MalformedOutput {
        expected_fields: usize,
        actual_fields: usize,
        line: String,
    },

    #[error("unexpected header: expected '{expected}', found '{line}'")]
    UnexpectedHeader { expected: String, line: String },

    #[error("invalid capacity value '{0}'")]
    InvalidCapacity(String),
}

/// Result type alias for probes
pub type Result<T> = std::result::Result<T, InquiryError>;

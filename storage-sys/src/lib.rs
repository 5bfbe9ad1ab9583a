// SPDX-License-Identifier: GPL-3.0-only

//! Low-level system probes for storage verification
//!
//! This crate provides the read-only inquiry layer the verifier relies on:
//! - Running `lsblk` and the LVM reporting tools (`lvs`, `vgs`, `pvs`)
//! - Reading the persisted mount table
//! - Parsing their textual output into `storage-types` facts
//!
//! Nothing here mutates system state. LVM reports generally require elevated
//! privileges; the inquiry layer warns when it is not running as root.

pub mod cmd;
pub mod error;
pub mod fstab;
pub mod inquiry;
pub mod lsblk;
pub mod lvm_tools;

pub use error::{InquiryError, ParseError, Result};
pub use inquiry::{CommandInquiry, MemoizedInquiry, SystemInquiry, DEFAULT_MOUNT_TABLE};

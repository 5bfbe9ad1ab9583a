// SPDX-License-Identifier: GPL-3.0-only

//! Post-provisioning verification of disk and LVM storage
//!
//! Given the same variables the storage role was run with, re-inspect the
//! live system and report whether the device, its filesystem, mount point,
//! mount table entry and capacity match what was declared. The verifier is
//! read-only.

pub mod cli;
pub mod config;
pub mod driver;
pub mod error;
pub mod logging;
pub mod rules;

pub use config::{LoggingLevel, OutputFormat, VerifierConfig};
pub use driver::{RULE_TABLE, RuleSet, Verifier, render_text, rules_for};
pub use error::{CheckFailure, ConfigFileError, ConfigurationError};
pub use rules::VerificationRule;

// SPDX-License-Identifier: GPL-3.0-only

//! Verification rules
//!
//! Each rule probes what it needs through a [`SystemInquiry`], parses the
//! response and compares it with the expected configuration. Rules never
//! share state: every call yields an independent [`RuleOutcome`], and probe
//! or parse failures become diagnostics rather than errors.

pub mod absence;
pub mod mount;
pub mod persistence;
pub mod size;
pub mod validity;

use storage_sys::SystemInquiry;
use storage_types::{ExpectedConfiguration, RuleOutcome};

use crate::error::CheckFailure;

pub use absence::{FstabAbsenceRule, MountAbsenceRule};
pub use mount::MountRule;
pub use persistence::FilesystemPersistenceRule;
pub use size::SizeRule;
pub use validity::ConfigurationValidityRule;

pub trait VerificationRule {
    fn name(&self) -> &'static str;

    /// Probe, parse and compare. Always returns an outcome.
    fn check(&self, expected: &ExpectedConfiguration, inquiry: &dyn SystemInquiry)
    -> RuleOutcome;
}

/// Build an outcome from the failed checks of one rule.
pub(crate) fn outcome(rule_name: &str, failures: Vec<CheckFailure>) -> RuleOutcome {
    RuleOutcome::from_diagnostics(
        rule_name,
        failures.iter().map(ToString::to_string).collect(),
    )
}

/// Mount points compare equal regardless of a trailing slash.
pub(crate) fn normalize_mount_point(mount_point: &str) -> &str {
    match mount_point.trim_end_matches('/') {
        "" if mount_point.starts_with('/') => "/",
        trimmed => trimmed,
    }
}

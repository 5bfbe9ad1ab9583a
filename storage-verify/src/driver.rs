// SPDX-License-Identifier: GPL-3.0-only

//! State drivers and result aggregation
//!
//! The validity pre-check always runs first. When it passes, the rule set is
//! picked from [`RULE_TABLE`] by desired state and device type, every rule in
//! the set runs, and the outcomes are merged into a [`Report`].

use storage_sys::{MemoizedInquiry, SystemInquiry};
use storage_types::{DesiredState, DeviceType, ExpectedConfiguration, Report, RuleOutcome};
use tracing::{error, info, warn};

use crate::rules::{
    ConfigurationValidityRule, FilesystemPersistenceRule, FstabAbsenceRule, MountAbsenceRule,
    MountRule, SizeRule, VerificationRule,
};

pub struct RuleSet {
    pub state: DesiredState,
    pub device_type: DeviceType,
    pub rules: &'static [&'static dyn VerificationRule],
}

/// Size is governed by the physical disk for disk devices, so only LVM
/// checks it.
pub const RULE_TABLE: &[RuleSet] = &[
    RuleSet {
        state: DesiredState::Present,
        device_type: DeviceType::Lvm,
        rules: &[&MountRule, &FilesystemPersistenceRule, &SizeRule],
    },
    RuleSet {
        state: DesiredState::Present,
        device_type: DeviceType::Disk,
        rules: &[&MountRule, &FilesystemPersistenceRule],
    },
    RuleSet {
        state: DesiredState::Absent,
        device_type: DeviceType::Lvm,
        rules: &[&FstabAbsenceRule, &MountAbsenceRule],
    },
    RuleSet {
        state: DesiredState::Absent,
        device_type: DeviceType::Disk,
        rules: &[&FstabAbsenceRule, &MountAbsenceRule],
    },
];

pub fn rules_for(
    state: DesiredState,
    device_type: DeviceType,
) -> &'static [&'static dyn VerificationRule] {
    RULE_TABLE
        .iter()
        .find(|set| set.state == state && set.device_type == device_type)
        .map(|set| set.rules)
        .unwrap_or_default()
}

/// Runs verification against live state reachable through `inquiry`.
pub struct Verifier<I> {
    inquiry: I,
}

impl<I: SystemInquiry> Verifier<I> {
    pub fn new(inquiry: I) -> Self {
        Self { inquiry }
    }

    /// Outcomes of every rule that ran, validity first.
    ///
    /// Probe results are memoized for this call only; a later call probes
    /// afresh.
    pub fn outcomes(&self, expected: &ExpectedConfiguration) -> Vec<RuleOutcome> {
        let inquiry = MemoizedInquiry::new(&self.inquiry);

        let validity = ConfigurationValidityRule.check(expected, &inquiry);
        if !validity.passed {
            for diagnostic in &validity.diagnostics {
                error!(%diagnostic, "invalid expected configuration; skipping probes");
            }
            return vec![validity];
        }

        let state = expected.desired_state();
        let device_type = expected.device_type();
        info!(
            state = state.as_str(),
            device_type = device_type.as_str(),
            "verifying storage configuration"
        );

        let mut outcomes = vec![validity];
        for rule in rules_for(state, device_type) {
            let outcome = rule.check(expected, &inquiry);
            if outcome.passed {
                info!(rule = %outcome.rule_name, "rule passed");
            } else {
                for diagnostic in &outcome.diagnostics {
                    warn!(rule = %outcome.rule_name, %diagnostic, "rule failed");
                }
            }
            outcomes.push(outcome);
        }
        outcomes
    }

    pub fn verify(&self, expected: &ExpectedConfiguration) -> Report {
        let report = Report::from_outcomes(&self.outcomes(expected));
        info!(
            passed = report.total_passed,
            total = report.total_rules_run,
            overall_pass = report.overall_pass,
            "verification finished"
        );
        report
    }
}

/// Human-readable summary of a report.
pub fn render_text(report: &Report) -> String {
    let mut text = format!(
        "> Testing results: {}/{} total\n",
        report.total_passed, report.total_rules_run
    );
    for failure in &report.failures {
        text.push_str(&format!("  FAILED: {failure}\n"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(rules: &[&dyn VerificationRule]) -> Vec<&'static str> {
        rules.iter().map(|rule| rule.name()).collect()
    }

    #[test]
    fn present_lvm_runs_all_three_rules() {
        assert_eq!(
            names(rules_for(DesiredState::Present, DeviceType::Lvm)),
            vec!["mount", "filesystem_persistence", "size"]
        );
    }

    #[test]
    fn present_disk_skips_size() {
        assert_eq!(
            names(rules_for(DesiredState::Present, DeviceType::Disk)),
            vec!["mount", "filesystem_persistence"]
        );
    }

    #[test]
    fn absent_runs_absence_rules() {
        for device_type in [DeviceType::Disk, DeviceType::Lvm] {
            assert_eq!(
                names(rules_for(DesiredState::Absent, device_type)),
                vec!["fstab_absence", "mount_absence"]
            );
        }
    }

    #[test]
    fn renders_failures_one_per_line() {
        let report = Report::from_outcomes(&[
            RuleOutcome::pass("mount"),
            RuleOutcome::from_diagnostics("size", vec!["size mismatch".to_string()]),
        ]);
        assert_eq!(
            render_text(&report),
            "> Testing results: 1/2 total\n  FAILED: size mismatch\n"
        );
    }
}

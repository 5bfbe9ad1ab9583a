// SPDX-License-Identifier: GPL-3.0-only

//! Verification outcomes

use serde::{Deserialize, Serialize};

/// Result of a single verification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleOutcome {
    pub rule_name: String,
    pub passed: bool,
    /// One entry per failed check, in the order the rule found them
    pub diagnostics: Vec<String>,
}

impl RuleOutcome {
    pub fn pass(rule_name: impl Into<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            passed: true,
            diagnostics: Vec::new(),
        }
    }

    /// An outcome that passes iff `diagnostics` is empty.
    pub fn from_diagnostics(rule_name: impl Into<String>, diagnostics: Vec<String>) -> Self {
        Self {
            rule_name: rule_name.into(),
            passed: diagnostics.is_empty(),
            diagnostics,
        }
    }
}

/// Final verification report, serialized with the field names the
/// automation layer expects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    #[serde(rename = "num_tests")]
    pub total_rules_run: usize,
    #[serde(rename = "num_successes")]
    pub total_passed: usize,
    #[serde(rename = "tests_failed")]
    pub failures: Vec<String>,
    pub overall_pass: bool,
}

impl Report {
    /// Merge rule outcomes into a report. Diagnostics are flattened in
    /// rule order.
    pub fn from_outcomes(outcomes: &[RuleOutcome]) -> Self {
        let total_passed = outcomes.iter().filter(|outcome| outcome.passed).count();
        let failures: Vec<String> = outcomes
            .iter()
            .flat_map(|outcome| outcome.diagnostics.iter().cloned())
            .collect();

        Self {
            total_rules_run: outcomes.len(),
            total_passed,
            overall_pass: total_passed == outcomes.len() && failures.is_empty(),
            failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_outcomes() {
        let report = Report::from_outcomes(&[
            RuleOutcome::pass("mount"),
            RuleOutcome::from_diagnostics("size", vec!["size mismatch".to_string()]),
        ]);
        assert_eq!(report.total_rules_run, 2);
        assert_eq!(report.total_passed, 1);
        assert_eq!(report.failures, vec!["size mismatch".to_string()]);
        assert!(!report.overall_pass);
    }

    #[test]
    fn serializes_with_automation_field_names() {
        let report = Report::from_outcomes(&[RuleOutcome::pass("mount")]);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["num_tests"], 1);
        assert_eq!(json["num_successes"], 1);
        assert_eq!(json["tests_failed"], serde_json::json!([]));
        assert_eq!(json["overall_pass"], true);
    }
}

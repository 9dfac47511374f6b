//! Test execution engine.

use crate::diff;
use crate::exec::execute_fixture_case;
use crate::fixtures::{FixtureCase, FixtureSet};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
    /// Mode being tested (strict or hardened).
    pub mode: String,
}

impl TestRunner {
    /// Create a new test runner.
    #[must_use]
    pub fn new(campaign: impl Into<String>, mode: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
            mode: mode.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .filter(|case| mode_matches(&self.mode, &case.mode))
            .map(|case| {
                let (actual, diff) = execute_case(case, &self.mode);
                let case_name = if case.mode.eq_ignore_ascii_case("both") {
                    format!("{} [{}]", case.name, self.mode)
                } else {
                    case.name.clone()
                };
                VerificationResult {
                    case_name,
                    family: fixture_set.family.clone(),
                    symbol: case.symbol.clone(),
                    mode: self.mode.clone(),
                    property: case.property.clone(),
                    passed: actual == case.expected_output,
                    expected: case.expected_output.clone(),
                    actual,
                    diff,
                }
            })
            .collect()
    }
}

fn mode_matches(active_mode: &str, case_mode: &str) -> bool {
    let active = active_mode.to_ascii_lowercase();
    let case = case_mode.to_ascii_lowercase();
    case == active || case == "both"
}

fn execute_case(case: &FixtureCase, active_mode: &str) -> (String, Option<String>) {
    // Fixture cases with mode=both execute under the runner's active mode.
    let execution = execute_fixture_case(&case.symbol, &case.inputs, active_mode);
    match execution {
        Ok(run) => {
            let mut notes = Vec::new();
            if active_mode.eq_ignore_ascii_case("strict") && !run.host_parity {
                notes.push(format!(
                    "strict host parity mismatch: host={}, impl={}",
                    run.host_output, run.impl_output
                ));
            }
            if let Some(note) = run.note.clone() {
                notes.push(note);
            }

            let mut diff_out = None;
            if run.impl_output != case.expected_output {
                diff_out = Some(diff::render_diff(&case.expected_output, &run.impl_output));
            } else if !notes.is_empty() {
                diff_out = Some(notes.join("\n"));
            }

            (run.impl_output, diff_out)
        }
        Err(err) => {
            let actual = format!("unsupported:{err}");
            let diff_out = Some(diff::render_diff(&case.expected_output, &actual));
            (actual, diff_out)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;

    #[test]
    fn strict_runner_executes_matching_cases() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"chars",
                "captured_at":"2026-08-20T00:00:00Z",
                "cases":[
                    {"name":"digit_five","symbol":"is_digit","property":"digit range","inputs":{"c":53},"expected_output":"1","mode":"strict"},
                    {"name":"lower_a","symbol":"is_lower","property":"lowercase range","inputs":{"c":97},"expected_output":"1","mode":"hardened"}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let strict = TestRunner::new("smoke", "strict").run(&fixture);
        assert_eq!(strict.len(), 1);
        assert!(strict[0].passed);
        assert_eq!(strict[0].symbol, "is_digit");
    }

    #[test]
    fn hardened_runner_executes_matching_cases() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"chars",
                "captured_at":"2026-08-20T00:00:00Z",
                "cases":[
                    {"name":"upper_a","symbol":"is_upper","property":"uppercase range","inputs":{"c":65},"expected_output":"1","mode":"strict"},
                    {"name":"upper_at","symbol":"is_upper","property":"uppercase range","inputs":{"c":64},"expected_output":"0","mode":"hardened"}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let hardened = TestRunner::new("smoke", "hardened").run(&fixture);
        assert_eq!(hardened.len(), 1);
        assert!(hardened[0].passed);
        assert_eq!(hardened[0].case_name, "upper_at");
    }

    #[test]
    fn both_mode_fixture_executes_under_active_mode() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"chars",
                "captured_at":"2026-08-20T00:00:00Z",
                "cases":[
                    {"name":"ord_a","symbol":"char_ord","property":"ordinal identity","inputs":{"c":65},"expected_output":"65","mode":"both"}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let strict = TestRunner::new("both", "strict").run(&fixture);
        assert_eq!(strict.len(), 1);
        assert!(strict[0].passed);
        assert_eq!(strict[0].case_name, "ord_a [strict]");

        let hardened = TestRunner::new("both", "hardened").run(&fixture);
        assert_eq!(hardened.len(), 1);
        assert!(hardened[0].passed);
        assert_eq!(hardened[0].case_name, "ord_a [hardened]");
    }

    #[test]
    fn unsupported_symbol_fails_with_diff() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"chars",
                "captured_at":"2026-08-20T00:00:00Z",
                "cases":[
                    {"name":"not_exported","symbol":"strlen","property":"n/a","inputs":{},"expected_output":"1","mode":"strict"}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("smoke", "strict").run(&fixture);
        assert_eq!(results.len(), 1);
        assert!(!results[0].passed);
        assert!(results[0].actual.starts_with("unsupported:"));
        assert!(results[0].diff.is_some());
    }

    #[test]
    fn cons_fixture_passes_through_runner() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"seq",
                "captured_at":"2026-08-20T00:00:00Z",
                "cases":[
                    {"name":"cons_xyz","symbol":"string_cons","property":"prepend with copied tail","inputs":{"head":120,"tail":[121,122]},"expected_output":"[120, 121, 122]","mode":"both"}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("smoke", "strict").run(&fixture);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "diff: {:?}", results[0].diff);
    }
}

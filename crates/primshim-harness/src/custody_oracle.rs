//! Custody misuse oracle.
//!
//! Stages boundary misuse through the safe drivers and checks the observed
//! outcome against per-mode expectations. The return value of the staged
//! call is the primary signal; the repair policy counters corroborate it.
//! Counters are global and monotonic, so the checks compare against a
//! snapshot taken just before the staged call.

use primshim_abi::driver;
use primshim_ledger::{PolicySnapshot, SafetyLevel, global_repair_policy, safety_level};
use serde::{Deserialize, Serialize};

/// Misuse condition staged against the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MisuseCondition {
    /// Cons with a null input sequence.
    NullInput,
    /// Cons from a sequence the boundary already released.
    ReleasedInput,
    /// Cons from a shim-owned sequence whose terminator was overwritten.
    UnterminatedInput,
    /// Release of a null pointer.
    NullRelease,
    /// Release of the same allocation twice.
    DoubleRelease,
    /// Release of an address the shim never allocated.
    ForeignRelease,
}

/// An oracle test that stages a specific misuse condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustodyOracleCase {
    /// Test identifier.
    pub id: String,
    /// The misuse condition being staged.
    pub condition: MisuseCondition,
    /// Expected outcome label in strict mode.
    pub strict_expected: String,
    /// Expected outcome label in hardened mode.
    pub hardened_expected: String,
}

impl CustodyOracleCase {
    /// Expected outcome label for a safety level. Off mode rejects the same
    /// conditions strict does, so it reads the strict column.
    #[must_use]
    pub fn expected_for(&self, level: SafetyLevel) -> &str {
        match level {
            SafetyLevel::Hardened => &self.hardened_expected,
            _ => &self.strict_expected,
        }
    }
}

/// Collection of oracle cases.
#[derive(Debug, Default)]
pub struct CustodyOracleSuite {
    cases: Vec<CustodyOracleCase>,
}

impl CustodyOracleSuite {
    /// Create a new empty suite.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a test case.
    pub fn add(&mut self, case: CustodyOracleCase) {
        self.cases.push(case);
    }

    /// Get all cases.
    #[must_use]
    pub fn cases(&self) -> &[CustodyOracleCase] {
        &self.cases
    }

    /// The canonical suite covering every misuse condition.
    #[must_use]
    pub fn builtin() -> Self {
        let mut suite = Self::new();
        suite.add(CustodyOracleCase {
            id: String::from("null-input"),
            condition: MisuseCondition::NullInput,
            strict_expected: String::from("reject:null_sequence"),
            hardened_expected: String::from("heal:substitute_empty"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("released-input"),
            condition: MisuseCondition::ReleasedInput,
            strict_expected: String::from("reject:released_sequence"),
            hardened_expected: String::from("reject:released_sequence"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("unterminated-input"),
            condition: MisuseCondition::UnterminatedInput,
            strict_expected: String::from("reject:unterminated_sequence"),
            hardened_expected: String::from("heal:truncate_scan"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("null-release"),
            condition: MisuseCondition::NullRelease,
            strict_expected: String::from("ignored:null"),
            hardened_expected: String::from("ignored:null"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("double-release"),
            condition: MisuseCondition::DoubleRelease,
            strict_expected: String::from("heal:ignore_double_release"),
            hardened_expected: String::from("heal:ignore_double_release"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("foreign-release"),
            condition: MisuseCondition::ForeignRelease,
            strict_expected: String::from("heal:ignore_foreign_release"),
            hardened_expected: String::from("heal:ignore_foreign_release"),
        });
        suite
    }
}

/// Outcome of staging one oracle case under the live mode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleOutcome {
    pub id: String,
    pub expected: String,
    pub observed: String,
    pub passed: bool,
}

/// Run every case in a suite under the live process mode.
#[must_use]
pub fn run_suite(suite: &CustodyOracleSuite) -> Vec<OracleOutcome> {
    let level = safety_level();
    suite
        .cases()
        .iter()
        .map(|case| run_case(case, level))
        .collect()
}

fn run_case(case: &CustodyOracleCase, level: SafetyLevel) -> OracleOutcome {
    let expected = case.expected_for(level).to_string();

    // Released and unterminated staging needs the custody check live.
    let needs_validation = matches!(
        case.condition,
        MisuseCondition::ReleasedInput | MisuseCondition::UnterminatedInput
    );
    if needs_validation && !level.validation_enabled() {
        return OracleOutcome {
            id: case.id.clone(),
            expected,
            observed: String::from("skipped:validation_off"),
            passed: false,
        };
    }

    let before = global_repair_policy().snapshot();
    let observed = stage_and_interpret(case.condition, &before);
    OracleOutcome {
        id: case.id.clone(),
        passed: observed == expected,
        expected,
        observed,
    }
}

fn stage_and_interpret(condition: MisuseCondition, before: &PolicySnapshot) -> String {
    match condition {
        MisuseCondition::NullInput => match driver::run_cons_null(b'q') {
            Some(bytes) if bytes == b"q" => corroborate(
                "heal:substitute_empty",
                counter_moved(before, |s| s.substituted_empties),
            ),
            Some(bytes) => format!("unexpected:output {bytes:?}"),
            None => corroborate(
                "reject:null_sequence",
                counter_moved(before, |s| s.null_rejects),
            ),
        },
        MisuseCondition::ReleasedInput => match driver::run_cons_after_release(b'q') {
            Some(bytes) => format!("unexpected:output {bytes:?}"),
            None => corroborate(
                "reject:released_sequence",
                counter_moved(before, |s| s.released_rejects),
            ),
        },
        MisuseCondition::UnterminatedInput => match driver::run_cons_unterminated(b'q') {
            Some(_) => corroborate(
                "heal:truncate_scan",
                counter_moved(before, |s| s.truncated_scans),
            ),
            None => corroborate(
                "reject:unterminated_sequence",
                counter_moved(before, |s| s.unterminated_rejects),
            ),
        },
        MisuseCondition::NullRelease => {
            driver::run_release_null();
            String::from("ignored:null")
        }
        MisuseCondition::DoubleRelease => {
            driver::run_release_double();
            corroborate(
                "heal:ignore_double_release",
                counter_moved(before, |s| s.double_releases),
            )
        }
        MisuseCondition::ForeignRelease => {
            driver::run_release_foreign();
            corroborate(
                "heal:ignore_foreign_release",
                counter_moved(before, |s| s.foreign_releases),
            )
        }
    }
}

fn counter_moved(before: &PolicySnapshot, field: fn(&PolicySnapshot) -> u64) -> bool {
    let after = global_repair_policy().snapshot();
    field(&after) >= field(before) + 1
}

fn corroborate(label: &str, counted: bool) -> String {
    if counted {
        label.to_string()
    } else {
        format!("unexpected:{label} without counter")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_suite_covers_every_condition() {
        let suite = CustodyOracleSuite::builtin();
        assert_eq!(suite.cases().len(), 6);
        let conditions: Vec<MisuseCondition> =
            suite.cases().iter().map(|c| c.condition).collect();
        assert!(conditions.contains(&MisuseCondition::NullInput));
        assert!(conditions.contains(&MisuseCondition::ForeignRelease));
    }

    #[test]
    fn expectations_follow_safety_level() {
        let case = CustodyOracleCase {
            id: String::from("null-input"),
            condition: MisuseCondition::NullInput,
            strict_expected: String::from("reject:null_sequence"),
            hardened_expected: String::from("heal:substitute_empty"),
        };
        assert_eq!(
            case.expected_for(SafetyLevel::Strict),
            "reject:null_sequence"
        );
        assert_eq!(
            case.expected_for(SafetyLevel::Hardened),
            "heal:substitute_empty"
        );
        assert_eq!(case.expected_for(SafetyLevel::Off), "reject:null_sequence");
    }

    #[test]
    fn release_misuse_cases_pass_in_any_mode() {
        let mut suite = CustodyOracleSuite::new();
        suite.add(CustodyOracleCase {
            id: String::from("double-release"),
            condition: MisuseCondition::DoubleRelease,
            strict_expected: String::from("heal:ignore_double_release"),
            hardened_expected: String::from("heal:ignore_double_release"),
        });
        suite.add(CustodyOracleCase {
            id: String::from("null-release"),
            condition: MisuseCondition::NullRelease,
            strict_expected: String::from("ignored:null"),
            hardened_expected: String::from("ignored:null"),
        });

        for outcome in run_suite(&suite) {
            assert!(
                outcome.passed,
                "{}: expected {}, observed {}",
                outcome.id, outcome.expected, outcome.observed
            );
        }
    }
}

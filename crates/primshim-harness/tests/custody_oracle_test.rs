//! Custody misuse staging against the live boundary mode.
//!
//! Validates:
//! 1. The built-in oracle suite's expectations match observed behavior.
//! 2. Release misuse is absorbed and counted in every mode.
//! 3. Per-mode expectation lookup follows the live safety level.
//!
//! Run: cargo test -p primshim-harness --test custody_oracle_test

use primshim_harness::custody_oracle::{
    CustodyOracleCase, CustodyOracleSuite, MisuseCondition, run_suite,
};
use primshim_ledger::{SafetyLevel, safety_level};

#[test]
fn builtin_suite_matches_live_mode() {
    if !safety_level().validation_enabled() {
        return;
    }
    let outcomes = run_suite(&CustodyOracleSuite::builtin());
    assert_eq!(outcomes.len(), 6);
    for outcome in &outcomes {
        assert!(
            outcome.passed,
            "{}: expected {}, observed {}",
            outcome.id, outcome.expected, outcome.observed
        );
    }
}

#[test]
fn release_misuse_absorbed_in_any_mode() {
    let mut suite = CustodyOracleSuite::new();
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

#[test]
fn null_input_outcome_matches_live_level() {
    let suite = {
        let mut s = CustodyOracleSuite::new();
        s.add(CustodyOracleCase {
            id: String::from("null-input"),
            condition: MisuseCondition::NullInput,
            strict_expected: String::from("reject:null_sequence"),
            hardened_expected: String::from("heal:substitute_empty"),
        });
        s
    };
    let outcomes = run_suite(&suite);
    assert_eq!(outcomes.len(), 1);
    assert!(
        outcomes[0].passed,
        "expected {}, observed {}",
        outcomes[0].expected, outcomes[0].observed
    );
}

#[test]
fn expectations_follow_safety_level() {
    let case = CustodyOracleCase {
        id: String::from("unterminated-input"),
        condition: MisuseCondition::UnterminatedInput,
        strict_expected: String::from("reject:unterminated_sequence"),
        hardened_expected: String::from("heal:truncate_scan"),
    };
    assert_eq!(
        case.expected_for(SafetyLevel::Strict),
        "reject:unterminated_sequence"
    );
    assert_eq!(
        case.expected_for(SafetyLevel::Hardened),
        "heal:truncate_scan"
    );
    assert_eq!(
        case.expected_for(SafetyLevel::Off),
        "reject:unterminated_sequence"
    );
}

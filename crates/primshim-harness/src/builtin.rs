//! Built-in fixture suites for the exported boundary.
//!
//! Three families: `chars` pins the classifier ranges with concrete anchors
//! and the byte neighbors on each side of every range, `seq` pins cons
//! semantics, and `custody` pins the per-mode misuse outcomes. The
//! `capture` subcommand writes these to disk as the canonical reference.

use serde_json::json;

use crate::fixtures::{FIXTURE_SCHEMA_VERSION, FixtureCase, FixtureSet};

fn classifier_case(name: &str, symbol: &str, property: &str, c: u8, expected: i32) -> FixtureCase {
    FixtureCase {
        name: name.to_string(),
        symbol: symbol.to_string(),
        property: property.to_string(),
        inputs: json!({ "c": c }),
        expected_output: expected.to_string(),
        mode: String::from("both"),
    }
}

fn set(family: &str, captured_at: &str, cases: Vec<FixtureCase>) -> FixtureSet {
    FixtureSet {
        version: FIXTURE_SCHEMA_VERSION.to_string(),
        family: family.to_string(),
        captured_at: captured_at.to_string(),
        cases,
    }
}

/// Classifier anchors and range neighbors.
#[must_use]
pub fn classifier_fixture_set(captured_at: &str) -> FixtureSet {
    let ord = "ordinal identity";
    let digit = "digit range closure";
    let lower = "lowercase range closure";
    let upper = "uppercase range closure";
    let union = "alphanumeric union";
    let cases = vec![
        classifier_case("ord_capital_a", "char_ord", ord, b'A', 65),
        classifier_case("ord_nul", "char_ord", ord, 0x00, 0),
        classifier_case("ord_del", "char_ord", ord, 0x7F, 127),
        classifier_case("ord_high_bit", "char_ord", ord, 0x80, 128),
        classifier_case("ord_top", "char_ord", ord, 0xFF, 255),
        classifier_case("digit_five", "is_digit", digit, b'5', 1),
        classifier_case("digit_zero", "is_digit", digit, b'0', 1),
        classifier_case("digit_nine", "is_digit", digit, b'9', 1),
        classifier_case("digit_slash_neighbor", "is_digit", digit, b'/', 0),
        classifier_case("digit_colon_neighbor", "is_digit", digit, b':', 0),
        classifier_case("lower_a", "is_lower", lower, b'a', 1),
        classifier_case("lower_z", "is_lower", lower, b'z', 1),
        classifier_case("lower_backtick_neighbor", "is_lower", lower, b'`', 0),
        classifier_case("lower_brace_neighbor", "is_lower", lower, b'{', 0),
        classifier_case("upper_a", "is_upper", upper, b'A', 1),
        classifier_case("upper_z", "is_upper", upper, b'Z', 1),
        classifier_case("upper_at_neighbor", "is_upper", upper, b'@', 0),
        classifier_case("upper_bracket_neighbor", "is_upper", upper, b'[', 0),
        classifier_case("alnum_digit", "is_alphanum", union, b'5', 1),
        classifier_case("alnum_lower", "is_alphanum", union, b'a', 1),
        classifier_case("alnum_upper", "is_alphanum", union, b'A', 1),
        classifier_case("alnum_space", "is_alphanum", union, b' ', 0),
        classifier_case("alnum_high_bit", "is_alphanum", union, 0x80, 0),
        classifier_case("alnum_top", "is_alphanum", union, 0xFF, 0),
    ];
    set("chars", captured_at, cases)
}

/// Cons semantics over valid inputs, plus a valid release.
#[must_use]
pub fn cons_fixture_set(captured_at: &str) -> FixtureSet {
    let prepend = "prepend with copied tail";
    let cases = vec![
        FixtureCase {
            name: String::from("cons_xyz"),
            symbol: String::from("string_cons"),
            property: prepend.to_string(),
            inputs: json!({ "head": 120, "tail": [121, 122] }),
            expected_output: String::from("[120, 121, 122]"),
            mode: String::from("both"),
        },
        FixtureCase {
            name: String::from("cons_empty_tail"),
            symbol: String::from("string_cons"),
            property: prepend.to_string(),
            inputs: json!({ "head": 113, "tail": [] }),
            expected_output: String::from("[113]"),
            mode: String::from("both"),
        },
        FixtureCase {
            name: String::from("cons_single"),
            symbol: String::from("string_cons"),
            property: prepend.to_string(),
            inputs: json!({ "head": 97, "tail": [98] }),
            expected_output: String::from("[97, 98]"),
            mode: String::from("both"),
        },
        FixtureCase {
            name: String::from("cons_word"),
            symbol: String::from("string_cons"),
            property: prepend.to_string(),
            inputs: json!({ "head": 104, "tail": [101, 108, 108, 111] }),
            expected_output: String::from("[104, 101, 108, 108, 111]"),
            mode: String::from("both"),
        },
        FixtureCase {
            name: String::from("cons_high_bytes"),
            symbol: String::from("string_cons"),
            property: String::from("byte transparency"),
            inputs: json!({ "head": 255, "tail": [128, 127] }),
            expected_output: String::from("[255, 128, 127]"),
            mode: String::from("both"),
        },
        FixtureCase {
            name: String::from("free_valid"),
            symbol: String::from("string_free"),
            property: String::from("owned release"),
            inputs: json!({ "scenario": "valid" }),
            expected_output: String::from("released"),
            mode: String::from("both"),
        },
    ];
    set("seq", captured_at, cases)
}

/// Custody misuse outcomes, pinned per mode.
#[must_use]
pub fn custody_fixture_set(captured_at: &str) -> FixtureSet {
    fn cons_case(name: &str, inputs: serde_json::Value, expected: &str, mode: &str) -> FixtureCase {
        FixtureCase {
            name: name.to_string(),
            symbol: String::from("string_cons"),
            property: String::from("boundary custody"),
            inputs,
            expected_output: expected.to_string(),
            mode: mode.to_string(),
        }
    }
    fn free_case(name: &str, scenario: &str) -> FixtureCase {
        FixtureCase {
            name: name.to_string(),
            symbol: String::from("string_free"),
            property: String::from("release custody"),
            inputs: json!({ "scenario": scenario }),
            expected_output: String::from("absorbed"),
            mode: String::from("both"),
        }
    }

    let cases = vec![
        cons_case(
            "null_input_rejected",
            json!({ "head": 113, "tail": null }),
            "null",
            "strict",
        ),
        cons_case(
            "null_input_substituted",
            json!({ "head": 113, "tail": null }),
            "[113]",
            "hardened",
        ),
        cons_case(
            "released_input_rejected",
            json!({ "head": 113, "scenario": "released" }),
            "null",
            "strict",
        ),
        cons_case(
            "released_input_still_rejected",
            json!({ "head": 113, "scenario": "released" }),
            "null",
            "hardened",
        ),
        cons_case(
            "unterminated_input_rejected",
            json!({ "head": 120, "scenario": "unterminated" }),
            "null",
            "strict",
        ),
        cons_case(
            "unterminated_input_truncated",
            json!({ "head": 120, "scenario": "unterminated" }),
            "[120, 97, 98, 33]",
            "hardened",
        ),
        free_case("free_null_absorbed", "null"),
        free_case("free_foreign_absorbed", "foreign"),
        free_case("free_double_absorbed", "double"),
    ];
    set("custody", captured_at, cases)
}

/// Every built-in fixture set.
#[must_use]
pub fn all_fixture_sets(captured_at: &str) -> Vec<FixtureSet> {
    vec![
        classifier_fixture_set(captured_at),
        cons_fixture_set(captured_at),
        custody_fixture_set(captured_at),
    ]
}

/// Fixture sets for a named family, or None for an unknown family.
#[must_use]
pub fn sets_for_family(family: &str, captured_at: &str) -> Option<Vec<FixtureSet>> {
    match family.trim().to_ascii_lowercase().as_str() {
        "chars" => Some(vec![classifier_fixture_set(captured_at)]),
        "seq" => Some(vec![cons_fixture_set(captured_at)]),
        "custody" => Some(vec![custody_fixture_set(captured_at)]),
        "all" => Some(all_fixture_sets(captured_at)),
        _ => None,
    }
}

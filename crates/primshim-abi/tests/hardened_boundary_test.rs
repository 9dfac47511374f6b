//! Integration test: hardened-mode boundary behavior.
//!
//! Validates that with `PRIMSHIM_MODE=hardened`:
//! 1. Valid cons input round-trips exactly as in strict mode.
//! 2. Null input is repaired to the empty sequence and counted.
//! 3. A scan that exhausts the recorded extent is truncated and counted.
//! 4. Cons from a released sequence is still rejected (content is gone;
//!    repairing would fabricate data).
//! 5. Release misuse is absorbed the same as in strict mode.
//!
//! Run: cargo test -p primshim-abi --test hardened_boundary_test

use std::sync::Once;

use primshim_abi::driver;
use primshim_ledger::{SafetyLevel, global_repair_policy, safety_level};

fn pin_hardened_mode() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        // SAFETY: call_once blocks every other test until this closure is
        // done; nothing reads the variable before then.
        unsafe { std::env::set_var("PRIMSHIM_MODE", "hardened") };
        // Resolve the level cache while the other tests are still blocked.
        let _ = safety_level();
    });
    assert_eq!(safety_level(), SafetyLevel::Hardened);
}

#[test]
fn valid_cons_round_trips() {
    pin_hardened_mode();
    assert_eq!(driver::run_cons(b'x', b"yz"), Some(b"xyz".to_vec()));
    assert_eq!(driver::run_cons(b'h', b""), Some(b"h".to_vec()));
}

#[test]
fn null_input_is_repaired_to_empty() {
    pin_hardened_mode();
    let before = global_repair_policy().snapshot();
    assert_eq!(driver::run_cons_null(b'x'), Some(b"x".to_vec()));
    let after = global_repair_policy().snapshot();
    assert!(after.substituted_empties >= before.substituted_empties + 1);
    assert_eq!(after.null_rejects, before.null_rejects);
}

#[test]
fn unterminated_input_is_truncated_at_extent() {
    pin_hardened_mode();
    let before = global_repair_policy().snapshot();
    // Staged sequence is "ab" with its terminator overwritten by '!':
    // the scan truncates at the 3-byte recorded extent.
    assert_eq!(driver::run_cons_unterminated(b'x'), Some(b"xab!".to_vec()));
    let after = global_repair_policy().snapshot();
    assert!(after.truncated_scans >= before.truncated_scans + 1);
}

#[test]
fn released_input_is_still_rejected() {
    pin_hardened_mode();
    let before = global_repair_policy().snapshot();
    assert_eq!(driver::run_cons_after_release(b'x'), None);
    let after = global_repair_policy().snapshot();
    assert!(after.released_rejects >= before.released_rejects + 1);
}

#[test]
fn release_misuse_is_absorbed() {
    pin_hardened_mode();
    let before = global_repair_policy().snapshot();
    driver::run_release_foreign();
    driver::run_release_double();
    let after = global_repair_policy().snapshot();
    assert!(after.foreign_releases >= before.foreign_releases + 1);
    assert!(after.double_releases >= before.double_releases + 1);
}

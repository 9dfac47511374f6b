//! ABI layer for sequence construction and release.
//!
//! `string_cons` is the one entry point that reads through a raw pointer, so
//! the full validation pipeline lives here:
//! 1. Classify the input pointer against the custody ledger.
//! 2. Obtain a verdict for the active safety level; reject (null return) or
//!    repair (counted) invalid input.
//! 3. Scan to the terminator, bounded by the recorded extent when the input
//!    is shim-owned.
//! 4. Build the output through `primshim_core::seq` and hand back a tracked,
//!    NUL-terminated allocation.
//!
//! `string_free` completes the ownership story: output sequences belong to
//! the caller and come back here for release. Null, foreign, and double
//! releases are absorbed and counted; only a live ledger base reaches the
//! allocator.
//!
//! Custody recording stays on even with validation off: release always needs
//! the recorded extent to rebuild the allocation layout.

use std::ffi::{c_char, c_void};

use primshim_core::seq;
use primshim_ledger::{
    Disposition, ReleaseVerdict, RepairAction, SequenceFacts, classify_sequence,
    classify_sequence_base, decide_cons, decide_release, decide_scan_overrun, global_ledger,
    global_repair_policy, safety_level,
};

use crate::util::scan_c_string;

/// Allocate a tracked buffer of `total` bytes and record it in the ledger.
///
/// Returns null when the allocator refuses or the size is unrepresentable.
fn tracked_alloc(total: usize) -> *mut u8 {
    let Ok(layout) = std::alloc::Layout::array::<u8>(total) else {
        return std::ptr::null_mut();
    };
    if layout.size() == 0 {
        return std::ptr::null_mut();
    }
    // SAFETY: layout has non-zero size.
    let ptr = unsafe { std::alloc::alloc(layout) };
    if !ptr.is_null() {
        global_ledger().record(ptr.cast::<c_void>(), total);
    }
    ptr
}

/// Return a tracked buffer to the allocator.
///
/// # Safety
///
/// `base` must be the exact pointer produced by [`tracked_alloc`] for a
/// buffer of `total` bytes that has not been deallocated yet.
unsafe fn tracked_dealloc(base: *mut u8, total: usize) {
    let Ok(layout) = std::alloc::Layout::array::<u8>(total) else {
        return;
    };
    // SAFETY: base/total round-trip from tracked_alloc per caller contract.
    unsafe { std::alloc::dealloc(base, layout) };
}

/// `string_cons` -- returns a fresh sequence holding `c` followed by the
/// bytes of `s`.
///
/// `s` is read once and never written; the caller keeps ownership of it.
/// The returned sequence is NUL-terminated, independently owned, and must be
/// released with [`string_free`]. Returns null when the input is rejected or
/// the allocation fails.
///
/// # Safety
///
/// `s` must be null, a live sequence previously returned by this function,
/// or a NUL-terminated buffer readable up to its terminator. Null and
/// shim-owned misuse are absorbed by the validation pipeline; the
/// terminator contract on untracked input is the caller's.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn string_cons(c: c_char, s: *const c_char) -> *mut c_char {
    let level = safety_level();
    let ledger = global_ledger();
    let policy = global_repair_policy();

    let facts = if level.validation_enabled() {
        classify_sequence(ledger, s.cast::<c_void>())
    } else {
        SequenceFacts::unknown(s as usize)
    };

    let verdict = decide_cons(facts, level);
    let tail: &[u8] = match verdict.disposition {
        Disposition::Reject => {
            policy.record_reject(verdict.reason);
            return std::ptr::null_mut();
        }
        // SubstituteEmpty is the only repair at cons entry.
        Disposition::Heal => {
            policy.record_repair(verdict.repair);
            &[]
        }
        Disposition::Accept => {
            // Shim-owned input is scanned only within its recorded extent;
            // untracked input relies on the caller's terminator contract.
            // SAFETY: s is non-null here (null never reaches Accept) and
            // readable per the function contract.
            let (len, terminated) = unsafe { scan_c_string(s, facts.remaining) };
            if !terminated {
                let overrun = decide_scan_overrun(level);
                if overrun.disposition == Disposition::Reject {
                    policy.record_reject(overrun.reason);
                    return std::ptr::null_mut();
                }
                policy.record_repair(overrun.repair);
            }
            // SAFETY: the scan proved len bytes are readable from s.
            unsafe { std::slice::from_raw_parts(s.cast::<u8>(), len) }
        }
    };

    let built = seq::cons(c as u8, tail);
    let total = built.len() + 1;
    let out = tracked_alloc(total);
    if out.is_null() {
        return std::ptr::null_mut();
    }

    // SAFETY: out is valid for total bytes and built.len() == total - 1.
    unsafe {
        std::ptr::copy_nonoverlapping(built.as_ptr(), out, built.len());
        *out.add(built.len()) = 0;
    }
    out.cast::<c_char>()
}

/// `string_free` -- releases a sequence produced by [`string_cons`].
///
/// Null release is a no-op. Foreign addresses and double releases are
/// ignored and counted; neither ever reaches the allocator.
///
/// # Safety
///
/// None beyond the C calling convention: every pointer value is classified
/// against the ledger before any action, and only exact live bases are
/// deallocated.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn string_free(s: *mut c_char) {
    let ledger = global_ledger();
    let policy = global_repair_policy();

    let facts = classify_sequence_base(ledger, s.cast_const().cast::<c_void>());
    match decide_release(facts) {
        ReleaseVerdict::Proceed => {
            let Some(total) = facts.remaining else {
                return;
            };
            ledger.mark_released(s.cast::<c_void>());
            // SAFETY: s is the recorded base of a live tracked allocation of
            // exactly total bytes.
            unsafe { tracked_dealloc(s.cast::<u8>(), total) };
        }
        ReleaseVerdict::IgnoreNull => {}
        ReleaseVerdict::IgnoreForeign => {
            policy.record_repair(RepairAction::IgnoreForeignRelease);
        }
        ReleaseVerdict::IgnoreDouble => {
            policy.record_repair(RepairAction::IgnoreDoubleRelease);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    fn read_content(ptr: *const c_char) -> Vec<u8> {
        assert!(!ptr.is_null());
        // SAFETY: test pointers come from string_cons, which terminates its
        // output inside the tracked extent.
        unsafe {
            let (len, terminated) = scan_c_string(ptr, None);
            assert!(terminated);
            std::slice::from_raw_parts(ptr.cast::<u8>(), len).to_vec()
        }
    }

    #[test]
    fn cons_prepends_and_terminates() {
        let tail = CString::new("yz").unwrap();
        // SAFETY: valid NUL-terminated input; result released below.
        unsafe {
            let out = string_cons(b'x' as c_char, tail.as_ptr());
            assert_eq!(read_content(out), b"xyz");
            assert_eq!(*out.add(3), 0);
            string_free(out);
        }
    }

    #[test]
    fn cons_onto_empty_sequence() {
        let tail = CString::new("").unwrap();
        // SAFETY: valid input; result released below.
        unsafe {
            let out = string_cons(b'x' as c_char, tail.as_ptr());
            assert_eq!(read_content(out), b"x");
            string_free(out);
        }
    }

    #[test]
    fn cons_leaves_input_unchanged() {
        let tail = CString::new("abc").unwrap();
        // SAFETY: valid input; result released below.
        unsafe {
            let out = string_cons(b'!' as c_char, tail.as_ptr());
            string_free(out);
        }
        assert_eq!(tail.as_bytes(), b"abc");
    }

    #[test]
    fn cons_output_is_tracked_and_live() {
        let tail = CString::new("t").unwrap();
        // SAFETY: valid input; result released below.
        unsafe {
            let out = string_cons(b's' as c_char, tail.as_ptr());
            let meta = global_ledger().lookup_base(out.cast::<c_void>());
            let meta = meta.expect("cons output must be in the ledger");
            // "st" plus terminator.
            assert_eq!(meta.len, 3);
            string_free(out);
        }
    }

    #[test]
    fn cons_chains_through_shim_owned_input() {
        let empty = CString::new("").unwrap();
        // SAFETY: every input is valid; results released below.
        unsafe {
            let inner = string_cons(b'b' as c_char, empty.as_ptr());
            let outer = string_cons(b'a' as c_char, inner.cast_const());
            assert_eq!(read_content(outer), b"ab");
            string_free(outer);
            string_free(inner);
        }
    }

    #[test]
    fn release_ignores_null() {
        // SAFETY: null release is a defined no-op.
        unsafe { string_free(std::ptr::null_mut()) };
    }

    #[test]
    fn double_release_is_absorbed() {
        let tail = CString::new("q").unwrap();
        let policy = global_repair_policy();
        let before = policy.snapshot();
        // SAFETY: valid input; the second release hits the ledger tombstone
        // and never reaches the allocator.
        unsafe {
            let out = string_cons(b'p' as c_char, tail.as_ptr());
            string_free(out);
            string_free(out);
        }
        let after = policy.snapshot();
        assert!(after.double_releases >= before.double_releases + 1);
    }

    #[test]
    fn foreign_release_is_absorbed() {
        let policy = global_repair_policy();
        let before = policy.snapshot();
        let mut local = [b'q' as c_char, 0];
        // SAFETY: foreign addresses are classified and ignored.
        unsafe { string_free(local.as_mut_ptr()) };
        let after = policy.snapshot();
        assert!(after.foreign_releases >= before.foreign_releases + 1);
    }

    #[test]
    fn interior_release_counts_as_foreign() {
        let tail = CString::new("mn").unwrap();
        let policy = global_repair_policy();
        let before = policy.snapshot();
        // SAFETY: valid input; interior pointer is ignored by release; the
        // real base is released afterwards.
        unsafe {
            let out = string_cons(b'l' as c_char, tail.as_ptr());
            string_free(out.add(1));
            string_free(out);
        }
        let after = policy.snapshot();
        assert!(after.foreign_releases >= before.foreign_releases + 1);
    }
}

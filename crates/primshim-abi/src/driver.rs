//! Safe drivers over the exported boundary for harness tooling.
//!
//! The conformance harness forbids unsafe code, so every raw-pointer round
//! trip it needs lives here: running the exported symbols against prepared
//! buffers, staging custody misuse scenarios, and calling the host libc
//! classifiers for differential comparison.

use std::ffi::{CString, c_char, c_int};

use primshim_ledger::safety_level;

use crate::util::scan_c_string;
use crate::{chars_abi, seq_abi};

/// Classifier symbols exported by the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassifierSymbol {
    CharOrd,
    IsDigit,
    IsLower,
    IsUpper,
    IsAlphanum,
}

impl ClassifierSymbol {
    /// Every exported classifier, in export order.
    pub const ALL: [Self; 5] = [
        Self::CharOrd,
        Self::IsDigit,
        Self::IsLower,
        Self::IsUpper,
        Self::IsAlphanum,
    ];

    /// Exported symbol name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CharOrd => "char_ord",
            Self::IsDigit => "is_digit",
            Self::IsLower => "is_lower",
            Self::IsUpper => "is_upper",
            Self::IsAlphanum => "is_alphanum",
        }
    }

    /// Parse an exported symbol name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.name() == name)
    }
}

/// Run one exported classifier on byte `c`.
#[must_use]
pub fn run_classifier(symbol: ClassifierSymbol, c: u8) -> i32 {
    let ch = c as c_char;
    // SAFETY: classifier exports take a plain character value; no pointers.
    unsafe {
        match symbol {
            ClassifierSymbol::CharOrd => chars_abi::char_ord(ch),
            ClassifierSymbol::IsDigit => chars_abi::is_digit(ch),
            ClassifierSymbol::IsLower => chars_abi::is_lower(ch),
            ClassifierSymbol::IsUpper => chars_abi::is_upper(ch),
            ClassifierSymbol::IsAlphanum => chars_abi::is_alphanum(ch),
        }
    }
}

/// Run the host libc counterpart of a classifier, normalized to 0/1.
///
/// `char_ord` has no libc counterpart; its host reference is the byte value
/// itself, which is what a conforming cast produces for unsigned characters.
/// The ctype comparisons assume the default C locale of the test process.
#[must_use]
pub fn run_host_classifier(symbol: ClassifierSymbol, c: u8) -> i32 {
    let v = c_int::from(c);
    // SAFETY: ctype calls are defined for every value representable as
    // unsigned char.
    unsafe {
        match symbol {
            ClassifierSymbol::CharOrd => v,
            ClassifierSymbol::IsDigit => i32::from(libc::isdigit(v) != 0),
            ClassifierSymbol::IsLower => i32::from(libc::islower(v) != 0),
            ClassifierSymbol::IsUpper => i32::from(libc::isupper(v) != 0),
            ClassifierSymbol::IsAlphanum => i32::from(libc::isalnum(v) != 0),
        }
    }
}

/// Read back a boundary result and release it.
///
/// # Safety
///
/// `out` must be null or a live tracked sequence whose terminator is intact.
unsafe fn read_back_and_free(out: *mut c_char) -> Option<Vec<u8>> {
    if out.is_null() {
        return None;
    }
    // SAFETY: string_cons output is NUL-terminated within its tracked extent.
    unsafe {
        let (len, _) = scan_c_string(out.cast_const(), None);
        let bytes = std::slice::from_raw_parts(out.cast::<u8>(), len).to_vec();
        seq_abi::string_free(out);
        Some(bytes)
    }
}

/// Cons `head` onto a NUL-terminated copy of `tail` through the boundary.
///
/// Returns the content bytes of the result (terminator excluded), or None
/// when the boundary returned null. `tail` must not contain a NUL byte.
#[must_use]
pub fn run_cons(head: u8, tail: &[u8]) -> Option<Vec<u8>> {
    let c_tail = CString::new(tail).ok()?;
    // SAFETY: c_tail is valid and NUL-terminated; the result is read within
    // bounds and released.
    unsafe {
        let out = seq_abi::string_cons(head as c_char, c_tail.as_ptr());
        read_back_and_free(out)
    }
}

/// Cons with a null input sequence.
#[must_use]
pub fn run_cons_null(head: u8) -> Option<Vec<u8>> {
    // SAFETY: null input is rejected or substituted before any read.
    unsafe {
        let out = seq_abi::string_cons(head as c_char, std::ptr::null());
        read_back_and_free(out)
    }
}

/// Cons from a sequence the boundary already released.
///
/// Returns None without staging anything when validation is off, because
/// only the custody check makes the scenario safe to run.
#[must_use]
pub fn run_cons_after_release(head: u8) -> Option<Vec<u8>> {
    if !safety_level().validation_enabled() {
        return None;
    }
    // SAFETY: the stale pointer is classified, found released, and rejected
    // before any dereference; only its address is used after the release.
    unsafe {
        let stale = seq_abi::string_cons(b'x' as c_char, c"".as_ptr());
        if stale.is_null() {
            return None;
        }
        seq_abi::string_free(stale);
        let out = seq_abi::string_cons(head as c_char, stale.cast_const());
        read_back_and_free(out)
    }
}

/// Cons from a shim-owned sequence whose terminator was overwritten.
///
/// Models host code scribbling over the NUL of a sequence it received from
/// the boundary. The follow-up scan must stop at the recorded extent.
/// Returns None without staging anything when validation is off.
#[must_use]
pub fn run_cons_unterminated(head: u8) -> Option<Vec<u8>> {
    if !safety_level().validation_enabled() {
        return None;
    }
    // SAFETY: the staged sequence is shim-owned with a recorded extent of 3
    // bytes ("b" content, head byte, terminator); the overwrite stays in
    // bounds and the follow-up scan is bounded by that extent.
    unsafe {
        let staged = seq_abi::string_cons(b'a' as c_char, c"b".as_ptr());
        if staged.is_null() {
            return None;
        }
        *staged.add(2) = b'!' as c_char;
        let out = seq_abi::string_cons(head as c_char, staged.cast_const());
        let result = read_back_and_free(out);
        seq_abi::string_free(staged);
        result
    }
}

/// Release a null pointer through the boundary.
pub fn run_release_null() {
    // SAFETY: null release is a defined no-op.
    unsafe { seq_abi::string_free(std::ptr::null_mut()) };
}

/// Release an address the shim never allocated.
pub fn run_release_foreign() {
    let mut local = [b'q' as c_char, 0];
    // SAFETY: foreign addresses are classified and ignored; the array
    // outlives the call.
    unsafe { seq_abi::string_free(local.as_mut_ptr()) };
}

/// Release the same boundary allocation twice.
pub fn run_release_double() {
    // SAFETY: valid input; the second release hits the ledger tombstone.
    unsafe {
        let out = seq_abi::string_cons(b'x' as c_char, c"".as_ptr());
        if out.is_null() {
            return;
        }
        seq_abi::string_free(out);
        seq_abi::string_free(out);
    }
}

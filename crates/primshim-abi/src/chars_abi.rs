//! ABI layer for character classification and ordinal conversion.
//!
//! Pure compute, no pointers, no custody checks. Each function masks the
//! incoming `c_char` to `u8` so platform signedness never leaks into
//! classification or ordinal results, then delegates to
//! `primshim_core::chars`.

use std::ffi::c_char;

#[inline]
fn classify(c: c_char, f: fn(u8) -> bool) -> i32 {
    i32::from(f(c as u8))
}

/// Numeric code of `c`, always in 0-255 regardless of `c_char` signedness.
#[unsafe(no_mangle)]
pub unsafe extern "C" fn char_ord(c: c_char) -> i32 {
    primshim_core::chars::ord(c as u8)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_digit(c: c_char) -> i32 {
    classify(c, primshim_core::chars::is_digit)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_lower(c: c_char) -> i32 {
    classify(c, primshim_core::chars::is_lower)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_upper(c: c_char) -> i32 {
    classify(c, primshim_core::chars::is_upper)
}

#[unsafe(no_mangle)]
pub unsafe extern "C" fn is_alphanum(c: c_char) -> i32 {
    classify(c, primshim_core::chars::is_alphanum)
}

//! Shared internal utilities for ABI adapters.

use std::ffi::c_char;

/// Scan a NUL-terminated sequence with an optional hard bound.
///
/// Returns `(len, terminated)` where:
/// - `len` is the byte length before the first NUL or before the bound.
/// - `terminated` indicates whether a NUL byte was observed.
///
/// # Safety
///
/// `ptr` must be valid to read up to the discovered length (and bound when
/// given). With no bound the caller must guarantee a NUL exists.
pub unsafe fn scan_c_string(ptr: *const c_char, bound: Option<usize>) -> (usize, bool) {
    match bound {
        Some(limit) => {
            for i in 0..limit {
                if unsafe { *ptr.add(i) } == 0 {
                    return (i, true);
                }
            }
            (limit, false)
        }
        None => {
            let mut i = 0usize;
            while unsafe { *ptr.add(i) } != 0 {
                i += 1;
            }
            (i, true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::CString;

    #[test]
    fn unbounded_scan_stops_at_terminator() {
        let s = CString::new("abc").unwrap();
        // SAFETY: CString guarantees a NUL terminator.
        let (len, terminated) = unsafe { scan_c_string(s.as_ptr(), None) };
        assert_eq!(len, 3);
        assert!(terminated);
    }

    #[test]
    fn bounded_scan_reports_missing_terminator() {
        let buf = [b'x' as c_char; 4];
        // SAFETY: the bound keeps the scan inside the array.
        let (len, terminated) = unsafe { scan_c_string(buf.as_ptr(), Some(buf.len())) };
        assert_eq!(len, 4);
        assert!(!terminated);
    }

    #[test]
    fn bounded_scan_finds_terminator_inside_bound() {
        let buf = [b'a' as c_char, b'b' as c_char, 0, b'z' as c_char];
        // SAFETY: the bound keeps the scan inside the array.
        let (len, terminated) = unsafe { scan_c_string(buf.as_ptr(), Some(buf.len())) };
        assert_eq!(len, 2);
        assert!(terminated);
    }

    #[test]
    fn empty_sequence_scans_to_zero() {
        let buf = [0 as c_char];
        // SAFETY: single NUL byte is readable.
        let (len, terminated) = unsafe { scan_c_string(buf.as_ptr(), None) };
        assert_eq!(len, 0);
        assert!(terminated);
    }
}

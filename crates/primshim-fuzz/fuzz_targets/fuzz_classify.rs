#![no_main]
use libfuzzer_sys::fuzz_target;

use primshim_core::chars::{is_alphanum, is_digit, is_lower, is_upper, ord};

fuzz_target!(|data: &[u8]| {
    for &c in data {
        // Union composition and range closure must hold on every byte.
        assert_eq!(is_alphanum(c), is_digit(c) || is_lower(c) || is_upper(c));
        assert_eq!(is_digit(c), (b'0'..=b'9').contains(&c));
        assert_eq!(is_lower(c), (b'a'..=b'z').contains(&c));
        assert_eq!(is_upper(c), (b'A'..=b'Z').contains(&c));
        assert_eq!(ord(c), i32::from(c));
    }
});

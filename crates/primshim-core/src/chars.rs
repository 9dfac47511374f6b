//! Character classification and ordinal conversion.
//!
//! Byte semantics, ASCII ranges only. The classifiers deliberately do not
//! recognize letters or digits outside ASCII; bytes 128-255 classify as
//! neither digit nor letter. Unicode-aware classification belongs to the
//! host runtime, not these primitives.

/// Returns the numeric code of `c` (0-255).
#[inline]
#[must_use]
pub fn ord(c: u8) -> i32 {
    i32::from(c)
}

/// Returns `true` if `c` is a decimal digit (`[0-9]`).
#[inline]
#[must_use]
pub fn is_digit(c: u8) -> bool {
    c.is_ascii_digit()
}

/// Returns `true` if `c` is a lowercase letter (`[a-z]`).
#[inline]
#[must_use]
pub fn is_lower(c: u8) -> bool {
    c.is_ascii_lowercase()
}

/// Returns `true` if `c` is an uppercase letter (`[A-Z]`).
#[inline]
#[must_use]
pub fn is_upper(c: u8) -> bool {
    c.is_ascii_uppercase()
}

/// Returns `true` if `c` is an alphanumeric character (`[A-Za-z0-9]`).
///
/// Holds exactly when one of [`is_digit`], [`is_lower`], [`is_upper`] holds.
#[inline]
#[must_use]
pub fn is_alphanum(c: u8) -> bool {
    c.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ord() {
        assert_eq!(ord(b'A'), 65);
        assert_eq!(ord(b'a'), 97);
        assert_eq!(ord(b'0'), 48);
        assert_eq!(ord(0), 0);
        assert_eq!(ord(255), 255);
    }

    #[test]
    fn test_is_digit() {
        for c in b'0'..=b'9' {
            assert!(is_digit(c));
        }
        assert!(!is_digit(b'/'));
        assert!(!is_digit(b':'));
        assert!(!is_digit(b'a'));
    }

    #[test]
    fn test_is_lower() {
        for c in b'a'..=b'z' {
            assert!(is_lower(c));
        }
        assert!(!is_lower(b'`'));
        assert!(!is_lower(b'{'));
        assert!(!is_lower(b'A'));
    }

    #[test]
    fn test_is_upper() {
        for c in b'A'..=b'Z' {
            assert!(is_upper(c));
        }
        assert!(!is_upper(b'@'));
        assert!(!is_upper(b'['));
        assert!(!is_upper(b'a'));
    }

    #[test]
    fn test_is_alphanum() {
        assert!(is_alphanum(b'A'));
        assert!(is_alphanum(b'z'));
        assert!(is_alphanum(b'5'));
        assert!(!is_alphanum(b'!'));
        assert!(!is_alphanum(b' '));
        assert!(!is_alphanum(0));
    }

    #[test]
    fn high_bytes_classify_as_nothing() {
        for c in 128u8..=255 {
            assert!(!is_digit(c), "high byte {c} must not be a digit");
            assert!(!is_lower(c), "high byte {c} must not be lowercase");
            assert!(!is_upper(c), "high byte {c} must not be uppercase");
            assert!(!is_alphanum(c), "high byte {c} must not be alphanumeric");
        }
    }

    #[test]
    fn exhaustive_invariants() {
        for c in 0u8..=255 {
            assert_eq!(
                is_alphanum(c),
                is_digit(c) || is_lower(c) || is_upper(c),
                "alphanum composition failed for {c}"
            );
            assert!(
                !(is_digit(c) && is_lower(c)),
                "digit/lower overlap for {c}"
            );
            assert!(
                !(is_digit(c) && is_upper(c)),
                "digit/upper overlap for {c}"
            );
            assert!(
                !(is_lower(c) && is_upper(c)),
                "lower/upper overlap for {c}"
            );
            assert_eq!(ord(c), i32::from(c), "ordinal identity failed for {c}");
            assert!((0..=255).contains(&ord(c)), "ordinal range failed for {c}");
        }
    }

    #[test]
    fn ord_is_injective_over_all_bytes() {
        let mut seen = [false; 256];
        for c in 0u8..=255 {
            let code = usize::try_from(ord(c)).unwrap();
            assert!(!seen[code], "ordinal collision at {c}");
            seen[code] = true;
        }
        assert!(seen.iter().all(|s| *s));
    }
}

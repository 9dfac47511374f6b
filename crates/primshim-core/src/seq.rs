//! Sequence construction.
//!
//! Sequences are plain byte slices here. The cons operation is
//! non-destructive: it builds a fresh buffer and never mutates its input.

/// Returns a fresh sequence holding `head` followed by every byte of `tail`.
///
/// The result has length `1 + tail.len()`. `tail` is read once, copied, and
/// left untouched; callers keep ownership of it.
#[must_use]
pub fn cons(head: u8, tail: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(1 + tail.len());
    out.push(head);
    out.extend_from_slice(tail);
    out
}

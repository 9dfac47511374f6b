#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some((&head, tail)) = data.split_first() else {
        return;
    };

    let before = tail.to_vec();
    let out = primshim_core::seq::cons(head, tail);

    // Prepend contract: one new element ahead of an unchanged copy.
    assert_eq!(out.len(), 1 + tail.len());
    assert_eq!(out[0], head);
    assert_eq!(&out[1..], &before[..]);
    assert_eq!(tail, &before[..]);

    // The NUL-terminated rendition a C caller scans must stop in bounds.
    let mut buf = out;
    buf.push(0);
    let scanned = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    assert!(scanned < buf.len());
});

//! Sequence construction benchmarks.
//!
//! Measures the full `string_cons` boundary path (verdict, scan, tracked
//! allocation, copy) against the safe-core prepend it wraps, and the
//! per-call cost of the verdict decision at each safety level.

use std::ffi::c_char;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use primshim_ledger::{SafetyLevel, SequenceFacts, decide_cons};

fn bench_cons_sizes(c: &mut Criterion) {
    let sizes: &[usize] = &[0, 16, 64, 256, 1024, 4096];
    let mut group = c.benchmark_group("cons");

    for &size in sizes {
        let mut tail = vec![b'a' as c_char; size + 1];
        tail[size] = 0;
        // One output byte per input byte plus the prepended head.
        group.throughput(Throughput::Bytes(size as u64 + 1));

        group.bench_with_input(BenchmarkId::new("primshim_abi", size), &size, |b, _| {
            b.iter(|| {
                // SAFETY: tail is NUL-terminated and outlives the call; the
                // result is released through the boundary every iteration.
                unsafe {
                    let out =
                        primshim_abi::seq_abi::string_cons(b'x' as c_char, black_box(tail.as_ptr()));
                    black_box(out);
                    primshim_abi::seq_abi::string_free(out);
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("vec_baseline", size), &size, |b, &sz| {
            let bytes = vec![b'a'; sz];
            b.iter(|| {
                let out = primshim_core::seq::cons(b'x', black_box(&bytes));
                black_box(out);
            });
        });
    }
    group.finish();
}

fn bench_verdict_levels(c: &mut Criterion) {
    let mut group = c.benchmark_group("cons_verdict");
    group.throughput(Throughput::Elements(1));

    // Untracked non-null input, the common case at the boundary.
    let facts = SequenceFacts::unknown(0x1000);
    for level in [SafetyLevel::Strict, SafetyLevel::Hardened, SafetyLevel::Off] {
        group.bench_function(BenchmarkId::new("decide_cons", level.as_str()), |b| {
            b.iter(|| black_box(decide_cons(black_box(facts), level)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cons_sizes, bench_verdict_levels);
criterion_main!(benches);

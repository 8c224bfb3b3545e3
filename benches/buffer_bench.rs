use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ssocket::socket::IoBuffer;
use std::fmt::Write;

/// Benchmark the staging paths a session uses before every flush.
/// Pure in-memory operations; no sockets involved.
fn benchmark_buffer_operations(c: &mut Criterion) {
    let chunk = [b'x'; 64];

    c.bench_function("buffer_append_until_full", |b| {
        let mut buf = IoBuffer::with_capacity(2048);
        b.iter(|| {
            buf.clear();
            while buf.append(black_box(&chunk)) > 0 {}
            black_box(buf.len())
        })
    });

    c.bench_function("buffer_write_fmt", |b| {
        let mut buf = IoBuffer::with_capacity(2048);
        b.iter(|| {
            buf.clear();
            let _ = write!(buf, "recv:{}", black_box("hello world"));
            black_box(buf.len())
        })
    });

    // Clearing is the per-message reset on the receive side
    c.bench_function("buffer_clear", |b| {
        let mut buf = IoBuffer::with_capacity(2048);
        b.iter(|| {
            buf.append(&chunk);
            buf.clear();
        })
    });
}

criterion_group!(benches, benchmark_buffer_operations);
criterion_main!(benches);

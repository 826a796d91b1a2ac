//! Benchmarks for the one-call codec wrappers.
//!
//! Run with: `cargo bench`
//! Compare with baseline: `cargo bench -- --save-baseline main`
//! Compare against baseline: `cargo bench -- --baseline main`

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use native_sys::{bz2, lzma};

/// Builds a payload that compresses but is not degenerate: repeated text
/// with a counter mixed in so the match finder has real work to do.
fn sample_payload(len: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(len);
    let mut n: u64 = 0;
    while data.len() < len {
        data.extend_from_slice(b"the quick brown fox jumps over the lazy dog ");
        data.extend_from_slice(n.to_string().as_bytes());
        data.push(b'\n');
        n = n.wrapping_mul(6364136223846793005).wrapping_add(1);
    }
    data.truncate(len);
    data
}

const PAYLOAD_LEN: usize = 256 * 1024;

fn bench_xz_encode(c: &mut Criterion) {
    let data = sample_payload(PAYLOAD_LEN);
    let mut out = vec![0u8; lzma::stream_buffer_bound(data.len())];

    let mut group = c.benchmark_group("xz");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for preset in [1u32, 6] {
        group.bench_function(format!("encode_preset_{preset}"), |b| {
            b.iter(|| {
                let n = lzma::easy_buffer_encode(
                    preset,
                    lzma::Check::Crc64,
                    black_box(&data),
                    &mut out,
                )
                .unwrap();
                black_box(n)
            });
        });
    }

    group.finish();
}

fn bench_xz_decode(c: &mut Criterion) {
    let data = sample_payload(PAYLOAD_LEN);
    let mut compressed = vec![0u8; lzma::stream_buffer_bound(data.len())];
    let n = lzma::easy_buffer_encode(6, lzma::Check::Crc64, &data, &mut compressed).unwrap();
    compressed.truncate(n);
    let mut out = vec![0u8; data.len()];

    let mut group = c.benchmark_group("xz");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut memlimit = u64::MAX;
            let r = lzma::stream_buffer_decode(&mut memlimit, 0, black_box(&compressed), &mut out)
                .unwrap();
            black_box(r)
        });
    });

    group.finish();
}

fn bench_bzip2_encode(c: &mut Criterion) {
    let data = sample_payload(PAYLOAD_LEN);
    let mut out = vec![0u8; bz2::compress_bound(data.len())];

    let mut group = c.benchmark_group("bzip2");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("encode_block_900k", |b| {
        b.iter(|| {
            let n = bz2::compress_buffer(black_box(&data), &mut out, 9, 0).unwrap();
            black_box(n)
        });
    });

    group.finish();
}

fn bench_bzip2_decode(c: &mut Criterion) {
    let data = sample_payload(PAYLOAD_LEN);
    let mut compressed = vec![0u8; bz2::compress_bound(data.len())];
    let n = bz2::compress_buffer(&data, &mut compressed, 9, 0).unwrap();
    compressed.truncate(n);
    let mut out = vec![0u8; data.len()];

    let mut group = c.benchmark_group("bzip2");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("decode", |b| {
        b.iter(|| {
            let n = bz2::decompress_buffer(black_box(&compressed), &mut out, false).unwrap();
            black_box(n)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_xz_encode,
    bench_xz_decode,
    bench_bzip2_encode,
    bench_bzip2_decode,
);
criterion_main!(benches);

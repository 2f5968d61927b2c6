//! Wire format decoding benchmarks.

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxibin_protobuf::{Reader, WireType};
use std::hint::black_box;

fn encode_varints(values: impl Iterator<Item = u64>) -> Vec<u8> {
    let mut out = Vec::new();
    for mut value in values {
        while value >= 0x80 {
            out.push((value as u8) | 0x80);
            value >>= 7;
        }
        out.push(value as u8);
    }
    out
}

fn bench_varints(c: &mut Criterion) {
    let mut group = c.benchmark_group("varint");
    let count = 100_000u64;

    let cases = [
        ("small", encode_varints((0..count).map(|i| i % 128))),
        ("u32", encode_varints((0..count).map(|i| i * 40_503 % u64::from(u32::MAX)))),
        ("u64", encode_varints((0..count).map(|i| i.wrapping_mul(0x9E37_79B9_7F4A_7C15)))),
    ];

    for (label, data) in &cases {
        group.throughput(Throughput::Elements(count));
        group.bench_with_input(BenchmarkId::new("uint64", label), data, |b, input| {
            b.iter(|| {
                let mut reader = Reader::new(black_box(input));
                let mut sum = 0u64;
                while let Ok(value) = reader.uint64() {
                    sum = sum.wrapping_add(value);
                }
                sum
            })
        });
        group.bench_with_input(BenchmarkId::new("skip_varint", label), data, |b, input| {
            b.iter(|| {
                let mut reader = Reader::new(black_box(input));
                while !reader.is_at_end() {
                    if reader.skip_varint().is_err() {
                        break;
                    }
                }
            })
        });
    }

    group.finish();
}

fn bench_packed_floats(c: &mut Criterion) {
    let mut group = c.benchmark_group("packed_floats");

    for count in [1_024usize, 262_144] {
        let mut data = encode_varints(std::iter::once((count * 4) as u64));
        for i in 0..count {
            data.extend_from_slice(&(i as f32 * 0.5).to_le_bytes());
        }
        group.throughput(Throughput::Bytes(data.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &data, |b, input| {
            b.iter(|| {
                let mut out = Vec::new();
                let mut reader = Reader::new(black_box(input));
                reader.floats(WireType::LengthDelimited, &mut out).map(|_| out.len())
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_varints, bench_packed_floats);
criterion_main!(benches);

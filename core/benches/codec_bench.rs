use criterion::{black_box, criterion_group, criterion_main, Criterion};
use searchify_core::codec::{decode_from_slice, encode_to_vec};

fn bench_codec(c: &mut Criterion) {
    // small gaps dominate real position lists
    let values: Vec<u32> = (0..10_000u32).map(|i| (i * 7919) % 97 + (i % 13) * 1000).collect();
    let bytes = encode_to_vec(&values);
    c.bench_function("fibonacci_encode_10k", |b| b.iter(|| encode_to_vec(black_box(&values))));
    c.bench_function("fibonacci_decode_10k", |b| {
        b.iter(|| decode_from_slice(black_box(&bytes), values.len()))
    });
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);

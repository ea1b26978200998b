use criterion::{criterion_group, criterion_main, Criterion};
use webdex_core::codec::{decode_all, encode_all};
use webdex_core::postings::PostingList;

fn bench_codec(c: &mut Criterion) {
    let deltas: Vec<u32> = (0..10_000u32).map(|i| (i * 7919) % 20_000 + 1).collect();
    let mut block = Vec::new();
    encode_all(deltas.iter().copied(), &mut block);
    encode_all(deltas.iter().map(|d| d % 13 + 1), &mut block);

    c.bench_function("vbyte_encode_10k", |b| {
        b.iter(|| {
            let mut out = Vec::with_capacity(block.len());
            encode_all(deltas.iter().copied(), &mut out);
            out
        })
    });
    c.bench_function("vbyte_decode_block", |b| b.iter(|| decode_all(&block)));
    c.bench_function("posting_list_decode", |b| b.iter(|| PostingList::decode(&block)));
}

criterion_group!(benches, bench_codec);
criterion_main!(benches);

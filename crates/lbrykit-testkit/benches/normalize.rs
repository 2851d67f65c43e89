use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use lbrykit_core::{aggregate, normalize};
use lbrykit_testkit::{channel_videos, noisy_listing, ClaimBuilder};

fn bench_normalize(c: &mut Criterion) {
    let channel = ClaimBuilder::channel(1, "chan").build();
    let mut group = c.benchmark_group("normalize");

    for count in [100u64, 1_000, 10_000] {
        let listing = noisy_listing(&channel_videos(&channel, 100, count), count);
        group.bench_with_input(BenchmarkId::from_parameter(count), &listing, |b, listing| {
            b.iter(|| normalize(black_box(listing.clone()), 0, false))
        });
    }
    group.finish();
}

fn bench_aggregate(c: &mut Criterion) {
    let channel = ClaimBuilder::channel(1, "chan").build();
    let videos = channel_videos(&channel, 100, 10_000);

    c.bench_function("aggregate/10000", |b| b.iter(|| aggregate(black_box(&videos))));
}

criterion_group!(benches, bench_normalize, bench_aggregate);
criterion_main!(benches);

//! Criterion micro-benchmarks for the grid codec and derived views.

use criterion::{criterion_group, criterion_main, Criterion};
use ndarray::Array3;
use occupancy_grid::codec::{decode, encode};
use occupancy_grid::{resolve_bounds, OccupancyArchive, OccupancyVolume};
use std::hint::black_box;

/// 200x200x32 grid with a smooth value ramp.
fn make_volume() -> OccupancyVolume {
    OccupancyVolume::new(Array3::from_shape_fn((200, 200, 32), |(x, y, z)| {
        ((x * 7 + y * 3 + z) % 101) as f32 / 100.0
    }))
}

fn bench_encode(c: &mut Criterion) {
    let volume = make_volume();
    let grid = resolve_bounds(&OccupancyArchive::new(volume.clone())).unwrap();

    c.bench_function("codec_encode_200x200x32", |b| {
        b.iter(|| black_box(encode(&volume, &grid, "bench.bin").unwrap()));
    });
}

fn bench_decode(c: &mut Criterion) {
    let volume = make_volume();
    let grid = resolve_bounds(&OccupancyArchive::new(volume.clone())).unwrap();
    let encoded = encode(&volume, &grid, "bench.bin").unwrap();

    c.bench_function("codec_decode_200x200x32", |b| {
        b.iter(|| black_box(decode(&encoded.metadata, &encoded.payload).unwrap()));
    });
}

fn bench_views(c: &mut Criterion) {
    let volume = make_volume();

    c.bench_function("view_max_projection", |b| {
        b.iter(|| black_box(volume.max_projection()));
    });
    c.bench_function("view_mean_projection", |b| {
        b.iter(|| black_box(volume.mean_projection()));
    });
    c.bench_function("view_histogram_100", |b| {
        b.iter(|| black_box(volume.histogram(100).unwrap()));
    });
}

criterion_group!(benches, bench_encode, bench_decode, bench_views);
criterion_main!(benches);

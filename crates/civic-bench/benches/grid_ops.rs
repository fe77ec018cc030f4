//! Criterion micro-benchmarks for grid distance fields and regions.

use civic_bench::reference_city;
use civic_core::TileTypeId;
use civic_grid::{distances_from, distances_to, region_areas};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const ROAD: TileTypeId = TileTypeId(4);
const WATER: TileTypeId = TileTypeId(3);
const PARK: TileTypeId = TileTypeId(2);

/// Benchmark: road distance field over a 100x100 city (10K cells).
fn bench_distances_to_roads_10k(c: &mut Criterion) {
    let grid = reference_city(100, 100);
    c.bench_function("distances_to_roads_10k", |b| {
        b.iter(|| black_box(distances_to(&grid, &[ROAD])));
    });
}

/// Benchmark: water-or-park field over a 316x316 city (~100K cells).
fn bench_distances_to_green_100k(c: &mut Criterion) {
    let grid = reference_city(316, 316);
    c.bench_function("distances_to_green_100k", |b| {
        b.iter(|| black_box(distances_to(&grid, &[PARK, WATER])));
    });
}

/// Benchmark: single-source field from the grid origin.
fn bench_distances_from_origin_10k(c: &mut Criterion) {
    c.bench_function("distances_from_origin_10k", |b| {
        b.iter(|| black_box(distances_from(100, 100, [(0, 0)])));
    });
}

/// Benchmark: connected park areas over a 100x100 city.
fn bench_region_areas_10k(c: &mut Criterion) {
    let grid = reference_city(100, 100);
    c.bench_function("region_areas_parks_10k", |b| {
        b.iter(|| black_box(region_areas(&grid, &[PARK])));
    });
}

criterion_group!(
    benches,
    bench_distances_to_roads_10k,
    bench_distances_to_green_100k,
    bench_distances_from_origin_10k,
    bench_region_areas_10k
);
criterion_main!(benches);

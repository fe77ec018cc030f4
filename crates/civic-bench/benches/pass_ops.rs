//! Criterion benchmarks for full and partial recomputation passes.

use civic_bench::reference_manager;
use civic_test_utils::updates_from_rows;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Benchmark: every standard source over a 64x64 city.
fn bench_calculate_all_64(c: &mut Criterion) {
    let mut manager = reference_manager(64, 64);
    c.bench_function("calculate_all_64x64", |b| {
        b.iter(|| black_box(manager.calculate_all().unwrap()));
    });
}

/// Benchmark: the wind-dependent tail of the registry over a 64x64 city.
fn bench_calculate_from_wind_64(c: &mut Criterion) {
    let mut manager = reference_manager(64, 64);
    manager.calculate_all().unwrap();
    c.bench_function("calculate_from_wind_64x64", |b| {
        b.iter(|| black_box(manager.calculate_from("wind-turbines").unwrap()));
    });
}

/// Benchmark: a small edit followed by a forced pass, as a viewer would
/// trigger it.
fn bench_edit_then_pass_64(c: &mut Criterion) {
    let mut manager = reference_manager(64, 64);
    let edits = [
        updates_from_rows(&["PPPP", "PPPP"]),
        updates_from_rows(&["RRRR", "RRRR"]),
    ];
    let mut i = 0;
    c.bench_function("edit_then_pass_64x64", |b| {
        b.iter(|| {
            manager.grid().replace(&edits[i % 2]).unwrap();
            i += 1;
            black_box(manager.calculate_all().unwrap())
        });
    });
}

criterion_group!(
    benches,
    bench_calculate_all_64,
    bench_calculate_from_wind_64,
    bench_edit_then_pass_64
);
criterion_main!(benches);

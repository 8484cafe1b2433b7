//! Map generation benchmarks for mapgen_core.
//!
//! Run with: `cargo bench -p mapgen_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use mapgen_core::config::MapGenConfig;
use mapgen_core::map::{generate_map, MapSize};
use mapgen_core::rng::seeded_rng;
use mapgen_core::terrain::generate_base_terrain;

/// Full pipeline at increasing map sizes.
pub fn generation_benchmark(c: &mut Criterion) {
    let config = MapGenConfig::default();
    let mut group = c.benchmark_group("generate_map");
    group.sample_size(20);
    for side in [50i64, 100, 200] {
        let Ok(size) = MapSize::try_new(side, side) else {
            continue;
        };
        group.bench_with_input(BenchmarkId::from_parameter(side), &size, |b, &size| {
            b.iter(|| {
                let mut rng = seeded_rng(42);
                black_box(generate_map(size, 4, &config, &mut rng))
            });
        });
    }
    group.finish();
}

/// Base terrain alone, without deposits or spawns.
pub fn terrain_benchmark(c: &mut Criterion) {
    let config = MapGenConfig::default();
    c.bench_function("base_terrain_200", |b| {
        b.iter(|| {
            let mut rng = seeded_rng(42);
            black_box(generate_base_terrain(200, 200, &config.terrain, &mut rng))
        });
    });
}

criterion_group!(benches, generation_benchmark, terrain_benchmark);
criterion_main!(benches);

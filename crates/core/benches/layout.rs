//! Criterion benchmarks for segment layout and avatar placement.
//!
//! Run with:
//!   cargo bench -p pyramid
//!
//! Results are saved to target/criterion/

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use pyramid::config::{LayoutConfig, PlacementConfig, PyramidGeometry};
use pyramid::layout::Layout;
use pyramid::loyalists::Dataset;
use pyramid::placement::AvatarPlacer;

fn make_dataset(generations: usize, per_generation: usize) -> Dataset {
    let generations = (1..=generations)
        .map(|g| (0..per_generation).map(|i| format!("g{g}_{i}")).collect())
        .collect();
    match Dataset::new(generations) {
        Ok(dataset) => dataset,
        Err(e) => panic!("bench dataset: {e}"),
    }
}

/// Segments for fractional counts, with a warm height cache.
fn bench_segments(c: &mut Criterion) {
    let mut group = c.benchmark_group("segments");

    for depth in [8usize, 32, 128] {
        group.throughput(Throughput::Elements(depth as u64));
        group.bench_with_input(BenchmarkId::new("warm", depth), &depth, |b, &depth| {
            let layout = Layout::new(PyramidGeometry::default(), LayoutConfig::default());
            let count = depth as f64 + 0.5;
            b.iter(|| black_box(layout.segments(black_box(count)).len()));
        });
    }

    group.finish();
}

/// Cold height tables: each iteration fills the memo from scratch.
fn bench_heights_cold(c: &mut Criterion) {
    let mut group = c.benchmark_group("segment_heights_cold");

    for depth in [16usize, 64, 256] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| {
                let layout = Layout::new(PyramidGeometry::default(), LayoutConfig::default());
                black_box(layout.segment_heights(depth).len())
            });
        });
    }

    group.finish();
}

/// One animation frame of work: segments plus placements.
fn bench_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame");
    let geometry = PyramidGeometry::default();
    let layout_cfg = LayoutConfig::default();
    let placement = PlacementConfig::default();

    for per_generation in [4usize, 16, 64] {
        let dataset = make_dataset(40, per_generation);
        let layout = Layout::new(geometry, layout_cfg.clone());
        let placer = AvatarPlacer::new(&geometry, &layout_cfg, &placement);
        group.throughput(Throughput::Elements((per_generation * 16) as u64));

        group.bench_with_input(
            BenchmarkId::new("place", per_generation),
            &per_generation,
            |b, _| {
                let mut t = 0.0f64;
                b.iter(|| {
                    t = (t + 0.013) % 1.0;
                    let segments = layout.segments(30.0 + t);
                    black_box(placer.place(&segments, &dataset).len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_segments, bench_heights_cold, bench_frame);
criterion_main!(benches);

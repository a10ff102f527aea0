use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_topology::{IndexedPointInAreaLocator, Polygonizer};
use geo_types::{Coord, LineString, MultiPolygon};

fn generate_grid(n: usize) -> Vec<LineString<f64>> {
    let mut lines = Vec::new();
    for i in 0..=n {
        lines.push(LineString::from(vec![(0.0, i as f64), (n as f64, i as f64)]));
        lines.push(LineString::from(vec![(i as f64, 0.0), (i as f64, n as f64)]));
    }
    lines
}

fn bench_polygonize(c: &mut Criterion) {
    let mut group = c.benchmark_group("polygonize");
    group.sample_size(10);

    for size in [5, 10, 20].iter() {
        group.bench_with_input(BenchmarkId::new("grid", size), size, |b, &size| {
            let lines = generate_grid(size);
            b.iter(|| {
                let mut poly = Polygonizer::new();
                for line in &lines {
                    poly.add_geometry(line.clone().into());
                }
                // Long grid lines cross away from their endpoints, so the
                // snap-rounding pass is required.
                poly.node_input = true;
                poly.polygonize().unwrap()
            });
        });
    }
    group.finish();
}

fn bench_indexed_locate(c: &mut Criterion) {
    // A jagged star polygon with many edges.
    let n = 2000;
    let mut coords = Vec::with_capacity(n + 1);
    for i in 0..n {
        let angle = (i as f64) * std::f64::consts::TAU / (n as f64);
        let r = if i % 2 == 0 { 100.0 } else { 60.0 };
        coords.push(Coord {
            x: r * angle.cos(),
            y: r * angle.sin(),
        });
    }
    coords.push(coords[0]);
    let area = MultiPolygon::new(vec![geo_types::Polygon::new(LineString::new(coords), vec![])]);

    c.bench_function("indexed_locate_10k", |b| {
        let locator = IndexedPointInAreaLocator::new(&area);
        b.iter(|| {
            let mut inside = 0usize;
            for i in 0..10_000 {
                let x = ((i * 7919) % 220) as f64 - 110.0;
                let y = ((i * 104729) % 220) as f64 - 110.0;
                if locator.locate(Coord { x, y }) == geo_topology::Location::Interior {
                    inside += 1;
                }
            }
            inside
        });
    });
}

criterion_group!(benches, bench_polygonize, bench_indexed_locate);
criterion_main!(benches);

use annotate_core::drawing::{ChartDrawings, DrawingDefaults, PointInTime, TrendLine};
use annotate_core::geometry::Point;
use annotate_core::hit_test::HitTester;
use annotate_core::types::Insets;
use annotate_core::viewport::ScaleViewport;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

const T0: i64 = 1_699_833_600;
const DAY: i64 = 86_400;

fn setup(bars: usize, lines: usize) -> (ScaleViewport, ChartDrawings) {
    let mut vp = ScaleViewport::new(1024.0, 640.0, Insets::default());
    vp.set_times((0..bars as i64).map(|i| T0 + i * DAY).collect());
    vp.fit_content();
    vp.set_price_range(0.0, 200.0);
    let defaults = DrawingDefaults::default();
    let trend_lines = (0..lines)
        .map(|i| {
            let a = (i * 7) % (bars - 10);
            let start = PointInTime::new(T0 + a as i64 * DAY, 50.0 + (i % 100) as f64);
            let end = PointInTime::new(T0 + (a + 9) as i64 * DAY, 60.0 + (i % 90) as f64);
            TrendLine::new(start, end, &defaults)
        })
        .collect();
    (vp, ChartDrawings { trend_lines, fibs: Vec::new() })
}

fn bench_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("hit_test");
    let tester = HitTester::default();
    for &n in &[10usize, 100, 1_000] {
        let (vp, drawings) = setup(5_000, n);
        // Miss: has to visit every drawing.
        let p = Point::new(500.0, 5.0);
        group.bench_with_input(BenchmarkId::from_parameter(format!("miss_n{n}")), &n, |b, _| {
            b.iter(|| black_box(tester.hit(&drawings, None, black_box(p), &vp)));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_hit);
criterion_main!(benches);

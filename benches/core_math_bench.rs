use chrono::{DateTime, Utc};
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use track_chart::api::{ChartEngine, ChartEngineConfig};
use track_chart::core::{
    CoordinateMapper, GlobalTimeBorder, SeriesSpec, TimeGridTable, ValueGridTable, Viewport,
    plan_border, sample_items,
};
use track_chart::render::RecordingSurface;

#[derive(Debug, Clone)]
struct Fix {
    seconds: i64,
    speed: f64,
}

fn time_of(fix: &Fix) -> DateTime<Utc> {
    DateTime::from_timestamp(fix.seconds, 0).expect("valid timestamp")
}

fn speed_of(fix: &Fix) -> f64 {
    fix.speed
}

fn track(len: i64) -> Vec<Fix> {
    (0..len)
        .map(|i| Fix {
            seconds: 1_600_000_000 + i,
            speed: 30.0 + (i as f64 * 0.01).sin() * 12.0,
        })
        .collect()
}

fn bench_plan_border_100k(c: &mut Criterion) {
    let items = track(100_000);
    let spec = SeriesSpec::new("speed", time_of, speed_of);
    let time_table = TimeGridTable::default();
    let value_table = ValueGridTable::default();

    c.bench_function("plan_border_100k", |b| {
        b.iter(|| {
            let _ = plan_border(
                black_box(&items),
                black_box(&spec),
                &time_table,
                &value_table,
            )
            .expect("planning should succeed");
        })
    });
}

fn bench_projection_100k(c: &mut Criterion) {
    let items = track(100_000);
    let spec = SeriesSpec::new("speed", time_of, speed_of);
    let border = plan_border(
        &items,
        &spec,
        &TimeGridTable::default(),
        &ValueGridTable::default(),
    )
    .expect("border");
    let mut global = GlobalTimeBorder::new();
    global.register(&border);
    let mapper = CoordinateMapper::new(Viewport::new(1920.0, 1080.0), &global).expect("mapper");
    let samples = sample_items(&items, &spec);

    c.bench_function("projection_100k", |b| {
        b.iter(|| {
            let _ = mapper.project_all(black_box(&samples), black_box(&border));
        })
    });
}

fn bench_full_pass_10k(c: &mut Criterion) {
    let items = track(10_000);
    let spec = SeriesSpec::new("speed", time_of, speed_of);
    let mut engine: ChartEngine<RecordingSurface, Fix> = ChartEngine::new(
        RecordingSurface::new(1600.0, 900.0),
        ChartEngineConfig::default(),
    )
    .expect("engine init");

    c.bench_function("full_pass_10k", |b| {
        b.iter(|| {
            engine
                .run_pass(|engine| {
                    let series = engine.plan_border(&items, &spec)?;
                    engine.draw_grid(series)?;
                    engine.draw_polygon(&items, series, &spec)?;
                    engine.draw_lines(&items, series, &spec)?;
                    engine.draw_points(&items, series, &spec, true)?;
                    Ok(())
                })
                .expect("pass should succeed");
        })
    });
}

criterion_group!(
    benches,
    bench_plan_border_100k,
    bench_projection_100k,
    bench_full_pass_10k
);
criterion_main!(benches);

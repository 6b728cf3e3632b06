use std::time::Instant;

use chrono::{DateTime, Utc};
use track_chart::api::{ChartEngine, ChartEngineConfig, EngineSnapshot};
use track_chart::core::SeriesSpec;
use track_chart::interaction::PointerEvent;
use track_chart::render::RecordingSurface;

const T0: i64 = 1_600_000_000;

#[derive(Debug, Clone)]
struct Fix {
    seconds: i64,
    altitude: f64,
}

fn time_of(fix: &Fix) -> DateTime<Utc> {
    DateTime::from_timestamp(fix.seconds, 0).expect("valid timestamp")
}

fn altitude_of(fix: &Fix) -> f64 {
    fix.altitude
}

fn drawn_engine() -> ChartEngine<RecordingSurface, Fix> {
    let items: Vec<Fix> = (0..5)
        .map(|i| Fix {
            seconds: T0 + i * 30,
            altitude: 400.0 + i as f64 * 3.0,
        })
        .collect();
    let mut engine = ChartEngine::new(
        RecordingSurface::new(600.0, 300.0),
        ChartEngineConfig::default(),
    )
    .expect("engine init");
    engine
        .run_pass(|engine| {
            let spec = SeriesSpec::new("altitude", time_of, altitude_of);
            let series = engine.plan_border(&items, &spec)?;
            engine.draw_polygon(&items, series, &spec)?;
            engine.draw_points(&items, series, &spec, true)?;
            Ok(())
        })
        .expect("pass");
    engine
}

#[test]
fn snapshot_reports_committed_state() {
    let mut engine = drawn_engine();
    assert!(engine.pointer_move(PointerEvent::new(10.0, 10.0), Instant::now()));

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.pass_count, 1);
    assert_eq!(snapshot.series.len(), 1);
    assert_eq!(snapshot.series[0].label, "altitude");
    assert_eq!(snapshot.time_unit, Some(10.0));
    assert_eq!(
        snapshot.global_time_border,
        Some((T0 as f64, (T0 + 120) as f64))
    );
    assert_eq!(snapshot.displayed_points, 5);
    assert!(snapshot.crosshair.visible);
    assert!(snapshot.tooltip.is_some());
    assert!(!snapshot.drawing);
    assert!(!snapshot.dirty);
    assert_eq!(snapshot.pending_resizes, 0);
}

#[test]
fn snapshot_json_is_stable_and_parseable() {
    let engine = drawn_engine();
    let json = engine.snapshot_json_pretty().expect("json");
    assert!(json.contains("\"pass_count\": 1"));
    assert!(json.contains("\"label\": \"altitude\""));

    let parsed: EngineSnapshot = serde_json::from_str(&json).expect("parse snapshot");
    assert_eq!(parsed.pass_count, 1);
    assert_eq!(parsed.displayed_points, 5);
    assert_eq!(parsed.series[0].id, engine.snapshot().series[0].id);
    assert_eq!(json, engine.snapshot_json_pretty().expect("json again"));
}

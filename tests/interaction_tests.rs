use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use track_chart::ChartResult;
use track_chart::api::{ChartEngine, ChartEngineConfig};
use track_chart::core::SeriesSpec;
use track_chart::interaction::{CrosshairAnchor, InteractionConfig, PointerEvent};
use track_chart::render::{CanvasLayerKind, RecordingSurface};

const T0: i64 = 1_600_000_000;

#[derive(Debug, Clone, PartialEq)]
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

fn at(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(T0 + offset, 0).expect("valid timestamp")
}

/// Points land on screen X = 0, 400 and 800 of an 800 px wide surface.
fn track() -> Vec<Fix> {
    vec![
        Fix {
            seconds: T0,
            speed: 10.0,
        },
        Fix {
            seconds: T0 + 20,
            speed: 11.0,
        },
        Fix {
            seconds: T0 + 40,
            speed: 9.0,
        },
    ]
}

fn draw_track(engine: &mut ChartEngine<RecordingSurface, Fix>) -> ChartResult<()> {
    let items = track();
    let spec = SeriesSpec::new("speed", time_of, speed_of);
    let series = engine.plan_border(&items, &spec)?;
    engine.draw_points(&items, series, &spec, true)?;
    engine.draw_lines(&items, series, &spec)?;
    Ok(())
}

fn drawn_engine(config: ChartEngineConfig) -> ChartEngine<RecordingSurface, Fix> {
    let mut engine =
        ChartEngine::new(RecordingSurface::new(800.0, 400.0), config).expect("engine init");
    engine.run_pass(draw_track).expect("pass");
    engine
}

fn overlay_counts(engine: &ChartEngine<RecordingSurface, Fix>) -> (usize, usize) {
    (
        engine
            .surface()
            .primitives_in(CanvasLayerKind::Crosshair)
            .count(),
        engine
            .surface()
            .primitives_in(CanvasLayerKind::Tooltip)
            .count(),
    )
}

#[test]
fn pointer_hovers_nearest_point_by_screen_x() {
    let mut engine = drawn_engine(ChartEngineConfig::default());
    let start = Instant::now();
    let gap = Duration::from_millis(150);

    assert!(engine.pointer_move(PointerEvent::new(300.0, 50.0), start));
    let crosshair = engine.crosshair_state();
    assert!(crosshair.visible);
    assert_eq!(crosshair.x, Some(400.0));
    assert_eq!(crosshair.anchor, Some(CrosshairAnchor::ScreenX(400.0)));

    let tooltip = engine.tooltip_state().expect("tooltip");
    assert_eq!((tooltip.x, tooltip.y), (300.0, 50.0));
    assert_eq!(tooltip.text, "12:27:00 11.00");
    assert_eq!(overlay_counts(&engine), (1, 2));

    let events = engine.take_hover_events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].item, track()[1]);
    assert_eq!(events[0].pixel_x, 400.0);
    assert_eq!(events[0].event, PointerEvent::new(300.0, 50.0));
    assert!(engine.take_hover_events().is_empty());

    assert!(engine.pointer_move(PointerEvent::new(150.0, 50.0), start + gap));
    assert_eq!(engine.last_hovered().map(|hovered| hovered.item.seconds), Some(T0));

    // Equidistant from the first and second point.
    assert!(engine.pointer_move(PointerEvent::new(200.0, 50.0), start + gap * 2));
    assert_eq!(engine.last_hovered().map(|hovered| hovered.item.seconds), Some(T0));
    assert_eq!(overlay_counts(&engine), (1, 2));
}

#[test]
fn pointer_moves_are_debounced() {
    let mut engine = drawn_engine(ChartEngineConfig::default());
    let start = Instant::now();

    assert!(engine.pointer_move(PointerEvent::new(10.0, 10.0), start));
    assert!(!engine.pointer_move(PointerEvent::new(790.0, 10.0), start + Duration::from_millis(40)));
    assert_eq!(engine.crosshair_state().x, Some(0.0));
    assert!(engine.pointer_move(PointerEvent::new(790.0, 10.0), start + Duration::from_millis(100)));
    assert_eq!(engine.crosshair_state().x, Some(800.0));
    assert_eq!(engine.take_hover_events().len(), 2);
}

#[test]
fn pointer_leave_clears_overlays_but_keeps_history() {
    let mut engine = drawn_engine(ChartEngineConfig::default());
    assert!(engine.pointer_move(PointerEvent::new(400.0, 10.0), Instant::now()));

    engine.pointer_leave();
    assert!(!engine.crosshair_state().visible);
    assert!(engine.tooltip_state().is_none());
    assert_eq!(overlay_counts(&engine), (0, 0));
    assert!(engine.last_hovered().is_some());
    assert_eq!(engine.take_hover_events().len(), 1);
}

#[test]
fn line_at_time_follows_the_shared_time_axis() {
    let mut engine = drawn_engine(ChartEngineConfig::default());

    assert!(engine.set_line_at_time(at(10)));
    let crosshair = engine.crosshair_state();
    assert_eq!(crosshair.x, Some(200.0));
    assert_eq!(crosshair.anchor, Some(CrosshairAnchor::Time((T0 + 10) as f64)));
    assert_eq!(overlay_counts(&engine), (1, 0));

    // The anchor is a time, so it is re-projected by the next pass.
    engine.run_pass(draw_track).expect("redraw");
    assert_eq!(engine.crosshair_state().x, Some(200.0));
    assert_eq!(overlay_counts(&engine), (1, 0));

    assert!(engine.set_line_at_time(at(500)));
    assert!(!engine.crosshair_state().visible);
    assert_eq!(overlay_counts(&engine), (0, 0));
}

#[test]
fn clear_line_removes_only_the_crosshair() {
    let mut engine = drawn_engine(ChartEngineConfig::default());
    assert!(engine.pointer_move(PointerEvent::new(400.0, 10.0), Instant::now()));

    assert!(engine.clear_line());
    assert!(!engine.crosshair_state().visible);
    assert!(engine.tooltip_state().is_some());
    assert_eq!(overlay_counts(&engine), (0, 2));
}

#[test]
fn pointer_is_ignored_while_drawing_and_before_first_pass() {
    let mut engine: ChartEngine<RecordingSurface, Fix> = ChartEngine::new(
        RecordingSurface::new(800.0, 400.0),
        ChartEngineConfig::default(),
    )
    .expect("engine init");
    let start = Instant::now();
    assert!(!engine.pointer_move(PointerEvent::new(10.0, 10.0), start));

    let later = start + Duration::from_secs(1);
    engine
        .run_pass(|engine| {
            draw_track(engine)?;
            assert!(!engine.pointer_move(PointerEvent::new(10.0, 10.0), later));
            Ok(())
        })
        .expect("pass");
    assert!(engine.pointer_move(PointerEvent::new(10.0, 10.0), later));
}

#[test]
fn flags_and_formatter_shape_the_feedback() {
    let config = ChartEngineConfig::default().with_interaction(InteractionConfig {
        tooltip_enabled: false,
        ..InteractionConfig::default()
    });
    let mut engine = drawn_engine(config);
    let start = Instant::now();

    assert!(engine.pointer_move(PointerEvent::new(400.0, 10.0), start));
    assert!(engine.tooltip_state().is_none());
    assert!(engine.crosshair_state().visible);

    engine.set_interaction_config(InteractionConfig {
        mouse_line_enabled: false,
        ..InteractionConfig::default()
    });
    assert!(!engine.crosshair_state().visible);

    engine.set_tooltip_formatter(|fix: &Fix| format!("{:.0} km/h", fix.speed));
    assert!(engine.pointer_move(PointerEvent::new(790.0, 10.0), start + Duration::from_secs(1)));
    assert_eq!(
        engine.tooltip_state().map(|tooltip| tooltip.text),
        Some("9 km/h".to_owned())
    );
    assert!(!engine.crosshair_state().visible);
}

#[test]
fn undrained_hover_queue_stays_bounded() {
    let config = ChartEngineConfig::default().with_interaction(InteractionConfig {
        max_pending_hover_events: 8,
        ..InteractionConfig::default()
    });
    let mut engine = drawn_engine(config);
    let start = Instant::now();
    let gap = Duration::from_millis(100);

    for step in 0..500u32 {
        let x = if step % 2 == 0 { 10.0 } else { 790.0 };
        assert!(engine.pointer_move(PointerEvent::new(x, 10.0), start + gap * step));
        assert!(engine.last_hovered().is_some());
    }
    assert_eq!(engine.pending_hover_events(), 8);

    let events = engine.take_hover_events();
    assert_eq!(events.len(), 8);
    // The newest notifications survive; step 499 hovered the last point.
    assert_eq!(events[7].item.seconds, T0 + 40);
    assert_eq!(events[6].item.seconds, T0);
    assert_eq!(engine.pending_hover_events(), 0);

    engine.set_interaction_config(InteractionConfig {
        max_pending_hover_events: 2,
        ..InteractionConfig::default()
    });
    for step in 500..505u32 {
        assert!(engine.pointer_move(PointerEvent::new(400.0, 10.0), start + gap * step));
    }
    assert_eq!(engine.pending_hover_events(), 2);
}

#[test]
fn default_hover_queue_is_bounded() {
    let mut engine = drawn_engine(ChartEngineConfig::default());
    let start = Instant::now();
    let cap = InteractionConfig::default().max_pending_hover_events;

    for step in 0..(cap as u32 * 3) {
        assert!(engine.pointer_move(
            PointerEvent::new(400.0, 10.0),
            start + Duration::from_millis(100) * step
        ));
    }
    assert_eq!(engine.pending_hover_events(), cap);
}

// File: crates/annotate-core/tests/common/mod.rs
// Purpose: Shared fixtures: a daily bar series on an 800x400 plot where bar i sits at x = 8i + 4 and price p at y = 400 - 2p.
#![allow(dead_code)]

use annotate_core::geometry::Point;
use annotate_core::series::Candle;
use annotate_core::types::{Insets, PointerId};
use annotate_core::viewport::ScaleViewport;
use annotate_core::GestureHost;

pub const T0: i64 = 1_699_833_600;
pub const DAY: i64 = 86_400;
pub const BARS: usize = 100;

pub fn time(i: usize) -> i64 {
    T0 + i as i64 * DAY
}

pub fn candles(n: usize) -> Vec<Candle> {
    (0..n)
        .map(|i| {
            let close = 100.0 + i as f64 * 0.5;
            Candle::try_new(time(i), close - 0.25, close + 1.0, close - 1.0, close, 1_000.0).unwrap()
        })
        .collect()
}

pub fn viewport() -> ScaleViewport {
    let mut vp = ScaleViewport::new(800.0, 400.0, Insets::new(0, 0, 0, 0));
    vp.set_times((0..BARS).map(time).collect());
    vp.fit_content();
    vp.set_price_range(0.0, 200.0);
    vp
}

/// Weekday-only session times: T0 is a Monday and every Saturday/Sunday is skipped,
/// so a bar step is one day inside a week and three days across a weekend.
pub fn weekday_time(i: usize) -> i64 {
    T0 + ((i / 5) * 7 + i % 5) as i64 * DAY
}

/// Same layout as [`viewport`], laid over [`weekday_time`] bars.
pub fn weekday_viewport() -> ScaleViewport {
    let mut vp = ScaleViewport::new(800.0, 400.0, Insets::new(0, 0, 0, 0));
    vp.set_times((0..BARS).map(weekday_time).collect());
    vp.fit_content();
    vp.set_price_range(0.0, 200.0);
    vp
}

pub fn bar_x(i: usize) -> f32 {
    8.0 * i as f32 + 4.0
}

pub fn price_y(price: f64) -> f32 {
    (400.0 - price * 2.0) as f32
}

/// Screen position of bar `i` at `price`.
pub fn at(i: usize, price: f64) -> Point {
    Point::new(bar_x(i), price_y(price))
}

pub fn near(a: Point, b: Point, tol: f32) -> bool {
    a.distance_to(b) <= tol
}

/// Gesture host that records what the overlay asked for.
#[derive(Debug)]
pub struct RecordingHost {
    pub gestures_enabled: bool,
    pub captured: Option<PointerId>,
    pub suspend_count: usize,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self { gestures_enabled: true, captured: None, suspend_count: 0 }
    }
}

impl GestureHost for RecordingHost {
    fn set_chart_gestures_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.suspend_count += 1;
        }
        self.gestures_enabled = enabled;
    }

    fn capture_pointer(&mut self, pointer: PointerId) {
        self.captured = Some(pointer);
    }

    fn release_pointer(&mut self, pointer: PointerId) {
        if self.captured == Some(pointer) {
            self.captured = None;
        }
    }
}

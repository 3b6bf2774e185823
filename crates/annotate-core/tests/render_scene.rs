// File: crates/annotate-core/tests/render_scene.rs
// Purpose: Overlay display list: trend line endpoints and extensions, selection handles, fib levels, ruler labels, previews.

mod common;

use annotate_core::drawing::{ChartDrawings, DrawingDefaults, FibRetracement, PointInTime, Ruler, TrendLine};
use annotate_core::geometry::Point;
use annotate_core::interaction::InteractionState;
use annotate_core::render::{OverlayFrame, OverlayRenderer, OverlayScene, Primitive};
use annotate_core::series::Candle;
use annotate_core::text::ApproxTextMetrics;
use annotate_core::theme::Theme;
use annotate_core::tool::Tool;
use annotate_core::types::PointerId;
use annotate_core::viewport::{ScaleViewport, ViewportMapper};
use annotate_core::{Annotator, DrawingId, NoopGestures};
use common::*;

fn point(i: usize, price: f64) -> PointInTime {
    PointInTime::new(time(i), price)
}

struct Fixture {
    drawings: ChartDrawings,
    selected: Option<DrawingId>,
    ruler: Option<Ruler>,
    interaction: InteractionState,
    candles: Vec<Candle>,
}

impl Fixture {
    fn new(drawings: ChartDrawings) -> Self {
        Self { drawings, selected: None, ruler: None, interaction: InteractionState::Idle, candles: candles(BARS) }
    }

    fn render(&self, vp: &ScaleViewport) -> OverlayScene {
        let frame = OverlayFrame {
            drawings: &self.drawings,
            selected: self.selected.as_ref(),
            ruler: self.ruler.as_ref(),
            interaction: &self.interaction,
            candles: &self.candles,
            visible: true,
        };
        OverlayRenderer::default().render(&frame, vp, &ApproxTextMetrics, 800.0, 400.0)
    }
}

fn trend(a: PointInTime, b: PointInTime) -> TrendLine {
    TrendLine::new(a, b, &DrawingDefaults::default())
}

fn fib(a: PointInTime, b: PointInTime) -> FibRetracement {
    FibRetracement::new(a, b, &DrawingDefaults::default())
}

fn with_trend(t: TrendLine) -> ChartDrawings {
    ChartDrawings { trend_lines: vec![t], fibs: Vec::new() }
}

fn with_fib(f: FibRetracement) -> ChartDrawings {
    ChartDrawings { trend_lines: Vec::new(), fibs: vec![f] }
}

#[test]
fn unextended_line_matches_projection() {
    let mut vp = viewport();
    let t = trend(point(10, 100.0), point(20, 120.0));
    let fx = Fixture::new(with_trend(t.clone()));
    for _ in 0..3 {
        let scene = fx.render(&vp);
        let lines: Vec<_> = scene.lines().collect();
        assert_eq!(lines.len(), 1);
        let (from, to, stroke) = lines[0];
        assert!(near(from, vp.project(t.start).unwrap(), 1.0));
        assert!(near(to, vp.project(t.end).unwrap(), 1.0));
        assert_eq!(stroke.width, 2.0);
        assert!(stroke.dash.is_empty());
        vp.zoom_at(200.0, 1.3);
        vp.pan(15.0, -10.0);
    }
}

#[test]
fn extension_is_drawn_beneath_the_segment() {
    let vp = viewport();
    let mut t = trend(point(10, 100.0), point(20, 120.0));
    t.extend_right = true;
    let scene = Fixture::new(with_trend(t.clone())).render(&vp);
    let lines: Vec<_> = scene.lines().collect();
    assert_eq!(lines.len(), 2);

    let (ext_from, ext_to, _) = lines[0];
    let (seg_from, seg_to, _) = lines[1];
    assert!(near(seg_from, at(10, 100.0), 1.0));
    assert!(near(seg_to, at(20, 120.0), 1.0));
    assert!(near(ext_from, at(10, 100.0), 1.0));
    assert_eq!(ext_to.x, 800.0);
    // Same slope: -40px over 80px.
    let slope = (ext_to.y - ext_from.y) / (ext_to.x - ext_from.x);
    assert!((slope - -0.5).abs() < 1e-4);
}

#[test]
fn selected_line_gets_handles_and_a_heavier_stroke() {
    let vp = viewport();
    let t = trend(point(10, 100.0), point(20, 120.0));
    let mut fx = Fixture::new(with_trend(t.clone()));
    fx.selected = Some(t.id.clone());
    let scene = fx.render(&vp);

    let widths: Vec<f32> = scene.lines().map(|(_, _, s)| s.width).collect();
    assert_eq!(widths, vec![2.0, 4.0]);
    let circles: Vec<_> = scene.circles().collect();
    assert_eq!(circles.len(), 2);
    assert!(near(circles[0].0, at(10, 100.0), 1.0));
    assert!(near(circles[1].0, at(20, 120.0), 1.0));
    assert!(circles.iter().all(|(_, r)| *r == 5.0));
}

#[test]
fn hidden_drawings_render_nothing() {
    let vp = viewport();
    let t = trend(point(10, 100.0), point(20, 120.0));
    let fx = Fixture::new(with_trend(t));
    let frame = OverlayFrame {
        drawings: &fx.drawings,
        selected: None,
        ruler: None,
        interaction: &fx.interaction,
        candles: &fx.candles,
        visible: false,
    };
    let scene = OverlayRenderer::default().render(&frame, &vp, &ApproxTextMetrics, 800.0, 400.0);
    assert!(scene.is_empty());
}

fn level_ys(scene: &OverlayScene) -> Vec<f32> {
    scene
        .lines()
        .filter(|(from, to, _)| from.y == to.y && from.x == 0.0 && to.x == 800.0)
        .map(|(from, _, _)| from.y)
        .collect()
}

#[test]
fn fib_levels_run_from_start_to_end_price() {
    let vp = viewport();
    for (start, end) in [(100.0, 150.0), (150.0, 100.0)] {
        let scene = Fixture::new(with_fib(fib(point(10, start), point(30, end)))).render(&vp);
        let ys = level_ys(&scene);
        assert_eq!(ys.len(), 7);
        assert!((ys[0] - price_y(start)).abs() <= 1.0);
        assert!((ys[6] - price_y(end)).abs() <= 1.0);
        let rising = ys[6] < ys[0];
        for w in ys.windows(2) {
            assert!(if rising { w[1] < w[0] } else { w[1] > w[0] }, "levels out of order: {ys:?}");
        }

        let labels: Vec<&str> = scene.labels().map(|(_, t)| t).collect();
        assert_eq!(labels.first().copied(), Some(format!("0.0% (${start:.2})").as_str()));
        assert_eq!(labels.last().copied(), Some(format!("100.0% (${end:.2})").as_str()));
    }
}

#[test]
fn fib_has_six_translucent_bands() {
    let vp = viewport();
    let theme = Theme::dark();
    let scene = Fixture::new(with_fib(fib(point(10, 100.0), point(30, 150.0)))).render(&vp);
    let bands: Vec<_> = scene
        .primitives
        .iter()
        .filter_map(|p| match p {
            Primitive::FillRect { rect, color } if *color != theme.label_background => Some((*rect, *color)),
            _ => None,
        })
        .collect();
    assert_eq!(bands.len(), 6);
    for (i, (rect, color)) in bands.iter().enumerate() {
        assert_eq!(*color, theme.fib_bands[i + 1]);
        assert_eq!(rect.left, 0.0);
        assert_eq!(rect.right, 800.0);
        assert!(rect.height() > 0.0);
    }
}

#[test]
fn flat_ruler_reports_zero_percent() {
    let vp = viewport();
    let mut fx = Fixture::new(ChartDrawings::default());
    fx.ruler = Some(Ruler::new(point(10, 100.0), point(20, 100.0)));
    let scene = fx.render(&vp);
    let labels: Vec<&str> = scene.labels().map(|(_, t)| t).collect();
    assert_eq!(labels[0], "$0.00 (0.00%)");
    assert!(!labels[0].contains("NaN"));

    let mut zero = Fixture::new(ChartDrawings::default());
    zero.ruler = Some(Ruler::new(point(10, 0.0), point(20, 0.0)));
    let scene = zero.render(&vp);
    assert_eq!(scene.labels().next().map(|(_, t)| t), Some("$0.00 (0.00%)"));
}

#[test]
fn falling_ruler_is_red_with_stats() {
    let vp = viewport();
    let theme = Theme::dark();
    let mut fx = Fixture::new(ChartDrawings::default());
    fx.ruler = Some(Ruler::new(point(10, 100.0), point(20, 90.0)));
    let scene = fx.render(&vp);

    let fill = scene.primitives.iter().find_map(|p| match p {
        Primitive::FillRect { color, .. } => Some(*color),
        _ => None,
    });
    assert_eq!(fill, Some(theme.ruler_down_fill));
    let labels: Vec<&str> = scene.labels().map(|(_, t)| t).collect();
    assert_eq!(labels, vec!["-$10.00 (-10.00%)", "10 bars, 10d", "Vol 11.00K"]);
    assert!(scene.primitives.iter().any(|p| matches!(p,
        Primitive::Polyline { points, stroke } if points.len() == 3 && stroke.dash == vec![2.0, 4.0])));
}

#[test]
fn ruler_label_flips_and_stays_on_screen() {
    let vp = viewport();
    let mut fx = Fixture::new(ChartDrawings::default());
    fx.ruler = Some(Ruler::new(point(80, 100.0), point(98, 199.0)));
    let scene = fx.render(&vp);
    let (origin, _) = scene.labels().next().unwrap();
    let end = at(98, 199.0);
    assert!(origin.x < end.x, "label should sit left of the end point");
    // Box top clamped to 10px, first baseline 20px below it.
    assert_eq!(origin.y, 30.0);
}

#[test]
fn trend_preview_is_dashed_to_the_cursor() {
    let vp = viewport();
    let mut fx = Fixture::new(ChartDrawings::default());
    fx.interaction = InteractionState::Drawing {
        tool: Tool::TrendLine,
        start: point(10, 100.0),
        cursor: Some(Point::new(300.0, 150.0)),
        pointer: PointerId::MOUSE,
    };
    let scene = fx.render(&vp);
    let (from, to, stroke) = scene.lines().next().unwrap();
    assert!(near(from, at(10, 100.0), 1.0));
    assert_eq!(to, Point::new(300.0, 150.0));
    assert_eq!(stroke.dash, vec![5.0, 5.0]);
    assert_eq!(stroke.width, 2.0);
}

#[test]
fn fib_preview_uses_fib_levels() {
    let vp = viewport();
    let mut fx = Fixture::new(ChartDrawings::default());
    fx.interaction = InteractionState::Drawing {
        tool: Tool::Fib,
        start: point(10, 100.0),
        cursor: Some(at(30, 150.0)),
        pointer: PointerId::MOUSE,
    };
    assert_eq!(level_ys(&fx.render(&vp)).len(), 7);
}

#[test]
fn dragging_renders_the_staged_geometry() {
    let vp = viewport();
    let t = trend(point(10, 100.0), point(20, 120.0));
    let candles = candles(BARS);
    let mut host = NoopGestures;
    let mut ann = Annotator::default().with_drawings(with_trend(t.clone()));
    ann.pointer_down(PointerId::MOUSE, at(15, 110.0), &vp, &mut host);
    ann.pointer_move(PointerId::MOUSE, at(25, 110.0), &vp);

    let scene = OverlayRenderer::default().render(&ann.frame(&candles), &vp, &ApproxTextMetrics, 800.0, 400.0);
    let (from, to, _) = scene.lines().next().unwrap();
    assert!(near(from, at(20, 100.0), 1.0));
    assert!(near(to, at(30, 120.0), 1.0));
    // Persisted geometry is untouched until release.
    assert_eq!(ann.drawings().trend_lines[0], t);
}

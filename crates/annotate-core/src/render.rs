// File: crates/annotate-core/src/render.rs
// Summary: Builds the overlay display list (lines, bands, handles, labels) for one frame.
// Notes:
// - Rendering is a pure function of its inputs; nothing here touches the model.
// - Anything whose anchor points do not project is skipped for this frame.

use crate::config::{OverlayConfig, StyleConfig};
use crate::drawing::{ChartDrawings, Drawing, DrawingDefaults, DrawingId, FibRetracement, PointInTime, Ruler, TrendLine};
use crate::geometry::{clamp, extend_segment, Point, Rect};
use crate::interaction::InteractionState;
use crate::measure::{format_currency, RulerStats};
use crate::series::Candle;
use crate::style::{Color, LineStyle};
use crate::text::TextMetrics;
use crate::theme::Theme;
use crate::tool::Tool;
use crate::viewport::ViewportMapper;

/// Retracement ratios drawn for every fib.
pub const FIB_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

const LABEL_LINE_HEIGHT: f32 = 18.0;
const RULER_BOX_MIN_WIDTH: f32 = 160.0;
const FIB_BOX_MIN_WIDTH: f32 = 150.0;
const EDGE_MARGIN: f32 = 10.0;

#[derive(Clone, Debug, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
    /// On/off intervals; empty is solid.
    pub dash: Vec<f32>,
}

impl Stroke {
    pub fn solid(color: Color, width: f32) -> Self {
        Self { color, width, dash: Vec::new() }
    }

    pub fn dashed(color: Color, width: f32, dash: &[f32]) -> Self {
        Self { color, width, dash: dash.to_vec() }
    }

    pub fn styled(color: Color, width: f32, style: LineStyle) -> Self {
        Self::dashed(color, width, style.dash_pattern())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Line { from: Point, to: Point, stroke: Stroke },
    Polyline { points: Vec<Point>, stroke: Stroke },
    FillRect { rect: Rect, color: Color },
    StrokeRect { rect: Rect, stroke: Stroke },
    Circle { center: Point, radius: f32, fill: Color },
    /// Single line of text; `origin` is the left end of the baseline.
    Label { origin: Point, text: String, size: f32, color: Color },
}

/// Display list for one overlay frame, in paint order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayScene {
    pub width: f32,
    pub height: f32,
    pub primitives: Vec<Primitive>,
}

impl OverlayScene {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height, primitives: Vec::new() }
    }

    pub fn push(&mut self, p: Primitive) {
        self.primitives.push(p);
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn lines(&self) -> impl Iterator<Item = (Point, Point, &Stroke)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Line { from, to, stroke } => Some((*from, *to, stroke)),
            _ => None,
        })
    }

    pub fn circles(&self) -> impl Iterator<Item = (Point, f32)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Circle { center, radius, .. } => Some((*center, *radius)),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = (Point, &str)> + '_ {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Label { origin, text, .. } => Some((*origin, text.as_str())),
            _ => None,
        })
    }
}

/// Everything one render pass reads.
#[derive(Clone, Copy, Debug)]
pub struct OverlayFrame<'a> {
    pub drawings: &'a ChartDrawings,
    pub selected: Option<&'a DrawingId>,
    pub ruler: Option<&'a Ruler>,
    pub interaction: &'a InteractionState,
    pub candles: &'a [Candle],
    pub visible: bool,
}

#[derive(Clone, Debug, Default)]
pub struct OverlayRenderer {
    pub theme: Theme,
    pub style: StyleConfig,
}

impl OverlayRenderer {
    pub fn new(theme: Theme, style: StyleConfig) -> Self {
        Self { theme, style }
    }

    pub fn from_config(config: &OverlayConfig) -> Self {
        Self::new(config.theme(), config.style.clone())
    }

    fn defaults(&self) -> &DrawingDefaults {
        &self.style.defaults
    }

    /// Build the scene for `frame` on a `width` x `height` surface.
    pub fn render(&self, frame: &OverlayFrame<'_>, mapper: &dyn ViewportMapper, metrics: &dyn TextMetrics, width: f32, height: f32) -> OverlayScene {
        let mut scene = OverlayScene::new(width, height);
        if !frame.visible {
            return scene;
        }
        let ctx = Ctx { mapper, metrics, plot: mapper.plot_rect(), candles: frame.candles };
        let staged = match frame.interaction {
            InteractionState::Dragging(s) => Some(&s.staged),
            _ => None,
        };

        for line in &frame.drawings.trend_lines {
            let line = match staged {
                Some(Drawing::TrendLine(t)) if t.id == line.id => t,
                _ => line,
            };
            self.trend_line(&mut scene, &ctx, line, frame.selected == Some(&line.id));
        }
        if let Some(ruler) = frame.ruler {
            self.ruler(&mut scene, &ctx, ruler);
        }
        for fib in &frame.drawings.fibs {
            let fib = match staged {
                Some(Drawing::Fib(f)) if f.id == fib.id => f,
                _ => fib,
            };
            self.fib(&mut scene, &ctx, fib, frame.selected == Some(&fib.id));
        }
        if let InteractionState::Drawing { tool, start, cursor: Some(cursor), .. } = frame.interaction {
            self.preview(&mut scene, &ctx, *tool, *start, *cursor);
        }
        scene
    }

    fn trend_line(&self, scene: &mut OverlayScene, ctx: &Ctx<'_>, line: &TrendLine, selected: bool) {
        let (Some(a), Some(b)) = (ctx.mapper.project(line.start), ctx.mapper.project(line.end)) else {
            return;
        };
        let stroke = Stroke::styled(line.color, line.line_width, line.line_style);
        if line.extend_left || line.extend_right {
            let (from, to) = extend_segment(a, b, &ctx.plot, line.extend_left, line.extend_right);
            scene.push(Primitive::Line { from, to, stroke: stroke.clone() });
        }
        scene.push(Primitive::Line { from: a, to: b, stroke: stroke.clone() });
        if selected {
            let width = line.line_width + self.style.selection_extra_width;
            scene.push(Primitive::Line { from: a, to: b, stroke: Stroke { width, ..stroke } });
            self.handles(scene, a, b);
        }
    }

    fn fib(&self, scene: &mut OverlayScene, ctx: &Ctx<'_>, fib: &FibRetracement, selected: bool) {
        let Some(end) = ctx.mapper.project(fib.end) else {
            return;
        };
        // Levels only depend on price; any resolvable bar time gives the y.
        let anchor = if ctx.mapper.time_to_logical(fib.start.time).is_some() { fib.start.time } else { fib.end.time };
        let level_y = |ratio: f64| ctx.mapper.to_screen(anchor, fib.level_price(ratio)).map(|p| p.y);
        let (left, right) = (ctx.plot.left, ctx.plot.right);

        for (i, pair) in FIB_RATIOS.windows(2).enumerate() {
            if let (Some(y1), Some(y2)) = (level_y(pair[0]), level_y(pair[1])) {
                let rect = Rect::from_ltrb(left, y1.min(y2), right, y1.max(y2));
                scene.push(Primitive::FillRect { rect, color: self.theme.fib_bands[i + 1] });
            }
        }

        let size = self.style.label_font_size;
        let stroke = Stroke::styled(fib.color, fib.line_width, fib.line_style);
        for ratio in FIB_RATIOS {
            let Some(y) = level_y(ratio) else { continue };
            scene.push(Primitive::Line { from: Point::new(left, y), to: Point::new(right, y), stroke: stroke.clone() });
            let text = format!("{:.1}% ({})", ratio * 100.0, format_currency(fib.level_price(ratio)));
            let w = (ctx.metrics.text_width(&text, size) + 10.0).max(FIB_BOX_MIN_WIDTH);
            let rect = Rect::from_ltwh(left + 5.0, y - 14.0, w, LABEL_LINE_HEIGHT);
            scene.push(Primitive::FillRect { rect, color: self.theme.label_background });
            scene.push(Primitive::Label { origin: Point::new(left + 10.0, y - 2.0), text, size, color: fib.color });
        }

        if selected {
            if let Some(start) = ctx.mapper.project(fib.start) {
                self.handles(scene, start, end);
            }
        }
    }

    fn ruler(&self, scene: &mut OverlayScene, ctx: &Ctx<'_>, ruler: &Ruler) {
        let (Some(a), Some(b)) = (ctx.mapper.project(ruler.start), ctx.mapper.project(ruler.end)) else {
            return;
        };
        let rising = ruler.is_rising();
        let (color, fill) = if rising {
            (self.theme.ruler_up, self.theme.ruler_up_fill)
        } else {
            (self.theme.ruler_down, self.theme.ruler_down_fill)
        };
        scene.push(Primitive::FillRect { rect: Rect::from_corners(a, b), color: fill });
        scene.push(Primitive::Polyline {
            points: vec![a, Point::new(b.x, a.y), b],
            stroke: Stroke::dashed(color, 1.0, LineStyle::Dotted.dash_pattern()),
        });

        let size = self.style.label_font_size;
        let lines = RulerStats::measure(ruler, ctx.candles, ctx.mapper).lines();
        let text_w = lines.iter().map(|l| ctx.metrics.text_width(l, size)).fold(0.0_f32, f32::max);
        let w = (text_w + 20.0).max(RULER_BOX_MIN_WIDTH);
        let h = 10.0 + lines.len() as f32 * LABEL_LINE_HEIGHT;
        let origin = ruler_label_origin(b, w, h, &ctx.plot);
        let rect = Rect::from_ltwh(origin.x, origin.y, w, h);
        scene.push(Primitive::FillRect { rect, color: self.theme.label_background });
        scene.push(Primitive::StrokeRect { rect, stroke: Stroke::solid(color, 1.0) });
        for (i, text) in lines.into_iter().enumerate() {
            let baseline = Point::new(origin.x + 10.0, origin.y + 20.0 + i as f32 * LABEL_LINE_HEIGHT);
            scene.push(Primitive::Label { origin: baseline, text, size, color });
        }
    }

    fn preview(&self, scene: &mut OverlayScene, ctx: &Ctx<'_>, tool: Tool, start: PointInTime, cursor: Point) {
        match tool {
            Tool::Pan => {}
            Tool::TrendLine => {
                let Some(a) = ctx.mapper.project(start) else { return };
                let stroke = Stroke::dashed(self.theme.preview, self.style.preview_width, &self.style.preview_dash);
                scene.push(Primitive::Line { from: a, to: cursor, stroke });
            }
            Tool::Fib | Tool::Ruler => {
                let Some(end) = ctx.mapper.to_data(cursor.x, cursor.y) else { return };
                match tool.build(start, end, self.defaults()) {
                    Some(Drawing::Fib(f)) => self.fib(scene, ctx, &f, false),
                    Some(Drawing::Ruler(r)) => self.ruler(scene, ctx, &r),
                    _ => {}
                }
            }
        }
    }

    fn handles(&self, scene: &mut OverlayScene, a: Point, b: Point) {
        for center in [a, b] {
            scene.push(Primitive::Circle { center, radius: self.style.handle_radius, fill: self.theme.handle });
        }
    }
}

struct Ctx<'a> {
    mapper: &'a dyn ViewportMapper,
    metrics: &'a dyn TextMetrics,
    plot: Rect,
    candles: &'a [Candle],
}

/// Top-left of the ruler label: right of the end point, or left of it when
/// that would overflow, vertically centred and kept inside the plot.
pub fn ruler_label_origin(end: Point, w: f32, h: f32, plot: &Rect) -> Point {
    let mut x = end.x + 15.0;
    if x + w > plot.right {
        x = end.x - w - 15.0;
    }
    let lo = plot.top + EDGE_MARGIN;
    let hi = (plot.bottom - EDGE_MARGIN - h).max(lo);
    Point::new(x, clamp(end.y - h / 2.0, lo, hi))
}

// File: crates/annotate-core/src/drawing.rs
// Summary: Drawing entities (trend line, fib retracement, ruler) and the persisted per-chart collection.
// Notes:
// - `ChartDrawings` is never edited in place by the interaction code: every
//   mutation goes through a `with_*`/`without` method returning a new value
//   that replaces the old one wholesale.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::style::{Color, LineStyle, StylePatch};
use crate::types::Time;

/// Data-space coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointInTime {
    pub time: Time,
    pub price: f64,
}

impl PointInTime {
    pub const fn new(time: Time, price: f64) -> Self {
        Self { time, price }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DrawingKind {
    TrendLine,
    Fib,
    Ruler,
}

impl DrawingKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DrawingKind::TrendLine => "trend",
            DrawingKind::Fib => "fib",
            DrawingKind::Ruler => "ruler",
        }
    }
}

/// Globally unique drawing identifier, `"<kind>-<uuid>"`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DrawingId(String);

impl DrawingId {
    pub fn generate(kind: DrawingKind) -> Self {
        Self(format!("{}-{}", kind.prefix(), Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DrawingId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for DrawingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Style applied to freshly created drawings.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawingDefaults {
    pub trend_color: Color,
    pub trend_width: f32,
    pub trend_style: LineStyle,
    pub fib_color: Color,
    pub fib_width: f32,
    pub fib_style: LineStyle,
}

impl Default for DrawingDefaults {
    fn default() -> Self {
        Self {
            trend_color: Color::WHITE,
            trend_width: 2.0,
            trend_style: LineStyle::Solid,
            fib_color: Color::rgb(0x38, 0xbd, 0xf8),
            fib_width: 1.0,
            fib_style: LineStyle::Solid,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendLine {
    pub id: DrawingId,
    pub start: PointInTime,
    pub end: PointInTime,
    pub color: Color,
    pub line_width: f32,
    pub line_style: LineStyle,
    #[serde(default)]
    pub extend_left: bool,
    #[serde(default)]
    pub extend_right: bool,
}

impl TrendLine {
    pub fn new(start: PointInTime, end: PointInTime, defaults: &DrawingDefaults) -> Self {
        Self {
            id: DrawingId::generate(DrawingKind::TrendLine),
            start,
            end,
            color: defaults.trend_color,
            line_width: defaults.trend_width,
            line_style: defaults.trend_style,
            extend_left: false,
            extend_right: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FibRetracement {
    pub id: DrawingId,
    pub start: PointInTime,
    pub end: PointInTime,
    pub color: Color,
    pub line_width: f32,
    pub line_style: LineStyle,
}

impl FibRetracement {
    pub fn new(start: PointInTime, end: PointInTime, defaults: &DrawingDefaults) -> Self {
        Self {
            id: DrawingId::generate(DrawingKind::Fib),
            start,
            end,
            color: defaults.fib_color,
            line_width: defaults.fib_width,
            line_style: defaults.fib_style,
        }
    }

    /// Price at `ratio` of the move from start to end.
    pub fn level_price(&self, ratio: f64) -> f64 {
        self.start.price + (self.end.price - self.start.price) * ratio
    }
}

/// Measuring ruler. Lives only until the next pointer-down and is never persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct Ruler {
    pub id: DrawingId,
    pub start: PointInTime,
    pub end: PointInTime,
}

impl Ruler {
    pub fn new(start: PointInTime, end: PointInTime) -> Self {
        Self { id: DrawingId::generate(DrawingKind::Ruler), start, end }
    }

    pub fn price_delta(&self) -> f64 {
        self.end.price - self.start.price
    }

    /// Percent change from start to end; 0 when the start price is 0.
    pub fn percent_change(&self) -> f64 {
        if self.start.price == 0.0 {
            0.0
        } else {
            self.price_delta() / self.start.price * 100.0
        }
    }

    pub fn is_rising(&self) -> bool {
        self.end.price >= self.start.price
    }
}

/// Enum wrapping all drawing types.
#[derive(Clone, Debug, PartialEq)]
pub enum Drawing {
    TrendLine(TrendLine),
    Fib(FibRetracement),
    Ruler(Ruler),
}

impl Drawing {
    pub fn id(&self) -> &DrawingId {
        match self {
            Drawing::TrendLine(d) => &d.id,
            Drawing::Fib(d) => &d.id,
            Drawing::Ruler(d) => &d.id,
        }
    }

    pub fn start(&self) -> PointInTime {
        match self {
            Drawing::TrendLine(d) => d.start,
            Drawing::Fib(d) => d.start,
            Drawing::Ruler(d) => d.start,
        }
    }

    pub fn end(&self) -> PointInTime {
        match self {
            Drawing::TrendLine(d) => d.end,
            Drawing::Fib(d) => d.end,
            Drawing::Ruler(d) => d.end,
        }
    }

    /// Copy of this drawing with new endpoints, id and style preserved.
    pub fn with_endpoints(&self, start: PointInTime, end: PointInTime) -> Drawing {
        let mut out = self.clone();
        match &mut out {
            Drawing::TrendLine(d) => { d.start = start; d.end = end; }
            Drawing::Fib(d) => { d.start = start; d.end = end; }
            Drawing::Ruler(d) => { d.start = start; d.end = end; }
        }
        out
    }

    /// Apply a style patch; returns `false` when nothing changed.
    pub fn apply_style(&mut self, patch: &StylePatch) -> bool {
        let before = self.clone();
        match self {
            Drawing::TrendLine(d) => {
                if let Some(c) = patch.color { d.color = c; }
                if let Some(w) = patch.line_width { d.line_width = w.max(0.5); }
                if let Some(s) = patch.line_style { d.line_style = s; }
                if let Some(on) = patch.extend_left { d.extend_left = on; }
                if let Some(on) = patch.extend_right { d.extend_right = on; }
            }
            Drawing::Fib(d) => {
                if let Some(c) = patch.color { d.color = c; }
                if let Some(w) = patch.line_width { d.line_width = w.max(0.5); }
                if let Some(s) = patch.line_style { d.line_style = s; }
            }
            Drawing::Ruler(_) => {}
        }
        *self != before
    }
}

/// Persisted drawings of one chart, JSON shape `{ "trendLines": [...], "fibs": [...] }`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDrawings {
    pub trend_lines: Vec<TrendLine>,
    pub fibs: Vec<FibRetracement>,
}

impl ChartDrawings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.trend_lines.len() + self.fibs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &DrawingId) -> bool {
        self.trend_lines.iter().any(|d| &d.id == id) || self.fibs.iter().any(|d| &d.id == id)
    }

    pub fn get(&self, id: &DrawingId) -> Option<Drawing> {
        if let Some(t) = self.trend_lines.iter().find(|d| &d.id == id) {
            return Some(Drawing::TrendLine(t.clone()));
        }
        self.fibs.iter().find(|d| &d.id == id).map(|f| Drawing::Fib(f.clone()))
    }

    /// `(id, start, end)` of every drawing in hit-test order: trend lines, then fibs.
    pub fn segments(&self) -> impl Iterator<Item = (&DrawingId, PointInTime, PointInTime)> + '_ {
        self.trend_lines
            .iter()
            .map(|d| (&d.id, d.start, d.end))
            .chain(self.fibs.iter().map(|d| (&d.id, d.start, d.end)))
    }

    /// Collection with `drawing` appended. `None` for rulers and duplicate ids.
    pub fn with_added(&self, drawing: Drawing) -> Option<Self> {
        if self.contains(drawing.id()) {
            return None;
        }
        let mut next = self.clone();
        match drawing {
            Drawing::TrendLine(t) => next.trend_lines.push(t),
            Drawing::Fib(f) => next.fibs.push(f),
            Drawing::Ruler(_) => return None,
        }
        Some(next)
    }

    /// Collection with the drawing of the same id swapped for `drawing`.
    pub fn with_replaced(&self, drawing: &Drawing) -> Option<Self> {
        let mut next = self.clone();
        match drawing {
            Drawing::TrendLine(t) => {
                let slot = next.trend_lines.iter_mut().find(|d| d.id == t.id)?;
                *slot = t.clone();
            }
            Drawing::Fib(f) => {
                let slot = next.fibs.iter_mut().find(|d| d.id == f.id)?;
                *slot = f.clone();
            }
            Drawing::Ruler(_) => return None,
        }
        Some(next)
    }

    /// Collection without `id`. `None` when the id is not present.
    pub fn without(&self, id: &DrawingId) -> Option<Self> {
        if !self.contains(id) {
            return None;
        }
        let mut next = self.clone();
        next.trend_lines.retain(|d| &d.id != id);
        next.fibs.retain(|d| &d.id != id);
        Some(next)
    }

    /// Collection with `patch` applied to `id`. `None` when absent or unchanged.
    pub fn with_style(&self, id: &DrawingId, patch: &StylePatch) -> Option<Self> {
        let mut drawing = self.get(id)?;
        if !drawing.apply_style(patch) {
            return None;
        }
        self.with_replaced(&drawing)
    }

    /// Drop drawings whose id was already seen; returns how many were removed.
    pub fn dedup_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let before = self.len();
        self.trend_lines.retain(|d| seen.insert(d.id.clone()));
        self.fibs.retain(|d| seen.insert(d.id.clone()));
        before - self.len()
    }
}

// File: crates/annotate-core/src/indicator.rs
// Summary: Indicator configs and their chart series (Bollinger Bands, Stochastic RSI), plus the oscillator pane.
// Notes:
// - Series are created lazily per config id and then only updated; a group is
//   torn down when its id leaves the config list.
// - Only the first Stochastic RSI config gets a resizable oscillator pane.

use std::collections::{BTreeMap, HashMap};

use log::debug;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::PaneConfig;
use crate::geometry::clamp;
use crate::interaction::CursorIcon;
use crate::style::{Color, LineStyle};
use crate::types::Time;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BollingerSettings {
    pub period: u32,
    pub std_dev: f64,
}

impl Default for BollingerSettings {
    fn default() -> Self {
        Self { period: 20, std_dev: 2.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StochRsiSettings {
    pub rsi_period: u32,
    pub stochastic_period: u32,
    pub k_period: u32,
    pub d_period: u32,
}

impl Default for StochRsiSettings {
    fn default() -> Self {
        Self { rsi_period: 14, stochastic_period: 14, k_period: 3, d_period: 3 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "settings")]
pub enum IndicatorKind {
    #[serde(rename = "bollingerBands")]
    BollingerBands(BollingerSettings),
    #[serde(rename = "stochasticRSI")]
    StochasticRsi(StochRsiSettings),
}

impl IndicatorKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            IndicatorKind::BollingerBands(_) => "bollingerBands",
            IndicatorKind::StochasticRsi(_) => "stochasticRSI",
        }
    }

    fn same_type(&self, other: &IndicatorKind) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// One indicator on a chart, JSON `{ id, type, settings, isVisible }`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorConfig {
    pub id: String,
    #[serde(flatten)]
    pub kind: IndicatorKind,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
}

fn visible_by_default() -> bool {
    true
}

impl IndicatorConfig {
    pub fn new(kind: IndicatorKind) -> Self {
        Self { id: format!("{}-{}", kind.type_name(), Uuid::new_v4().simple()), kind, is_visible: true }
    }

    pub fn is_stochastic(&self) -> bool {
        matches!(self.kind, IndicatorKind::StochasticRsi(_))
    }

    /// Price scale the oscillator series live on.
    pub fn pane_scale(&self) -> PriceScale {
        PriceScale::Pane(format!("stoch-pane-{}", self.id))
    }
}

/// Add `config`, or replace the one with the same id keeping its visibility.
/// New configs start visible.
pub fn upsert(configs: &[IndicatorConfig], config: IndicatorConfig) -> Vec<IndicatorConfig> {
    let mut next = configs.to_vec();
    match next.iter_mut().find(|c| c.id == config.id) {
        Some(slot) => slot.kind = config.kind,
        None => next.push(IndicatorConfig { is_visible: true, ..config }),
    }
    next
}

pub fn remove(configs: &[IndicatorConfig], id: &str) -> Vec<IndicatorConfig> {
    configs.iter().filter(|c| c.id != id).cloned().collect()
}

pub fn toggle_visibility(configs: &[IndicatorConfig], id: &str) -> Vec<IndicatorConfig> {
    configs
        .iter()
        .map(|c| if c.id == id { IndicatorConfig { is_visible: !c.is_visible, ..c.clone() } } else { c.clone() })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct BollingerPoint {
    pub time: Time,
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StochRsiPoint {
    pub time: Time,
    pub k: f64,
    pub d: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LinePoint {
    pub time: Time,
    pub value: f64,
}

/// Precomputed indicator values keyed by config id.
#[derive(Clone, Debug, Default)]
pub struct IndicatorData {
    pub bollinger: HashMap<String, Vec<BollingerPoint>>,
    pub stoch_rsi: HashMap<String, Vec<StochRsiPoint>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum PriceScale {
    Main,
    Pane(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct LineSeriesSpec {
    pub color: Color,
    pub line_width: f32,
    pub line_style: LineStyle,
    pub price_scale: PriceScale,
    pub last_value_visible: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PriceLineSpec {
    pub price: f64,
    pub color: Color,
    pub line_style: LineStyle,
    pub title: String,
}

/// Fractions of the pane height kept free above and below a price scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleMargins {
    pub top: f32,
    pub bottom: f32,
}

/// Opaque handle to a series owned by the chart engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesHandle(pub u64);

/// Series and price-scale operations of the chart engine.
pub trait IndicatorHost {
    fn add_line_series(&mut self, spec: &LineSeriesSpec) -> SeriesHandle;
    fn remove_series(&mut self, series: SeriesHandle);
    fn set_series_data(&mut self, series: SeriesHandle, data: &[LinePoint]);
    fn set_series_visible(&mut self, series: SeriesHandle, visible: bool);
    fn add_price_line(&mut self, series: SeriesHandle, line: &PriceLineSpec);
    fn set_price_scale_visible(&mut self, scale: &PriceScale, visible: bool);
    fn set_price_scale_margins(&mut self, scale: &PriceScale, margins: ScaleMargins);
}

const BAND_COLOR: Color = Color::rgb(0x38, 0xbd, 0xf8);
const BAND_MIDDLE_COLOR: Color = Color::rgb(0xfa, 0xcc, 0x15);
const STOCH_K_COLOR: Color = Color::rgb(0x38, 0xbd, 0xf8);
const STOCH_D_COLOR: Color = Color::rgb(0xf4, 0x72, 0xb6);
const OVERBOUGHT_COLOR: Color = Color::rgb(0xf8, 0x71, 0x71);
const OVERSOLD_COLOR: Color = Color::rgb(0x4a, 0xde, 0x80);

#[derive(Clone, Debug, PartialEq)]
struct SeriesGroup {
    kind: IndicatorKind,
    series: Vec<SeriesHandle>,
}

/// Keeps chart series in step with the indicator config list.
#[derive(Clone, Debug, Default)]
pub struct IndicatorOverlayManager {
    groups: BTreeMap<String, SeriesGroup>,
}

impl IndicatorOverlayManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn series_for(&self, id: &str) -> Option<&[SeriesHandle]> {
        self.groups.get(id).map(|g| g.series.as_slice())
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn sync(&mut self, host: &mut dyn IndicatorHost, configs: &[IndicatorConfig], data: &IndicatorData, indicators_visible: bool) {
        let stale: Vec<String> = self
            .groups
            .iter()
            .filter(|(id, g)| !configs.iter().any(|c| &c.id == *id && c.kind.same_type(&g.kind)))
            .map(|(id, _)| id.clone())
            .collect();
        for id in stale {
            if let Some(group) = self.groups.remove(&id) {
                debug!("removing {} series of indicator {id}", group.series.len());
                for s in group.series {
                    host.remove_series(s);
                }
            }
        }

        for config in configs {
            let group = self
                .groups
                .entry(config.id.clone())
                .or_insert_with(|| create_group(host, config));
            // Settings edits keep the same series.
            group.kind = config.kind;

            let visible = indicators_visible && config.is_visible;
            for &s in &group.series {
                host.set_series_visible(s, visible);
            }
            if config.is_stochastic() {
                host.set_price_scale_visible(&config.pane_scale(), visible);
            }
            push_data(host, config, &group.series, data);
        }
    }
}

fn create_group(host: &mut dyn IndicatorHost, config: &IndicatorConfig) -> SeriesGroup {
    debug!("creating series for {} {}", config.kind.type_name(), config.id);
    let line = |color, line_style, price_scale: PriceScale, last_value_visible| LineSeriesSpec {
        color,
        line_width: 1.0,
        line_style,
        price_scale,
        last_value_visible,
    };
    let series = match config.kind {
        IndicatorKind::BollingerBands(_) => vec![
            host.add_line_series(&line(BAND_COLOR, LineStyle::Dotted, PriceScale::Main, false)),
            host.add_line_series(&line(BAND_MIDDLE_COLOR, LineStyle::Dashed, PriceScale::Main, false)),
            host.add_line_series(&line(BAND_COLOR, LineStyle::Dotted, PriceScale::Main, false)),
        ],
        IndicatorKind::StochasticRsi(_) => {
            let scale = config.pane_scale();
            let k = host.add_line_series(&line(STOCH_K_COLOR, LineStyle::Solid, scale.clone(), true));
            let d = host.add_line_series(&line(STOCH_D_COLOR, LineStyle::Solid, scale, true));
            for (price, color) in [(80.0, OVERBOUGHT_COLOR), (20.0, OVERSOLD_COLOR)] {
                let spec = PriceLineSpec { price, color, line_style: LineStyle::Dashed, title: format!("{price}") };
                host.add_price_line(k, &spec);
            }
            vec![k, d]
        }
    };
    SeriesGroup { kind: config.kind, series }
}

fn push_data(host: &mut dyn IndicatorHost, config: &IndicatorConfig, series: &[SeriesHandle], data: &IndicatorData) {
    match config.kind {
        IndicatorKind::BollingerBands(_) => {
            let Some(points) = data.bollinger.get(&config.id) else { return };
            let pick: [fn(&BollingerPoint) -> f64; 3] = [|p| p.upper, |p| p.middle, |p| p.lower];
            for (&s, f) in series.iter().zip(pick) {
                let line: Vec<LinePoint> = points.iter().map(|p| LinePoint { time: p.time, value: f(p) }).collect();
                host.set_series_data(s, &line);
            }
        }
        IndicatorKind::StochasticRsi(_) => {
            let Some(points) = data.stoch_rsi.get(&config.id) else { return };
            let pick: [fn(&StochRsiPoint) -> f64; 2] = [|p| p.k, |p| p.d];
            for (&s, f) in series.iter().zip(pick) {
                let line: Vec<LinePoint> = points.iter().map(|p| LinePoint { time: p.time, value: f(p) }).collect();
                host.set_series_data(s, &line);
            }
        }
    }
}

/// Bottom pane holding the oscillator, resized by dragging its top boundary.
#[derive(Clone, Debug)]
pub struct OscillatorPane {
    config: PaneConfig,
    height: f32,
    container_height: f32,
    drag_y: Option<f32>,
}

impl OscillatorPane {
    pub fn new(config: PaneConfig) -> Self {
        Self { config, height: config.default_height, container_height: 0.0, drag_y: None }
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn container_height(&self) -> f32 {
        self.container_height
    }

    pub fn is_resizing(&self) -> bool {
        self.drag_y.is_some()
    }

    /// Y of the boundary between the main and oscillator panes.
    pub fn boundary_y(&self) -> f32 {
        self.container_height - self.height
    }

    pub fn hit(&self, y: f32) -> bool {
        self.container_height > 0.0 && (y - self.boundary_y()).abs() <= self.config.grab_px
    }

    pub fn cursor_at(&self, y: f32) -> Option<CursorIcon> {
        (self.is_resizing() || self.hit(y)).then_some(CursorIcon::ResizeVertical)
    }

    pub fn on_container_resize(&mut self, container_height: f32) {
        self.container_height = container_height.max(0.0);
        self.height = self.clamped(self.height);
    }

    /// Start a resize if `y` is on the boundary.
    pub fn begin_resize(&mut self, y: f32) -> bool {
        if !self.hit(y) {
            return false;
        }
        self.drag_y = Some(y);
        true
    }

    /// Follow the pointer; moving up grows the pane. Returns whether the height changed.
    pub fn drag_to(&mut self, y: f32) -> bool {
        let Some(last) = self.drag_y else {
            return false;
        };
        self.drag_y = Some(y);
        let next = self.clamped(self.height - (y - last));
        let changed = next != self.height;
        self.height = next;
        changed
    }

    pub fn end_resize(&mut self) {
        self.drag_y = None;
    }

    /// Height kept within `[min, container - reserve]`; the minimum wins when
    /// the container is too small for both.
    fn clamped(&self, h: f32) -> f32 {
        if self.container_height <= 0.0 {
            return h.max(self.config.min_height);
        }
        let hi = self.container_height - self.config.bottom_reserve;
        h.min(hi).max(self.config.min_height)
    }

    /// Main and oscillator scale margins for the current height.
    pub fn margins(&self) -> (ScaleMargins, ScaleMargins) {
        let ratio = if self.container_height > 0.0 { clamp(self.height / self.container_height, 0.0, 1.0) } else { 0.0 };
        (
            ScaleMargins { top: 0.05, bottom: ratio + 0.02 },
            ScaleMargins { top: 1.0 - ratio, bottom: 0.05 },
        )
    }

    /// Apply margins for `configs`: split with the first Stochastic RSI, or
    /// the default main margins when there is none.
    pub fn apply(&self, host: &mut dyn IndicatorHost, configs: &[IndicatorConfig]) {
        match configs.iter().find(|c| c.is_stochastic()) {
            Some(osc) if self.container_height > 0.0 => {
                let (main, pane) = self.margins();
                host.set_price_scale_margins(&PriceScale::Main, main);
                host.set_price_scale_margins(&osc.pane_scale(), pane);
            }
            _ => host.set_price_scale_margins(&PriceScale::Main, ScaleMargins { top: 0.05, bottom: 0.08 }),
        }
    }
}

impl Default for OscillatorPane {
    fn default() -> Self {
        Self::new(PaneConfig::default())
    }
}

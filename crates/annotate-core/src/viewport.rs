// File: crates/annotate-core/src/viewport.rs
// Summary: ViewportMapper contract between data space and screen space, plus a scale-backed implementation.
// Notes:
// - Every conversion returns `Option`; `None` means "not resolvable right now"
//   (outside the data, outside the plot, or before layout) and callers abort
//   the current step instead of failing.

use crate::drawing::PointInTime;
use crate::geometry::{Point, Rect};
use crate::scale::{Logical, PriceMapping, TimeScale, ValueScale};
use crate::series::{bar_times, price_range, Candle};
use crate::types::{Insets, Time};

/// Coordinate services supplied by the chart engine.
pub trait ViewportMapper {
    fn to_screen(&self, time: Time, price: f64) -> Option<Point>;
    fn to_data(&self, x: f32, y: f32) -> Option<PointInTime>;
    fn time_to_logical(&self, time: Time) -> Option<Logical>;
    fn logical_to_time(&self, logical: Logical) -> Option<Time>;
    /// Plotting area of the main pane in surface pixels.
    fn plot_rect(&self) -> Rect;

    fn project(&self, p: PointInTime) -> Option<Point> {
        self.to_screen(p.time, p.price)
    }
}

/// Viewport over a bar series laid out by a [`TimeScale`] and a [`ValueScale`].
#[derive(Clone, Debug)]
pub struct ScaleViewport {
    times: Vec<Time>,
    width: f32,
    height: f32,
    insets: Insets,
    time_scale: TimeScale,
    value_scale: ValueScale,
}

impl ScaleViewport {
    pub fn new(width: f32, height: f32, insets: Insets) -> Self {
        let plot = plot_rect_for(width, height, &insets);
        Self {
            times: Vec::new(),
            width,
            height,
            insets,
            time_scale: TimeScale::new(plot.left, 0.0, 1.0),
            value_scale: ValueScale::new_linear(plot.top, plot.bottom, 0.0, 1.0),
        }
    }

    /// Viewport fitted to `candles`: every bar visible, price range padded by 5%.
    pub fn with_candles(candles: &[Candle], width: f32, height: f32, insets: Insets) -> Self {
        let mut vp = Self::new(width, height, insets);
        vp.set_candles(candles);
        vp
    }

    pub fn set_candles(&mut self, candles: &[Candle]) {
        self.set_times(bar_times(candles));
        if let Some((lo, hi)) = price_range(candles) {
            let pad = ((hi - lo) * 0.05).max(1e-9);
            self.set_price_range(lo - pad, hi + pad);
        }
        self.fit_content();
    }

    /// Replace the bar times. Times must be strictly increasing.
    pub fn set_times(&mut self, times: Vec<Time>) {
        if times.windows(2).any(|w| w[0] >= w[1]) {
            log::warn!("bar times are not strictly increasing; time lookups may be wrong");
        }
        self.times = times;
    }

    pub fn times(&self) -> &[Time] {
        &self.times
    }

    pub fn set_price_range(&mut self, vmin: f64, vmax: f64) {
        let plot = self.plot_rect();
        self.value_scale = ValueScale::new_linear(plot.top, plot.bottom, vmin, vmax).with_mapping(self.value_scale.mapping);
    }

    pub fn set_price_mapping(&mut self, mapping: PriceMapping) {
        self.value_scale = self.value_scale.with_mapping(mapping);
    }

    /// Show every bar across the plot width, centred in its slot.
    pub fn fit_content(&mut self) {
        let plot = self.plot_rect();
        let n = self.times.len().max(1) as f32;
        self.time_scale = TimeScale::new(plot.left, -0.5, plot.width().max(1.0) / n);
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        let plot = self.plot_rect();
        self.time_scale.left_px = plot.left;
        self.value_scale = self.value_scale.with_pixels(plot.top, plot.bottom);
    }

    /// Drag the chart content by a pixel delta.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.time_scale.pan_px(dx);
        self.value_scale.pan_px(dy);
    }

    /// Scale bar spacing around the cursor column; `factor > 1` zooms in.
    pub fn zoom_at(&mut self, x: f32, factor: f32) {
        self.time_scale.zoom_at(x, factor);
    }

    pub fn time_scale(&self) -> &TimeScale {
        &self.time_scale
    }

    pub fn value_scale(&self) -> &ValueScale {
        &self.value_scale
    }

    fn is_laid_out(&self) -> bool {
        let plot = self.plot_rect();
        !self.times.is_empty() && plot.width() > 0.0 && plot.height() > 0.0
    }
}

impl ViewportMapper for ScaleViewport {
    fn to_screen(&self, time: Time, price: f64) -> Option<Point> {
        if !self.is_laid_out() || !price.is_finite() {
            return None;
        }
        let logical = self.time_to_logical(time)?;
        Some(Point::new(self.time_scale.to_px(logical), self.value_scale.to_px(price)))
    }

    fn to_data(&self, x: f32, y: f32) -> Option<PointInTime> {
        if !self.is_laid_out() || !self.plot_rect().contains(Point::new(x, y)) {
            return None;
        }
        let time = self.logical_to_time(self.time_scale.from_px(x))?;
        let price = self.value_scale.from_px(y);
        price.is_finite().then_some(PointInTime::new(time, price))
    }

    fn time_to_logical(&self, time: Time) -> Option<Logical> {
        let times = &self.times;
        match times.binary_search(&time) {
            Ok(i) => Some(i as Logical),
            Err(i) if i == 0 || i >= times.len() => None,
            Err(i) => {
                let (t0, t1) = (times[i - 1], times[i]);
                Some((i - 1) as Logical + (time - t0) as f64 / (t1 - t0) as f64)
            }
        }
    }

    fn logical_to_time(&self, logical: Logical) -> Option<Time> {
        if !logical.is_finite() {
            return None;
        }
        let idx = logical.round();
        if idx < 0.0 || idx >= self.times.len() as f64 {
            return None;
        }
        Some(self.times[idx as usize])
    }

    fn plot_rect(&self) -> Rect {
        plot_rect_for(self.width, self.height, &self.insets)
    }
}

fn plot_rect_for(width: f32, height: f32, insets: &Insets) -> Rect {
    Rect::from_ltrb(
        insets.left as f32,
        insets.top as f32,
        (width - insets.right as f32).max(insets.left as f32),
        (height - insets.bottom as f32).max(insets.top as f32),
    )
}

// File: crates/annotate-core/src/scale.rs
// Summary: Bar-index (X) and price (Y) pixel transforms with pan/zoom hooks used by `ScaleViewport`.

/// Logical X coordinate: bar index, fractional between bars.
pub type Logical = f64;

/// Horizontal scale: the logical index at the left plot edge plus pixels per bar.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeScale {
    pub left_px: f32,
    pub start_logical: Logical,
    pub bar_spacing: f32,
}

impl TimeScale {
    pub const MIN_SPACING: f32 = 0.5;
    pub const MAX_SPACING: f32 = 200.0;

    pub fn new(left_px: f32, start_logical: Logical, bar_spacing: f32) -> Self {
        Self { left_px, start_logical, bar_spacing: bar_spacing.max(0.01) }
    }

    #[inline]
    pub fn to_px(&self, logical: Logical) -> f32 {
        self.left_px + ((logical - self.start_logical) as f32) * self.bar_spacing
    }

    #[inline]
    pub fn from_px(&self, px: f32) -> Logical {
        self.start_logical + ((px - self.left_px) / self.bar_spacing) as f64
    }

    /// Rescale bar spacing by `factor`, keeping the bar under `cursor_px` fixed.
    pub fn zoom_at(&mut self, cursor_px: f32, factor: f32) {
        let anchor = self.from_px(cursor_px);
        self.bar_spacing = (self.bar_spacing * factor).clamp(Self::MIN_SPACING, Self::MAX_SPACING);
        self.start_logical = anchor - ((cursor_px - self.left_px) / self.bar_spacing) as f64;
    }

    /// Content follows the pointer: dragging right reveals earlier bars.
    pub fn pan_px(&mut self, dx_px: f32) {
        self.start_logical -= (dx_px / self.bar_spacing) as f64;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PriceMapping {
    #[default]
    Linear,
    Log10,
}

impl PriceMapping {
    fn forward(self, price: f64) -> f64 {
        match self {
            PriceMapping::Linear => price,
            PriceMapping::Log10 => price.max(1e-12).log10(),
        }
    }

    fn inverse(self, v: f64) -> f64 {
        match self {
            PriceMapping::Linear => v,
            PriceMapping::Log10 => 10f64.powf(v),
        }
    }
}

/// Vertical scale: price range `[vmin, vmax]` over `[bottom_px, top_px]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValueScale {
    pub top_px: f32,
    pub bottom_px: f32,
    pub vmin: f64,
    pub vmax: f64,
    pub mapping: PriceMapping,
}

impl ValueScale {
    pub fn new_linear(top_px: f32, bottom_px: f32, vmin: f64, vmax: f64) -> Self {
        let vmax = if (vmax - vmin).abs() < 1e-12 { vmin + 1.0 } else { vmax };
        Self { top_px, bottom_px, vmin, vmax, mapping: PriceMapping::Linear }
    }

    /// Log scale; the range is forced strictly positive.
    pub fn new_log10(top_px: f32, bottom_px: f32, vmin: f64, vmax: f64) -> Self {
        let vmin = vmin.max(1e-12);
        let vmax = if vmax <= vmin { vmin * 10.0 } else { vmax };
        Self { top_px, bottom_px, vmin, vmax, mapping: PriceMapping::Log10 }
    }

    pub fn with_mapping(&self, mapping: PriceMapping) -> Self {
        match mapping {
            PriceMapping::Linear => Self::new_linear(self.top_px, self.bottom_px, self.vmin, self.vmax),
            PriceMapping::Log10 => Self::new_log10(self.top_px, self.bottom_px, self.vmin, self.vmax),
        }
    }

    /// Same price range laid out over a new pixel span.
    pub fn with_pixels(&self, top_px: f32, bottom_px: f32) -> Self {
        Self { top_px, bottom_px, ..*self }
    }

    pub fn is_log(&self) -> bool {
        self.mapping == PriceMapping::Log10
    }

    fn span(&self) -> (f64, f64) {
        let lo = self.mapping.forward(self.vmin);
        let hi = self.mapping.forward(self.vmax);
        (lo, (hi - lo).max(1e-12))
    }

    #[inline]
    pub fn to_px(&self, price: f64) -> f32 {
        let (lo, span) = self.span();
        let h = (self.bottom_px - self.top_px) as f64;
        self.bottom_px - ((self.mapping.forward(price) - lo) / span * h) as f32
    }

    #[inline]
    pub fn from_px(&self, py: f32) -> f64 {
        let (lo, span) = self.span();
        let h = ((self.bottom_px - self.top_px) as f64).max(1e-6);
        let frac = (self.bottom_px - py) as f64 / h;
        self.mapping.inverse(lo + frac * span)
    }

    /// Shift the range so content follows a vertical drag of `dy_px`.
    pub fn pan_px(&mut self, dy_px: f32) {
        let (lo, span) = self.span();
        let delta = span * (dy_px / (self.bottom_px - self.top_px).max(1.0)) as f64;
        self.vmin = self.mapping.inverse(lo + delta);
        self.vmax = self.mapping.inverse(lo + span + delta);
    }
}

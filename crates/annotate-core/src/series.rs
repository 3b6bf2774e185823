// File: crates/annotate-core/src/series.rs
// Summary: Candle series the drawings are measured against (bar times, OHLC, volume).

use crate::types::Time;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candle {
    pub time: Time,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Try to construct a candle enforcing OHLC invariants:
    /// low <= min(open,close) and high >= max(open,close), and low <= high.
    pub fn try_new(time: Time, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Result<Self, &'static str> {
        let lo = open.min(close);
        let hi = open.max(close);
        if low > lo { return Err("low above min(open,close)"); }
        if high < hi { return Err("high below max(open,close)"); }
        if low > high { return Err("low above high"); }
        if volume < 0.0 { return Err("negative volume"); }
        Ok(Self { time, open, high, low, close, volume })
    }
}

/// Bar times in series order, the logical index of a bar is its position here.
pub fn bar_times(candles: &[Candle]) -> Vec<Time> {
    candles.iter().map(|c| c.time).collect()
}

/// Lowest low and highest high over `candles`, `None` when empty.
pub fn price_range(candles: &[Candle]) -> Option<(f64, f64)> {
    let mut min_p = f64::INFINITY;
    let mut max_p = f64::NEG_INFINITY;
    for c in candles {
        min_p = min_p.min(c.low);
        max_p = max_p.max(c.high);
    }
    if min_p.is_finite() && max_p.is_finite() { Some((min_p, max_p)) } else { None }
}

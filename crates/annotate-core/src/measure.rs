// File: crates/annotate-core/src/measure.rs
// Summary: Ruler statistics over the bar series and the number formats used by overlay labels.

use crate::drawing::Ruler;
use crate::series::Candle;
use crate::types::{Time, SECONDS_PER_DAY};
use crate::viewport::ViewportMapper;

/// What a ruler spans: price move, bar count, calendar days and traded volume.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RulerStats {
    pub price_delta: f64,
    pub percent: f64,
    pub bars: usize,
    pub days: i64,
    pub volume: f64,
}

impl RulerStats {
    /// Endpoints snap to their nearest bar (clamped to the series); the
    /// volume is summed over the inclusive index range.
    pub fn measure(ruler: &Ruler, candles: &[Candle], mapper: &dyn ViewportMapper) -> Self {
        let mut stats = Self {
            price_delta: ruler.price_delta(),
            percent: ruler.percent_change(),
            bars: 0,
            days: 0,
            volume: 0.0,
        };
        if candles.is_empty() {
            return stats;
        }
        let a = nearest_index(ruler.start.time, candles, mapper);
        let b = nearest_index(ruler.end.time, candles, mapper);
        let (lo, hi) = (a.min(b), a.max(b));
        stats.bars = hi - lo;
        stats.days = days_between(candles[lo].time, candles[hi].time);
        stats.volume = candles[lo..=hi].iter().map(|c| c.volume).sum();
        stats
    }

    /// Label lines: price move, span, volume.
    pub fn lines(&self) -> [String; 3] {
        [
            format!("{} ({:.2}%)", format_currency(self.price_delta), self.percent),
            format!("{} bars, {}d", self.bars, self.days),
            format!("Vol {}", format_volume(self.volume)),
        ]
    }
}

fn nearest_index(time: Time, candles: &[Candle], mapper: &dyn ViewportMapper) -> usize {
    let last = candles.len() - 1;
    if let Some(logical) = mapper.time_to_logical(time) {
        return (logical.round().max(0.0) as usize).min(last);
    }
    // Outside the mapped range: clamp to whichever end of the series is closer.
    if time <= candles[0].time { 0 } else { last }
}

/// Whole days between two times, rounded up.
pub fn days_between(a: Time, b: Time) -> i64 {
    let span = (b - a).abs();
    (span + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
}

/// US-dollar amount with thousands separators, e.g. `$1,234.56`, `-$10.00`.
pub fn format_currency(value: f64) -> String {
    if !value.is_finite() {
        return "$0.00".to_string();
    }
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

/// Compact volume: `1.23M`, `4.56K`, or the plain number below a thousand.
pub fn format_volume(volume: f64) -> String {
    if volume >= 1e6 {
        format!("{:.2}M", volume / 1e6)
    } else if volume >= 1e3 {
        format!("{:.2}K", volume / 1e3)
    } else {
        format!("{volume}")
    }
}

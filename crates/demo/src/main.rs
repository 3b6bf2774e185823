// File: crates/demo/src/main.rs
// Summary: Demo loads an OHLCV CSV, replays a scripted drawing session (trend line, fib, drag, restyle, ruler)
//          through the Annotator, persists the drawings per ticker and renders the overlay to PNG.

use anyhow::{Context, Result};
use annotate_core::measure::RulerStats;
use annotate_core::style::{LINE_WIDTHS, PALETTE};
use annotate_core::types::{Insets, HEIGHT, WIDTH};
use annotate_core::{
    Annotator, Candle, ChartDrawings, ChartStorage, Color, FileStore, NoopGestures, OverlayConfig, OverlayRenderer,
    Point, PointerId, ScaleViewport, StylePatch, Tool, ViewportMapper,
};
use annotate_render_skia::{sk_color, Rasterizer, RenderOptions};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // demo <csv> [ticker] [--fresh]
    let args: Vec<String> = std::env::args().skip(1).collect();
    let fresh = args.iter().any(|a| a == "--fresh");
    let mut positional = args.iter().filter(|a| !a.starts_with("--"));
    let raw = positional
        .next()
        .cloned()
        .unwrap_or_else(|| "binanceus_CRVUSDT_6h_2023-09-13_to_2025-01-21.csv".to_string());

    let (path, used_alt) = resolve_path(&raw)?;
    info!("using input file {}", path.display());
    if used_alt {
        info!("  (extension swapped between .csv/.cvs)");
    }
    let ticker = positional.next().cloned().unwrap_or_else(|| ticker_from(&path));

    let candles = load_ohlc_csv(&path).with_context(|| format!("failed to load CSV '{}'", path.display()))?;
    if candles.len() < 10 {
        anyhow::bail!("need at least 10 candles, loaded {}; check headers/delimiter", candles.len());
    }
    info!("loaded {} candles for {}", candles.len(), ticker);

    let config = OverlayConfig::load_default();
    let vp = ScaleViewport::with_candles(&candles, WIDTH as f32, HEIGHT as f32, Insets::default());

    let store = FileStore::default_location();
    info!("drawings stored under {}", store.root().display());
    let mut storage = ChartStorage::new(store.clone());
    let saved = storage.load_drawings(&ticker).unwrap_or_else(|e| {
        error!("could not read saved drawings, starting empty: {e}");
        ChartDrawings::default()
    });
    info!("restored {} drawing(s)", saved.len());

    let mut annotator = Annotator::new(&config).with_drawings(saved);
    let mut sink = ChartStorage::new(store);
    let sink_ticker = ticker.clone();
    annotator.on_change(Box::new(move |drawings: &ChartDrawings| {
        if let Err(e) = sink.save_drawings(&sink_ticker, drawings) {
            error!("saving drawings for {sink_ticker}: {e}");
        }
    }));

    let mut host = NoopGestures;
    if fresh {
        annotator.clear();
    }

    replay_session(&mut annotator, &vp, &candles, &mut host)?;

    if let Some(ruler) = annotator.ruler() {
        for line in RulerStats::measure(ruler, &candles, &vp).lines() {
            info!("ruler: {line}");
        }
    }

    let rasterizer = Rasterizer::new();
    let renderer = OverlayRenderer::from_config(&config);
    let scene = renderer.render(&annotator.frame(&candles), &vp, rasterizer.shaper(), WIDTH as f32, HEIGHT as f32);
    let opts = RenderOptions {
        width: WIDTH,
        height: HEIGHT,
        background: sk_color(Color::from_argb(255, 18, 18, 20)),
        ..RenderOptions::default()
    };
    let out = out_name_with(&path, "overlay");
    rasterizer.render_to_png(&scene, &opts, &out)?;
    info!("wrote {} ({} primitives)", out.display(), scene.primitives.len());

    Ok(())
}

/// Draw a trend line and a fib, drag the line, restyle both, then measure the tail with a ruler.
fn replay_session(annotator: &mut Annotator, vp: &ScaleViewport, candles: &[Candle], host: &mut NoopGestures) -> Result<()> {
    let n = candles.len();
    let at_close = |i: usize| -> Result<Point> {
        let c = &candles[i];
        vp.to_screen(c.time, c.close).with_context(|| format!("bar {i} is not on screen"))
    };

    annotator.set_tool(Tool::TrendLine, host);
    gesture(annotator, vp, host, at_close(n / 5)?, at_close(n * 4 / 5)?);

    let (lo, hi) = swing(candles);
    let price_at = |i: usize, price: f64| vp.to_screen(candles[i].time, price).context("swing is not on screen");
    annotator.set_tool(Tool::Fib, host);
    gesture(annotator, vp, host, price_at(lo, candles[lo].low)?, price_at(hi, candles[hi].high)?);

    // Grab the newest trend line in the middle and lift it 30px.
    annotator.set_tool(Tool::Pan, host);
    if let Some(line) = annotator.drawings().trend_lines.last().cloned() {
        if let (Some(a), Some(b)) = (vp.project(line.start), vp.project(line.end)) {
            let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
            gesture(annotator, vp, host, mid, Point::new(mid.x, mid.y - 30.0));
        }
        annotator.select(Some(line.id.clone()));
        annotator.update_selected_style(&StylePatch {
            extend_right: Some(true),
            line_width: Some(LINE_WIDTHS[2]),
            ..StylePatch::default()
        });
        if let Some(selected) = annotator.selected_drawing() {
            info!("selected {} from {:?} to {:?}", selected.id(), selected.start(), selected.end());
        }
    }
    if let Some(fib) = annotator.drawings().fibs.last().cloned() {
        annotator.update_style(&fib.id, &StylePatch::color(PALETTE[0]));
    }

    annotator.set_tool(Tool::Ruler, host);
    gesture(annotator, vp, host, at_close(n * 4 / 5)?, at_close(n - 1)?);
    if annotator.ruler().is_none() {
        warn!("ruler did not resolve");
    }
    Ok(())
}

/// Press at `from`, move in a few steps, release at `to`.
fn gesture(annotator: &mut Annotator, vp: &ScaleViewport, host: &mut NoopGestures, from: Point, to: Point) {
    let pointer = PointerId::MOUSE;
    annotator.pointer_down(pointer, from, vp, host);
    for step in 1..=8 {
        let t = step as f32 / 8.0;
        let p = Point::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t);
        annotator.pointer_move(pointer, p, vp);
    }
    annotator.pointer_up(pointer, Some(to), vp, host);
}

/// Indices of the lowest low and the highest high after it (or before it when it is last).
fn swing(candles: &[Candle]) -> (usize, usize) {
    let lo = (0..candles.len())
        .min_by(|&a, &b| candles[a].low.total_cmp(&candles[b].low))
        .unwrap_or(0);
    let range: Vec<usize> = if lo + 1 < candles.len() { (lo + 1..candles.len()).collect() } else { (0..lo).collect() };
    let hi = range
        .into_iter()
        .max_by(|&a, &b| candles[a].high.total_cmp(&candles[b].high))
        .unwrap_or(lo);
    (lo, hi)
}

/// Resolve path, trying .csv/.cvs swap if needed.
/// Returns (actual_path, used_alt)
fn resolve_path(raw: &str) -> Result<(PathBuf, bool)> {
    let p = Path::new(raw);
    if p.exists() {
        return Ok((p.to_path_buf(), false));
    }
    if let Some(alt) = swap_ext(p) {
        if alt.exists() {
            return Ok((alt, true));
        }
    }
    anyhow::bail!("file not found: {}", p.display());
}

fn swap_ext(p: &Path) -> Option<PathBuf> {
    let mut alt = p.to_path_buf();
    let ext = p.extension()?.to_string_lossy().to_lowercase();
    match ext.as_str() {
        "cvs" => {
            alt.set_extension("csv");
            Some(alt)
        }
        "csv" => {
            alt.set_extension("cvs");
            Some(alt)
        }
        _ => None,
    }
}

/// `binanceus_CRVUSDT_6h_...csv` -> `CRVUSDT`; otherwise the whole stem.
fn ticker_from(path: &Path) -> String {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    stem.split('_').nth(1).unwrap_or(stem).to_uppercase()
}

/// Produce output file name like target/out/<stem>_<suffix>.png
fn out_name_with(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("chart");
    let short = stem.split('_').take(3).collect::<Vec<_>>().join("_");
    let mut out = PathBuf::from("target/out");
    if short.is_empty() {
        out.push(format!("chart_{}.png", suffix));
    } else {
        out.push(format!("{}_{}.png", short, suffix));
    }
    out
}

/// Load Binance-like OHLCV CSV. Rows without a parseable time or breaking the
/// OHLC invariants are skipped; the result is sorted with unique bar times.
fn load_ohlc_csv(path: &Path) -> Result<Vec<Candle>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;

    let headers = rdr
        .headers()?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect::<Vec<_>>();
    log::debug!("headers: {:?}", headers);

    let idx = |names: &[&str]| headers.iter().position(|h| names.contains(&h.as_str()));
    let i_time = idx(&["time", "timestamp", "open_time", "date", "datetime"]).context("no time column")?;
    let i_open = idx(&["open", "o"]).context("no open column")?;
    let i_high = idx(&["high", "h"]).context("no high column")?;
    let i_low = idx(&["low", "l"]).context("no low column")?;
    let i_close = idx(&["close", "c", "adj_close", "close_price"]).context("no close column")?;
    let i_volume = idx(&["volume", "vol", "v"]);

    let mut out = Vec::new();
    let mut skipped = 0usize;
    for rec in rdr.records() {
        let rec = rec?;
        let num = |i: usize| rec.get(i).and_then(|s| s.trim().parse::<f64>().ok());
        let Some(time) = rec.get(i_time).and_then(parse_time) else {
            skipped += 1;
            continue;
        };
        let volume = i_volume.and_then(num).unwrap_or(0.0);
        let candle = match (num(i_open), num(i_high), num(i_low), num(i_close)) {
            (Some(o), Some(h), Some(l), Some(c)) => Candle::try_new(time, o, h, l, c, volume).ok(),
            _ => None,
        };
        match candle {
            Some(c) => out.push(c),
            None => skipped += 1,
        }
    }
    if skipped > 0 {
        warn!("skipped {skipped} unparseable row(s)");
    }
    out.sort_by_key(|c| c.time);
    out.dedup_by_key(|c| c.time);
    Ok(out)
}

/// Epoch seconds from epoch s/ms or an RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD` string.
fn parse_time(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        // epoch ms -> sec
        return Some(if n > 10_i64.pow(12) { n / 1000 } else { n });
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.and_utc().timestamp());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
}

// File: crates/annotate-render-skia/src/lib.rs
// Summary: Rasterizes annotate-core overlay scenes onto Skia CPU raster surfaces (PNG / RGBA8 output).

use std::path::Path;

use annotate_core::{Color, OverlayScene, Point, Primitive, Rect, Stroke};
use log::debug;
use skia_safe as skia;
use thiserror::Error;

pub mod text;

pub use text::TextShaper;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to create {width}x{height} raster surface")]
    Surface { width: i32, height: i32 },
    #[error("failed to encode PNG")]
    Encode,
    #[error("failed to read back surface pixels")]
    ReadPixels,
    #[error("failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    /// Surface fill before the overlay is painted; transparent composes over a chart.
    pub background: skia::Color,
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1200,
            height: 600,
            background: skia::Color::TRANSPARENT,
            draw_labels: true,
        }
    }
}

impl RenderOptions {
    /// Options sized to the scene's surface.
    pub fn for_scene(scene: &OverlayScene) -> Self {
        Self {
            width: scene.width.round().max(1.0) as i32,
            height: scene.height.round().max(1.0) as i32,
            ..Self::default()
        }
    }
}

pub struct Rasterizer {
    shaper: TextShaper,
}

impl Rasterizer {
    pub fn new() -> Self {
        Self { shaper: TextShaper::new() }
    }

    /// Shaper used for labels; pass it as the `TextMetrics` when building scenes
    /// so label boxes match the painted text.
    pub fn shaper(&self) -> &TextShaper {
        &self.shaper
    }

    /// Paint `scene` onto an existing canvas, in display-list order.
    pub fn draw(&self, canvas: &skia::Canvas, scene: &OverlayScene, draw_labels: bool) {
        for prim in &scene.primitives {
            match prim {
                Primitive::Line { from, to, stroke } => {
                    canvas.draw_line(pt(*from), pt(*to), &stroke_paint(stroke));
                }
                Primitive::Polyline { points, stroke } => {
                    if points.len() < 2 {
                        continue;
                    }
                    let mut path = skia::Path::new();
                    path.move_to(pt(points[0]));
                    for p in &points[1..] {
                        path.line_to(pt(*p));
                    }
                    canvas.draw_path(&path, &stroke_paint(stroke));
                }
                Primitive::FillRect { rect, color } => {
                    canvas.draw_rect(sk_rect(rect), &fill_paint(*color));
                }
                Primitive::StrokeRect { rect, stroke } => {
                    canvas.draw_rect(sk_rect(rect), &stroke_paint(stroke));
                }
                Primitive::Circle { center, radius, fill } => {
                    canvas.draw_circle(pt(*center), *radius, &fill_paint(*fill));
                }
                Primitive::Label { origin, text, size, color } => {
                    if draw_labels {
                        self.shaper.draw_left(canvas, text, origin.x, origin.y, *size, sk_color(*color));
                    }
                }
            }
        }
    }

    fn raster(&self, scene: &OverlayScene, opts: &RenderOptions) -> Result<skia::Surface, RenderError> {
        let mut surface = skia::surfaces::raster_n32_premul((opts.width, opts.height))
            .ok_or(RenderError::Surface { width: opts.width, height: opts.height })?;
        let canvas = surface.canvas();
        canvas.clear(opts.background);
        self.draw(canvas, scene, opts.draw_labels);
        debug!("rasterized {} primitives at {}x{}", scene.primitives.len(), opts.width, opts.height);
        Ok(surface)
    }

    pub fn render_to_png_bytes(&self, scene: &OverlayScene, opts: &RenderOptions) -> Result<Vec<u8>, RenderError> {
        let mut surface = self.raster(scene, opts)?;
        let image = surface.image_snapshot();
        #[allow(deprecated)]
        let data = image
            .encode_to_data(skia::EncodedImageFormat::PNG)
            .ok_or(RenderError::Encode)?;
        Ok(data.as_bytes().to_vec())
    }

    pub fn render_to_png(&self, scene: &OverlayScene, opts: &RenderOptions, output_png_path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = output_png_path.as_ref();
        let io_err = |source| RenderError::Io { path: path.display().to_string(), source };
        let bytes = self.render_to_png_bytes(scene, opts)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        std::fs::write(path, bytes).map_err(io_err)
    }

    /// Unpremultiplied RGBA8 pixels as `(pixels, width, height, row_bytes)`.
    pub fn render_to_rgba8(&self, scene: &OverlayScene, opts: &RenderOptions) -> Result<(Vec<u8>, i32, i32, usize), RenderError> {
        let mut surface = self.raster(scene, opts)?;
        let info = skia::ImageInfo::new(
            (opts.width, opts.height),
            skia::ColorType::RGBA8888,
            skia::AlphaType::Unpremul,
            None,
        );
        let row_bytes = opts.width as usize * 4;
        let mut pixels = vec![0u8; row_bytes * opts.height as usize];
        if !surface.read_pixels(&info, &mut pixels, row_bytes, (0, 0)) {
            return Err(RenderError::ReadPixels);
        }
        Ok((pixels, opts.width, opts.height, row_bytes))
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

pub fn sk_color(c: Color) -> skia::Color {
    skia::Color::from_argb(c.a, c.r, c.g, c.b)
}

fn pt(p: Point) -> skia::Point {
    skia::Point::new(p.x, p.y)
}

fn sk_rect(r: &Rect) -> skia::Rect {
    skia::Rect::from_ltrb(r.left, r.top, r.right, r.bottom)
}

fn fill_paint(color: Color) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Fill);
    paint.set_color(sk_color(color));
    paint
}

fn stroke_paint(stroke: &Stroke) -> skia::Paint {
    let mut paint = skia::Paint::default();
    paint.set_anti_alias(true);
    paint.set_style(skia::paint::Style::Stroke);
    paint.set_stroke_width(stroke.width);
    paint.set_color(sk_color(stroke.color));
    // Skia wants an even number of intervals
    if stroke.dash.len() >= 2 && stroke.dash.len() % 2 == 0 {
        if let Some(effect) = skia::PathEffect::dash(&stroke.dash, 0.0) {
            paint.set_path_effect(effect);
        }
    }
    paint
}

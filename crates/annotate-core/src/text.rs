// File: crates/annotate-core/src/text.rs
// Summary: Text measurement seam used to size label boxes.

/// Width of a single line of text at a font size, in pixels.
pub trait TextMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Fixed-advance estimate for when no shaper is available (tests, headless runs).
#[derive(Clone, Copy, Debug, Default)]
pub struct ApproxTextMetrics;

impl TextMetrics for ApproxTextMetrics {
    fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().count() as f32 * size * 0.6
    }
}

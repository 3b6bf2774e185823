// File: crates/annotate-core/src/theme.rs
// Summary: Overlay color themes (previews, handles, fib bands, ruler, labels, pane divider).

use crate::style::Color;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub preview: Color,
    pub handle: Color,
    pub label_background: Color,
    pub label_text: Color,
    pub ruler_up: Color,
    pub ruler_up_fill: Color,
    pub ruler_down: Color,
    pub ruler_down_fill: Color,
    /// One color per fib level; band `i` (between level `i` and `i + 1`) uses `fib_bands[i + 1]`.
    pub fib_bands: [Color; 7],
    pub pane_divider: Color,
    pub pane_divider_active: Color,
}

const fn band(r: u8, g: u8, b: u8) -> Color {
    Color::from_argb(51, r, g, b)
}

const DEFAULT_BANDS: [Color; 7] = [
    band(128, 128, 128),
    band(239, 68, 68),
    band(245, 158, 11),
    band(234, 179, 8),
    band(5, 150, 105),
    band(59, 130, 246),
    band(128, 128, 128),
];

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            preview: Color::WHITE,
            handle: Color::WHITE,
            label_background: Color::from_argb(204, 3, 7, 18),
            label_text: Color::WHITE,
            ruler_up: Color::rgb(34, 197, 94),
            ruler_up_fill: Color::from_argb(51, 16, 185, 129),
            ruler_down: Color::rgb(239, 68, 68),
            ruler_down_fill: Color::from_argb(51, 239, 68, 68),
            fib_bands: DEFAULT_BANDS,
            pane_divider: Color::from_argb(255, 55, 65, 81),
            pane_divider_active: Color::rgb(0x38, 0xbd, 0xf8),
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            preview: Color::rgb(20, 20, 30),
            handle: Color::rgb(20, 20, 30),
            label_background: Color::from_argb(230, 250, 250, 252),
            label_text: Color::rgb(20, 20, 30),
            ruler_up: Color::rgb(20, 160, 90),
            ruler_up_fill: Color::from_argb(51, 20, 160, 90),
            ruler_down: Color::rgb(200, 60, 60),
            ruler_down_fill: Color::from_argb(51, 200, 60, 60),
            fib_bands: DEFAULT_BANDS,
            pane_divider: Color::rgb(210, 210, 218),
            pane_divider_active: Color::rgb(30, 120, 240),
        }
    }

    pub fn high_contrast_dark() -> Self {
        Self {
            name: "high-contrast-dark",
            preview: Color::rgb(0xff, 0xff, 0x00),
            handle: Color::WHITE,
            label_background: Color::rgb(0x00, 0x00, 0x00),
            label_text: Color::WHITE,
            ruler_up: Color::rgb(0x00, 0xff, 0x00),
            ruler_up_fill: Color::from_argb(80, 0x00, 0xff, 0x00),
            ruler_down: Color::rgb(0xff, 0x00, 0x00),
            ruler_down_fill: Color::from_argb(80, 0xff, 0x00, 0x00),
            fib_bands: DEFAULT_BANDS,
            pane_divider: Color::rgb(0xcc, 0xcc, 0xcc),
            pane_divider_active: Color::rgb(0x00, 0xff, 0xff),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

/// Return a list of built-in theme presets.
pub fn presets() -> Vec<Theme> {
    vec![Theme::dark(), Theme::light(), Theme::high_contrast_dark()]
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    for t in presets() { if t.name.eq_ignore_ascii_case(name) { return t; } }
    Theme::dark()
}

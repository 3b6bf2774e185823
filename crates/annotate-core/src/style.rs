// File: crates/annotate-core/src/style.rs
// Summary: Colors, line styles and the style edits a selected drawing accepts.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 8-bit RGBA color. Serialized as `#rrggbb` (opaque) or `#rrggbbaa`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);
    pub const TRANSPARENT: Color = Color::from_argb(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Same argument order as `skia::Color::from_argb`.
    pub const fn from_argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid color '{0}', expected #rrggbb or #rrggbbaa")]
pub struct ParseColorError(pub String);

impl FromStr for Color {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseColorError(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(err)?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(err());
        }
        let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| err());
        let a = if hex.len() == 8 { byte(6)? } else { 255 };
        Ok(Self { r: byte(0)?, g: byte(2)?, b: byte(4)?, a })
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Color {
    type Error = ParseColorError;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Color> for String {
    fn from(c: Color) -> Self {
        c.to_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
}

impl LineStyle {
    /// On/off dash intervals in pixels; empty for a solid stroke.
    pub fn dash_pattern(&self) -> &'static [f32] {
        match self {
            LineStyle::Solid => &[],
            LineStyle::Dashed => &[8.0, 8.0],
            LineStyle::Dotted => &[2.0, 4.0],
        }
    }

    pub fn all() -> &'static [LineStyle] {
        &[LineStyle::Solid, LineStyle::Dashed, LineStyle::Dotted]
    }
}

/// Swatches offered by the drawing toolbar.
pub const PALETTE: [Color; 7] = [
    Color::rgb(0x2d, 0xd4, 0xbf),
    Color::rgb(0x38, 0xbd, 0xf8),
    Color::rgb(0xa7, 0x8b, 0xfa),
    Color::rgb(0xf4, 0x72, 0xb6),
    Color::rgb(0xfa, 0xcc, 0x15),
    Color::rgb(0xf8, 0x71, 0x71),
    Color::rgb(0xff, 0xff, 0xff),
];

/// Line widths offered by the drawing toolbar.
pub const LINE_WIDTHS: [f32; 3] = [1.0, 2.0, 4.0];

/// Partial style update for a persisted drawing. `None` fields are left as is;
/// the extend flags only apply to trend lines.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StylePatch {
    pub color: Option<Color>,
    pub line_width: Option<f32>,
    pub line_style: Option<LineStyle>,
    pub extend_left: Option<bool>,
    pub extend_right: Option<bool>,
}

impl StylePatch {
    pub fn color(color: Color) -> Self {
        Self { color: Some(color), ..Self::default() }
    }
    pub fn line_width(width: f32) -> Self {
        Self { line_width: Some(width), ..Self::default() }
    }
    pub fn line_style(style: LineStyle) -> Self {
        Self { line_style: Some(style), ..Self::default() }
    }
    pub fn extend_left(on: bool) -> Self {
        Self { extend_left: Some(on), ..Self::default() }
    }
    pub fn extend_right(on: bool) -> Self {
        Self { extend_right: Some(on), ..Self::default() }
    }
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

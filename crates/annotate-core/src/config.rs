// File: crates/annotate-core/src/config.rs
// Summary: TOML-backed overlay configuration (hit tolerances, styling, oscillator pane, theme).

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::drawing::DrawingDefaults;
use crate::error::ConfigError;
use crate::hit_test::HitThresholds;
use crate::style::Color;
use crate::theme::{self, Theme};

pub const CONFIG_FILE: &str = "annotate.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Theme preset name, see [`theme::presets`].
    pub theme: String,
    pub hit: HitThresholds,
    pub style: StyleConfig,
    pub pane: PaneConfig,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            hit: HitThresholds::default(),
            style: StyleConfig::default(),
            pane: PaneConfig::default(),
        }
    }
}

impl OverlayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Ok(toml::from_str(&content)?)
    }

    /// Load from `./annotate.toml`, then `<config dir>/constellation/annotate.toml`,
    /// else defaults. A file that exists but fails to parse is logged and skipped.
    pub fn load_default() -> Self {
        for path in Self::search_paths() {
            if !path.exists() {
                continue;
            }
            match Self::load(&path) {
                Ok(config) => {
                    log::debug!("loaded overlay config from {}", path.display());
                    return config;
                }
                Err(e) => log::warn!("ignoring overlay config {}: {e}", path.display()),
            }
        }
        Self::default()
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content).map_err(|source| ConfigError::Write { path: path.to_path_buf(), source })
    }

    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("constellation").join(CONFIG_FILE));
        }
        paths
    }

    pub fn theme(&self) -> Theme {
        let mut t = theme::find(&self.theme);
        if let Some(c) = self.style.preview_color {
            t.preview = c;
        }
        t
    }
}

/// Stroke and label sizing for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub handle_radius: f32,
    /// Added to the line width when a drawing is selected.
    pub selection_extra_width: f32,
    pub preview_width: f32,
    pub preview_dash: Vec<f32>,
    /// Overrides the theme's preview color.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_color: Option<Color>,
    pub label_font_size: f32,
    #[serde(flatten)]
    pub defaults: DrawingDefaults,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            handle_radius: 5.0,
            selection_extra_width: 2.0,
            preview_width: 2.0,
            preview_dash: vec![5.0, 5.0],
            preview_color: None,
            label_font_size: 12.0,
            defaults: DrawingDefaults::default(),
        }
    }
}

/// Oscillator pane sizing in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaneConfig {
    pub default_height: f32,
    pub min_height: f32,
    /// Space always left to the main pane.
    pub bottom_reserve: f32,
    /// Half-height of the grab zone around the pane boundary.
    pub grab_px: f32,
}

impl Default for PaneConfig {
    fn default() -> Self {
        Self { default_height: 150.0, min_height: 50.0, bottom_reserve: 100.0, grab_px: 5.0 }
    }
}

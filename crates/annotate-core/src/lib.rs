// File: crates/annotate-core/src/lib.rs
// Summary: Core library entry point; exports the drawing model, interaction controllers and overlay scene builder.

pub mod types;
pub mod geometry;
pub mod scale;
pub mod series;
pub mod style;
pub mod theme;
pub mod text;
pub mod drawing;
pub mod viewport;
pub mod interaction;
pub mod tool;
pub mod drag;
pub mod annotator;
pub mod measure;
pub mod render;
pub mod indicator;
pub mod store;
pub mod config;
pub mod error;

pub use annotator::{Annotator, GestureHost, NoopGestures, Response};
pub use config::OverlayConfig;
pub use drawing::{ChartDrawings, Drawing, DrawingId, FibRetracement, PointInTime, Ruler, TrendLine};
pub use error::{ConfigError, StoreError};
pub use geometry::{Point, Rect};
pub use hit_test::{Handle, Hit, HitTester};
pub use indicator::{IndicatorConfig, IndicatorHost, IndicatorOverlayManager, OscillatorPane};
pub use interaction::{CursorIcon, InteractionState};
pub use render::{OverlayFrame, OverlayRenderer, OverlayScene, Primitive, Stroke};
pub use series::Candle;
pub use store::{ChartStorage, FileStore, KeyValueStore, MemoryStore};
pub use style::{Color, LineStyle, StylePatch};
pub use text::{ApproxTextMetrics, TextMetrics};
pub use theme::Theme;
pub use tool::Tool;
pub use types::PointerId;
pub use viewport::{ScaleViewport, ViewportMapper};

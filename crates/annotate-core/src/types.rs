// File: crates/annotate-core/src/types.rs
// Summary: Shared types and constants (surface sizes, insets, time aliases).

/// Default surface width in pixels.
pub const WIDTH: i32 = 1024;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 640;

/// Session time of a bar, UTC seconds.
pub type Time = i64;

/// Seconds in one calendar day.
pub const SECONDS_PER_DAY: i64 = 86_400;

/// Margins between the surface edge and the plot, in pixels (axis gutters).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: u32,
    pub right: u32,
    pub top: u32,
    pub bottom: u32,
}

impl Insets {
    pub const fn new(left: u32, right: u32, top: u32, bottom: u32) -> Self {
        Self { left, right, top, bottom }
    }
}

impl Default for Insets {
    fn default() -> Self {
        Self::new(0, 72, 0, 28)
    }
}

/// Identifies one physical pointer (mouse, pen, touch contact).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct PointerId(pub u64);

impl PointerId {
    /// The primary mouse pointer.
    pub const MOUSE: PointerId = PointerId(0);
}

// File: crates/annotate-core/src/geometry.rs
// Summary: Lightweight geometry helpers for pixel math (points, rects, segment distance).

/// Screen position in pixels, origin top-left, y growing downward.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: Point) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    pub fn distance_squared_to(self, other: Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

impl From<(f32, f32)> for Point {
    fn from(p: (f32, f32)) -> Self {
        Self::new(p.0, p.1)
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl Rect {
    pub const fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self { left, top, right, bottom }
    }
    pub const fn from_ltwh(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, right: left + width, bottom: top + height }
    }
    /// Normalized rectangle spanning two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            left: a.x.min(b.x),
            top: a.y.min(b.y),
            right: a.x.max(b.x),
            bottom: a.y.max(b.y),
        }
    }
    pub fn width(&self) -> f32 { self.right - self.left }
    pub fn height(&self) -> f32 { self.bottom - self.top }
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.left && p.x <= self.right && p.y >= self.top && p.y <= self.bottom
    }
}

#[inline]
pub fn clamp<T: PartialOrd>(v: T, lo: T, hi: T) -> T {
    if v < lo { lo } else if v > hi { hi } else { v }
}

/// Distance from `p` to the segment `a..b` using perpendicular projection
/// clamped to the segment. `None` for a zero-length segment.
pub fn distance_to_segment(p: Point, a: Point, b: Point) -> Option<f32> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return None;
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq;
    let closest = if t < 0.0 {
        a
    } else if t > 1.0 {
        b
    } else {
        Point::new(a.x + t * dx, a.y + t * dy)
    };
    Some(p.distance_to(closest))
}

/// Stretch the line through `a` and `b` to the edges of `bounds`.
///
/// Returns `(from, to)` ordered left to right: `from` moves to the left edge
/// when `extend_left`, `to` moves to the right edge when `extend_right`. Lines
/// with |dx| <= 1e-6 are treated as vertical and span the full height instead.
pub fn extend_segment(a: Point, b: Point, bounds: &Rect, extend_left: bool, extend_right: bool) -> (Point, Point) {
    let (mut from, mut to) = if a.x <= b.x { (a, b) } else { (b, a) };
    let dx = to.x - from.x;
    let dy = to.y - from.y;
    if dx.abs() > 1e-6 {
        let slope = dy / dx;
        if extend_left {
            from = Point::new(bounds.left, from.y - slope * (from.x - bounds.left));
        }
        if extend_right {
            to = Point::new(bounds.right, to.y + slope * (bounds.right - to.x));
        }
    } else if extend_left || extend_right {
        from = Point::new(from.x, bounds.top);
        to = Point::new(to.x, bounds.bottom);
    }
    (from, to)
}

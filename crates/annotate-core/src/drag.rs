// File: crates/annotate-core/src/drag.rs
// Summary: Move/resize of a persisted drawing, staged against a snapshot taken on pointer-down.
// Notes:
// - Moves are computed in logical bar indices, not pixels, so the drawing keeps
//   its shape in data space whatever the zoom level.
// - The staged drawing is only committed by the caller on a resolvable release.

use crate::drawing::{Drawing, DrawingId, PointInTime};
use crate::geometry::Point;
use crate::hit_test::Handle;
use crate::scale::Logical;
use crate::types::PointerId;
use crate::viewport::ViewportMapper;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DragMode {
    Move,
    ResizeStart,
    ResizeEnd,
}

impl From<Handle> for DragMode {
    fn from(h: Handle) -> Self {
        match h {
            Handle::Start => DragMode::ResizeStart,
            Handle::End => DragMode::ResizeEnd,
        }
    }
}

/// Geometry captured when the drag started.
#[derive(Clone, Debug, PartialEq)]
pub struct DragAnchor {
    pub original: Drawing,
    pub start_logical: Logical,
    pub end_logical: Logical,
    pub pointer: PointInTime,
    pub pointer_logical: Logical,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub mode: DragMode,
    pub pointer: PointerId,
    pub anchor: DragAnchor,
    /// Drawing as it would be committed right now.
    pub staged: Drawing,
    pub last_pointer: Point,
}

impl DragSession {
    pub fn target(&self) -> &DrawingId {
        self.anchor.original.id()
    }

    pub fn is_modified(&self) -> bool {
        self.staged != self.anchor.original
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DragOutcome {
    Commit(Drawing),
    /// Released where it started; nothing to write.
    Unchanged,
    /// Release position did not resolve; the pre-drag geometry stands.
    Abandoned,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct DragController;

impl DragController {
    /// Snapshot `target` for a drag starting at `p`. `None` when the pointer
    /// or either endpoint has no logical index.
    pub fn begin(target: &Drawing, mode: DragMode, p: Point, pointer: PointerId, mapper: &dyn ViewportMapper) -> Option<DragSession> {
        let data = mapper.to_data(p.x, p.y)?;
        let anchor = DragAnchor {
            original: target.clone(),
            start_logical: mapper.time_to_logical(target.start().time)?,
            end_logical: mapper.time_to_logical(target.end().time)?,
            pointer: data,
            pointer_logical: mapper.time_to_logical(data.time)?,
        };
        Some(DragSession { mode, pointer, anchor, staged: target.clone(), last_pointer: p })
    }

    /// Restage for pointer `p`. Returns whether the staged drawing changed;
    /// an unresolvable position keeps the last valid staging.
    pub fn update(session: &mut DragSession, p: Point, mapper: &dyn ViewportMapper) -> bool {
        session.last_pointer = p;
        let Some(staged) = Self::stage(session, p, mapper) else {
            return false;
        };
        if staged == session.staged {
            return false;
        }
        session.staged = staged;
        true
    }

    /// Apply the release position (or the last seen one) and decide what to
    /// commit. A release off the plot abandons the drag; a release on the plot
    /// commits the last valid staging.
    pub fn finish(mut session: DragSession, p: Option<Point>, mapper: &dyn ViewportMapper) -> DragOutcome {
        let p = p.unwrap_or(session.last_pointer);
        if mapper.to_data(p.x, p.y).is_none() {
            return DragOutcome::Abandoned;
        }
        Self::update(&mut session, p, mapper);
        if session.is_modified() {
            DragOutcome::Commit(session.staged)
        } else {
            DragOutcome::Unchanged
        }
    }

    fn stage(session: &DragSession, p: Point, mapper: &dyn ViewportMapper) -> Option<Drawing> {
        let current = mapper.to_data(p.x, p.y)?;
        let anchor = &session.anchor;
        let original = &anchor.original;
        let (start, end) = match session.mode {
            DragMode::ResizeStart => (current, original.end()),
            DragMode::ResizeEnd => (original.start(), current),
            DragMode::Move => {
                let d_logical = mapper.time_to_logical(current.time)? - anchor.pointer_logical;
                let d_price = current.price - anchor.pointer.price;
                let shift = |pt: PointInTime, logical: Logical| -> Option<PointInTime> {
                    let time = if d_logical == 0.0 { pt.time } else { mapper.logical_to_time(logical + d_logical)? };
                    Some(PointInTime::new(time, pt.price + d_price))
                };
                (
                    shift(original.start(), anchor.start_logical)?,
                    shift(original.end(), anchor.end_logical)?,
                )
            }
        };
        Some(original.with_endpoints(start, end))
    }
}

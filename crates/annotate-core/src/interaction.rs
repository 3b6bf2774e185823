// File: crates/annotate-core/src/interaction.rs
// Summary: The single interaction state shared by drawing and dragging, plus cursor hints.

use crate::drag::DragSession;
use crate::drawing::PointInTime;
use crate::geometry::Point;
use crate::tool::Tool;
use crate::types::PointerId;

/// What the pointer is currently doing. Drawing and dragging are mutually
/// exclusive by construction.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
    #[default]
    Idle,
    Drawing {
        tool: Tool,
        start: PointInTime,
        cursor: Option<Point>,
        pointer: PointerId,
    },
    Dragging(DragSession),
}

impl InteractionState {
    pub fn is_idle(&self) -> bool {
        matches!(self, InteractionState::Idle)
    }

    /// Pointer that owns the active interaction.
    pub fn pointer(&self) -> Option<PointerId> {
        match self {
            InteractionState::Idle => None,
            InteractionState::Drawing { pointer, .. } => Some(*pointer),
            InteractionState::Dragging(session) => Some(session.pointer),
        }
    }

    /// Idle, or driven by `pointer`.
    pub fn accepts(&self, pointer: PointerId) -> bool {
        self.pointer().map_or(true, |owner| owner == pointer)
    }

    pub fn label(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing { .. } => "drawing",
            InteractionState::Dragging(_) => "dragging",
        }
    }
}

/// Pointer cursor the host should show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CursorIcon {
    #[default]
    Default,
    Pointer,
    Move,
    Crosshair,
    ResizeVertical,
}

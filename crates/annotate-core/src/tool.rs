// File: crates/annotate-core/src/tool.rs
// Summary: Active drawing tool and the two-phase create gesture (start on press, commit on release).

use crate::drawing::{Drawing, DrawingDefaults, FibRetracement, PointInTime, Ruler, TrendLine};
use crate::geometry::Point;
use crate::interaction::InteractionState;
use crate::types::PointerId;
use crate::viewport::ViewportMapper;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Tool {
    #[default]
    Pan,
    TrendLine,
    Ruler,
    Fib,
}

impl Tool {
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Pan => "pan",
            Tool::TrendLine => "trend line",
            Tool::Ruler => "ruler",
            Tool::Fib => "fib retracement",
        }
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self, Tool::Pan)
    }

    /// Drawing of this tool's kind spanning `start..end`; `None` for pan.
    pub fn build(&self, start: PointInTime, end: PointInTime, defaults: &DrawingDefaults) -> Option<Drawing> {
        match self {
            Tool::Pan => None,
            Tool::TrendLine => Some(Drawing::TrendLine(TrendLine::new(start, end, defaults))),
            Tool::Fib => Some(Drawing::Fib(FibRetracement::new(start, end, defaults))),
            Tool::Ruler => Some(Drawing::Ruler(Ruler::new(start, end))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolPhase {
    AwaitingStart,
    Drawing,
}

/// Result of releasing the pointer on a drawing gesture.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawOutcome {
    /// New trend line or fib to add to the persisted collection.
    Persisted(Drawing),
    /// New ephemeral ruler, replacing any previous one.
    Ruler(Ruler),
    /// End point did not resolve; nothing is created.
    Aborted,
}

#[derive(Clone, Debug, Default)]
pub struct ToolController {
    tool: Tool,
    defaults: DrawingDefaults,
}

impl ToolController {
    pub fn new(defaults: DrawingDefaults) -> Self {
        Self { tool: Tool::Pan, defaults }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn defaults(&self) -> &DrawingDefaults {
        &self.defaults
    }

    pub fn phase(&self, state: &InteractionState) -> ToolPhase {
        match state {
            InteractionState::Drawing { .. } => ToolPhase::Drawing,
            _ => ToolPhase::AwaitingStart,
        }
    }

    /// Switch tools. A pending draw is dropped; returns whether one was.
    pub fn select(&mut self, tool: Tool, state: &mut InteractionState) -> bool {
        self.tool = tool;
        if matches!(state, InteractionState::Drawing { .. }) {
            *state = InteractionState::Idle;
            true
        } else {
            false
        }
    }

    /// Start a draw at `p`. Requires a drawing tool, an idle state and a
    /// resolvable data coordinate.
    pub fn begin(&self, p: Point, pointer: PointerId, mapper: &dyn ViewportMapper, state: &mut InteractionState) -> bool {
        if !self.tool.is_drawing() || !state.is_idle() {
            return false;
        }
        let Some(start) = mapper.to_data(p.x, p.y) else {
            return false;
        };
        *state = InteractionState::Drawing { tool: self.tool, start, cursor: Some(p), pointer };
        true
    }

    /// Record the cursor for the live preview. Never touches the model.
    pub fn track(&self, p: Point, state: &mut InteractionState) -> bool {
        match state {
            InteractionState::Drawing { cursor, .. } => {
                *cursor = Some(p);
                true
            }
            _ => false,
        }
    }

    /// Finish the draw. `p` falls back to the last tracked cursor. The state
    /// always returns to idle.
    pub fn finish(&self, p: Option<Point>, mapper: &dyn ViewportMapper, state: &mut InteractionState) -> DrawOutcome {
        let InteractionState::Drawing { tool, start, cursor, .. } = std::mem::take(state) else {
            return DrawOutcome::Aborted;
        };
        let Some(end) = p.or(cursor).and_then(|p| mapper.to_data(p.x, p.y)) else {
            return DrawOutcome::Aborted;
        };
        match tool.build(start, end, &self.defaults) {
            Some(Drawing::Ruler(r)) => DrawOutcome::Ruler(r),
            Some(d) => DrawOutcome::Persisted(d),
            None => DrawOutcome::Aborted,
        }
    }
}

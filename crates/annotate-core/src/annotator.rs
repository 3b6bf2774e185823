// File: crates/annotate-core/src/annotator.rs
// Summary: Pointer-event façade owning drawings, selection, the ephemeral ruler and the interaction state.
// Notes:
// - Every model change goes through `commit`, which swaps the whole collection
//   and notifies listeners once.
// - Model edits (style, delete, clear) are refused while a draw or drag is in
//   flight so the staged geometry never races a second writer.

use log::{debug, info, warn};

use crate::config::OverlayConfig;
use crate::drag::{DragController, DragMode, DragOutcome};
use crate::drawing::{ChartDrawings, Drawing, DrawingId, Ruler};
use crate::geometry::Point;
use crate::hit_test::{Hit, HitTester};
use crate::interaction::{CursorIcon, InteractionState};
use crate::render::OverlayFrame;
use crate::series::Candle;
use crate::style::StylePatch;
use crate::tool::{DrawOutcome, Tool, ToolController, ToolPhase};
use crate::types::PointerId;
use crate::viewport::ViewportMapper;

/// Chart-side controls the overlay needs while a gesture is in progress.
pub trait GestureHost {
    /// Enable or disable the chart's own pan/zoom handling.
    fn set_chart_gestures_enabled(&mut self, _enabled: bool) {}
    /// Route all further events of `pointer` to the overlay, even outside the chart.
    fn capture_pointer(&mut self, _pointer: PointerId) {}
    fn release_pointer(&mut self, _pointer: PointerId) {}
}

/// Host without gesture controls.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopGestures;

impl GestureHost for NoopGestures {}

/// What the host should do after an event.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Response {
    pub redraw: bool,
    /// Event was used by the overlay and should not reach the chart.
    pub consumed: bool,
}

impl Response {
    fn redraw(redraw: bool) -> Self {
        Self { redraw, consumed: false }
    }
    fn consumed() -> Self {
        Self { redraw: true, consumed: true }
    }
}

pub type ChangeListener = Box<dyn FnMut(&ChartDrawings)>;

pub struct Annotator {
    drawings: ChartDrawings,
    selected: Option<DrawingId>,
    ruler: Option<Ruler>,
    interaction: InteractionState,
    tools: ToolController,
    hit_tester: HitTester,
    drawings_visible: bool,
    listeners: Vec<ChangeListener>,
}

impl Default for Annotator {
    fn default() -> Self {
        Self::new(&OverlayConfig::default())
    }
}

impl Annotator {
    pub fn new(config: &OverlayConfig) -> Self {
        Self {
            drawings: ChartDrawings::default(),
            selected: None,
            ruler: None,
            interaction: InteractionState::Idle,
            tools: ToolController::new(config.style.defaults),
            hit_tester: HitTester::new(config.hit),
            drawings_visible: true,
            listeners: Vec::new(),
        }
    }

    pub fn with_drawings(mut self, drawings: ChartDrawings) -> Self {
        self.replace_drawings(drawings);
        self
    }

    /// Register a listener called with the full collection after every commit.
    pub fn on_change(&mut self, listener: ChangeListener) {
        self.listeners.push(listener);
    }

    pub fn drawings(&self) -> &ChartDrawings { &self.drawings }
    pub fn selection(&self) -> Option<&DrawingId> { self.selected.as_ref() }
    pub fn ruler(&self) -> Option<&Ruler> { self.ruler.as_ref() }
    pub fn interaction(&self) -> &InteractionState { &self.interaction }
    pub fn tool(&self) -> Tool { self.tools.tool() }
    pub fn tool_phase(&self) -> ToolPhase { self.tools.phase(&self.interaction) }
    pub fn drawings_visible(&self) -> bool { self.drawings_visible }

    pub fn selected_drawing(&self) -> Option<Drawing> {
        self.selected.as_ref().and_then(|id| self.drawings.get(id))
    }

    /// Inputs for one overlay render pass.
    pub fn frame<'a>(&'a self, candles: &'a [Candle]) -> OverlayFrame<'a> {
        OverlayFrame {
            drawings: &self.drawings,
            selected: self.selected.as_ref(),
            ruler: self.ruler.as_ref(),
            interaction: &self.interaction,
            candles,
            visible: self.drawings_visible,
        }
    }

    /// Install a collection loaded from outside (ticker switch, storage).
    /// Listeners are not notified; any interaction is dropped.
    pub fn replace_drawings(&mut self, mut drawings: ChartDrawings) {
        let dropped = drawings.dedup_ids();
        if dropped > 0 {
            warn!("dropped {dropped} drawing(s) with duplicate ids");
        }
        self.drawings = drawings;
        self.interaction = InteractionState::Idle;
        self.ruler = None;
        self.retain_selection();
    }

    pub fn set_tool(&mut self, tool: Tool, host: &mut dyn GestureHost) -> Response {
        let was_drawing = matches!(self.interaction, InteractionState::Drawing { .. });
        let pointer = self.interaction.pointer();
        if self.tools.select(tool, &mut self.interaction) {
            debug!("tool switched mid-draw; pending draw dropped");
            if let Some(p) = pointer {
                host.release_pointer(p);
            }
            host.set_chart_gestures_enabled(true);
        }
        if tool.is_drawing() {
            self.drawings_visible = true;
        }
        debug!("tool -> {}", tool.name());
        Response::redraw(was_drawing)
    }

    pub fn set_drawings_visible(&mut self, visible: bool, host: &mut dyn GestureHost) -> Response {
        if self.drawings_visible == visible {
            return Response::default();
        }
        if !visible {
            self.cancel_interaction(host);
            self.selected = None;
        }
        self.drawings_visible = visible;
        Response::redraw(true)
    }

    pub fn pointer_down(&mut self, pointer: PointerId, p: Point, mapper: &dyn ViewportMapper, host: &mut dyn GestureHost) -> Response {
        if !self.interaction.is_idle() {
            debug!("pointer {:?} down ignored while {}", pointer, self.interaction.label());
            return Response::default();
        }
        let had_ruler = self.ruler.take().is_some();
        if !self.drawings_visible {
            return Response::redraw(had_ruler);
        }

        if self.tools.tool().is_drawing() {
            self.selected = None;
            if self.tools.begin(p, pointer, mapper, &mut self.interaction) {
                debug!("drawing {} started", self.tools.tool().name());
                self.suspend(pointer, host);
                return Response::consumed();
            }
            return Response::redraw(had_ruler);
        }

        if mapper.to_data(p.x, p.y).is_none() {
            // Off the plot (axis, margins): only a click on empty space deselects.
            let redraw = had_ruler || (self.hit_tester.body_at(&self.drawings, p, mapper).is_none() && self.selected.take().is_some());
            return Response::redraw(redraw);
        }

        let (id, mode) = match self.hit_tester.hit(&self.drawings, self.selected.as_ref(), p, mapper) {
            Hit::Handle { id, handle } => (id, DragMode::from(handle)),
            Hit::Body(id) => (id, DragMode::Move),
            Hit::Miss => {
                let deselected = self.selected.take().is_some();
                return Response::redraw(had_ruler || deselected);
            }
        };
        let Some(target) = self.drawings.get(&id) else {
            return Response::redraw(had_ruler);
        };
        self.selected = Some(id);
        match DragController::begin(&target, mode, p, pointer, mapper) {
            Some(session) => {
                debug!("drag {:?} of {} started", mode, session.target());
                self.interaction = InteractionState::Dragging(session);
                self.suspend(pointer, host);
            }
            None => debug!("selected {} without drag; no logical anchor", target.id()),
        }
        Response::consumed()
    }

    pub fn pointer_move(&mut self, pointer: PointerId, p: Point, mapper: &dyn ViewportMapper) -> Response {
        if !self.interaction.accepts(pointer) {
            return Response::default();
        }
        if matches!(self.interaction, InteractionState::Drawing { .. }) {
            let redraw = self.tools.track(p, &mut self.interaction);
            return Response { redraw, consumed: true };
        }
        match &mut self.interaction {
            InteractionState::Dragging(session) => Response {
                redraw: DragController::update(session, p, mapper),
                consumed: true,
            },
            _ => Response::default(),
        }
    }

    /// Pointer release anywhere on screen. `p` is `None` when the host lost
    /// track of the position; the last seen one is used instead.
    pub fn pointer_up(&mut self, pointer: PointerId, p: Option<Point>, mapper: &dyn ViewportMapper, host: &mut dyn GestureHost) -> Response {
        if self.interaction.is_idle() || !self.interaction.accepts(pointer) {
            return Response::default();
        }
        if matches!(self.interaction, InteractionState::Drawing { .. }) {
            let outcome = self.tools.finish(p, mapper, &mut self.interaction);
            self.apply_draw(outcome);
        } else if let InteractionState::Dragging(session) = std::mem::take(&mut self.interaction) {
            let target = session.target().clone();
            let outcome = DragController::finish(session, p, mapper);
            self.apply_drag(&target, outcome);
        }
        self.resume(pointer, host);
        Response::consumed()
    }

    fn apply_draw(&mut self, outcome: DrawOutcome) {
        match outcome {
            DrawOutcome::Persisted(d) => {
                let id = d.id().clone();
                match self.drawings.with_added(d) {
                    Some(next) => {
                        info!("created {id}");
                        self.commit(next);
                    }
                    None => warn!("drawing {id} not added; id already present"),
                }
            }
            DrawOutcome::Ruler(r) => {
                debug!("ruler {} placed", r.id);
                self.ruler = Some(r);
            }
            DrawOutcome::Aborted => debug!("draw aborted; release did not resolve"),
        }
    }

    fn apply_drag(&mut self, target: &DrawingId, outcome: DragOutcome) {
        match outcome {
            DragOutcome::Commit(d) => match self.drawings.with_replaced(&d) {
                Some(next) => {
                    info!("moved {target}");
                    self.commit(next);
                }
                None => warn!("drag target {target} vanished before commit"),
            },
            DragOutcome::Unchanged => {}
            DragOutcome::Abandoned => warn!("drag of {target} abandoned; release did not resolve"),
        }
    }

    /// Drop an in-flight draw or drag; nothing is committed.
    pub fn cancel_interaction(&mut self, host: &mut dyn GestureHost) -> Response {
        let Some(pointer) = self.interaction.pointer() else {
            return Response::default();
        };
        debug!("{} cancelled", self.interaction.label());
        self.interaction = InteractionState::Idle;
        self.resume(pointer, host);
        Response::redraw(true)
    }

    /// Cursor for a hover at `p`.
    pub fn cursor_at(&self, p: Point, mapper: &dyn ViewportMapper) -> CursorIcon {
        match &self.interaction {
            InteractionState::Drawing { .. } => return CursorIcon::Crosshair,
            InteractionState::Dragging(s) if s.mode == DragMode::Move => return CursorIcon::Move,
            InteractionState::Dragging(_) => return CursorIcon::Pointer,
            InteractionState::Idle => {}
        }
        if self.tools.tool().is_drawing() {
            return CursorIcon::Crosshair;
        }
        if !self.drawings_visible {
            return CursorIcon::Default;
        }
        match self.hit_tester.hit(&self.drawings, self.selected.as_ref(), p, mapper) {
            Hit::Handle { .. } => CursorIcon::Pointer,
            Hit::Body(_) => CursorIcon::Move,
            Hit::Miss => CursorIcon::Default,
        }
    }

    /// Select a persisted drawing, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<DrawingId>) -> Response {
        let next = id.filter(|id| self.drawings.contains(id));
        if next == self.selected {
            return Response::default();
        }
        self.selected = next;
        Response::redraw(true)
    }

    pub fn update_style(&mut self, id: &DrawingId, patch: &StylePatch) -> Response {
        if !self.editable() || patch.is_empty() {
            return Response::default();
        }
        match self.drawings.with_style(id, patch) {
            Some(next) => {
                info!("restyled {id}");
                self.commit(next);
                Response::redraw(true)
            }
            None => Response::default(),
        }
    }

    pub fn update_selected_style(&mut self, patch: &StylePatch) -> Response {
        match self.selected.clone() {
            Some(id) => self.update_style(&id, patch),
            None => Response::default(),
        }
    }

    pub fn delete(&mut self, id: &DrawingId) -> Response {
        if !self.editable() {
            return Response::default();
        }
        match self.drawings.without(id) {
            Some(next) => {
                info!("deleted {id}");
                self.commit(next);
                Response::redraw(true)
            }
            None => Response::default(),
        }
    }

    pub fn delete_selected(&mut self) -> Response {
        match self.selected.clone() {
            Some(id) => self.delete(&id),
            None => Response::default(),
        }
    }

    pub fn clear(&mut self) -> Response {
        if !self.editable() || self.drawings.is_empty() {
            return Response::default();
        }
        info!("cleared {} drawing(s)", self.drawings.len());
        self.commit(ChartDrawings::default());
        Response::redraw(true)
    }

    fn editable(&self) -> bool {
        if self.interaction.is_idle() {
            return true;
        }
        debug!("edit refused while {}", self.interaction.label());
        false
    }

    fn commit(&mut self, next: ChartDrawings) {
        self.drawings = next;
        self.retain_selection();
        for listener in &mut self.listeners {
            listener(&self.drawings);
        }
    }

    fn retain_selection(&mut self) {
        if self.selected.as_ref().is_some_and(|id| !self.drawings.contains(id)) {
            self.selected = None;
        }
    }

    fn suspend(&self, pointer: PointerId, host: &mut dyn GestureHost) {
        host.set_chart_gestures_enabled(false);
        host.capture_pointer(pointer);
    }

    fn resume(&self, pointer: PointerId, host: &mut dyn GestureHost) {
        host.release_pointer(pointer);
        host.set_chart_gestures_enabled(true);
    }
}

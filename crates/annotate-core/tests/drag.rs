// File: crates/annotate-core/tests/drag.rs
// Purpose: Moving and resizing persisted drawings: parallel moves at several zoom levels, handle resizes, abandoned drags, single commits.

mod common;

use std::cell::Cell;
use std::rc::Rc;

use annotate_core::drag::{DragController, DragMode, DragOutcome};
use annotate_core::drawing::{ChartDrawings, Drawing, DrawingDefaults, PointInTime, TrendLine};
use annotate_core::geometry::Point;
use annotate_core::interaction::InteractionState;
use annotate_core::types::PointerId;
use annotate_core::viewport::{ScaleViewport, ViewportMapper};
use annotate_core::Annotator;
use common::*;

const MOUSE: PointerId = PointerId::MOUSE;

fn annotator_with(line: TrendLine) -> (Annotator, Rc<Cell<usize>>) {
    let commits = Rc::new(Cell::new(0));
    let counter = Rc::clone(&commits);
    let mut ann = Annotator::default().with_drawings(ChartDrawings { trend_lines: vec![line], fibs: Vec::new() });
    ann.on_change(Box::new(move |_: &ChartDrawings| counter.set(counter.get() + 1)));
    (ann, commits)
}

fn line(a: (usize, f64), b: (usize, f64)) -> TrendLine {
    TrendLine::new(
        PointInTime::new(time(a.0), a.1),
        PointInTime::new(time(b.0), b.1),
        &DrawingDefaults::default(),
    )
}

fn midpoint(vp: &ScaleViewport, t: &TrendLine) -> Point {
    let a = vp.project(t.start).unwrap();
    let b = vp.project(t.end).unwrap();
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn assert_parallel_move(vp: &ScaleViewport) {
    let mut host = RecordingHost::default();
    let original = line((40, 100.0), (50, 120.0));
    let (mut ann, commits) = annotator_with(original.clone());

    let grab = midpoint(vp, &original);
    let target = vp.to_screen(time(48), 115.0).unwrap();
    assert!(ann.pointer_down(MOUSE, grab, vp, &mut host).consumed);
    assert!(matches!(ann.interaction(), InteractionState::Dragging(_)));
    assert!(!host.gestures_enabled);
    ann.pointer_move(MOUSE, Point::new(grab.x + 5.0, grab.y), vp);
    ann.pointer_move(MOUSE, target, vp);
    ann.pointer_up(MOUSE, Some(target), vp, &mut host);

    let moved = &ann.drawings().trend_lines[0];
    assert_eq!(moved.id, original.id);
    assert_eq!(moved.start.time, time(43));
    assert_eq!(moved.end.time, time(53));
    assert!((moved.start.price - 105.0).abs() < 1e-6);
    assert!((moved.end.price - 125.0).abs() < 1e-6);
    // Shape preserved: same price span between the endpoints.
    assert!(((moved.end.price - moved.start.price) - 20.0).abs() < 1e-9);
    assert_eq!(commits.get(), 1);
    assert!(host.gestures_enabled);
    assert!(ann.interaction().is_idle());
}

#[test]
fn body_move_shifts_by_bars_across_weekends() {
    let vp = weekday_viewport();
    let mut host = RecordingHost::default();
    let original = TrendLine::new(
        PointInTime::new(weekday_time(40), 100.0),
        PointInTime::new(weekday_time(48), 120.0),
        &DrawingDefaults::default(),
    );
    let (mut ann, commits) = annotator_with(original.clone());

    // Bar 44 at 110 is the midpoint; drop it on bar 47 at 115.
    let grab = midpoint(&vp, &original);
    assert!(near(grab, at(44, 110.0), 0.01));
    ann.pointer_down(MOUSE, grab, &vp, &mut host);
    ann.pointer_move(MOUSE, at(47, 115.0), &vp);
    ann.pointer_up(MOUSE, Some(at(47, 115.0)), &vp, &mut host);

    let moved = &ann.drawings().trend_lines[0];
    assert_eq!(moved.start.time, weekday_time(43));
    assert_eq!(moved.end.time, weekday_time(51));
    assert_eq!(ann.selected_drawing().map(|d| d.end()), Some(moved.end));
    // Three bars is not a fixed number of seconds once weekends are skipped.
    assert_ne!(moved.start.time - original.start.time, moved.end.time - original.end.time);
    assert!((moved.start.price - 105.0).abs() < 1e-6);
    assert!((moved.end.price - 125.0).abs() < 1e-6);
    assert_eq!(commits.get(), 1);
}

#[test]
fn body_move_is_parallel_when_fitted() {
    assert_parallel_move(&viewport());
}

#[test]
fn body_move_is_parallel_when_zoomed_in() {
    let mut vp = viewport();
    vp.zoom_at(400.0, 2.0);
    assert_parallel_move(&vp);
}

#[test]
fn body_move_is_parallel_when_panned_and_zoomed_out() {
    let mut vp = viewport();
    vp.zoom_at(400.0, 0.5);
    vp.pan(-40.0, 0.0);
    assert_parallel_move(&vp);
}

#[test]
fn start_handle_leaves_end_untouched() {
    let vp = viewport();
    let mut host = RecordingHost::default();
    let original = line((10, 100.0), (20, 120.0));
    let (mut ann, commits) = annotator_with(original.clone());

    // First press selects without moving anything.
    ann.pointer_down(MOUSE, at(15, 110.0), &vp, &mut host);
    ann.pointer_up(MOUSE, Some(at(15, 110.0)), &vp, &mut host);
    assert_eq!(ann.selection(), Some(&original.id));
    assert_eq!(commits.get(), 0);

    ann.pointer_down(MOUSE, at(10, 100.0), &vp, &mut host);
    ann.pointer_move(MOUSE, at(5, 90.0), &vp);
    ann.pointer_up(MOUSE, Some(at(5, 90.0)), &vp, &mut host);

    let t = &ann.drawings().trend_lines[0];
    assert_eq!(t.start.time, time(5));
    assert!((t.start.price - 90.0).abs() < 1e-9);
    assert_eq!(t.end, original.end);
    assert_eq!(commits.get(), 1);
}

#[test]
fn end_handle_leaves_start_untouched() {
    let vp = viewport();
    let mut host = RecordingHost::default();
    let original = line((10, 100.0), (20, 120.0));
    let (mut ann, _) = annotator_with(original.clone());
    ann.select(Some(original.id.clone()));

    ann.pointer_down(MOUSE, at(20, 120.0), &vp, &mut host);
    ann.pointer_up(MOUSE, Some(at(30, 80.0)), &vp, &mut host);

    let t = &ann.drawings().trend_lines[0];
    assert_eq!(t.start, original.start);
    assert_eq!(t.end.time, time(30));
    assert!((t.end.price - 80.0).abs() < 1e-9);
}

#[test]
fn release_off_the_plot_keeps_pre_drag_geometry() {
    let vp = viewport();
    let mut host = RecordingHost::default();
    let original = line((10, 100.0), (20, 120.0));
    let (mut ann, commits) = annotator_with(original.clone());

    ann.pointer_down(MOUSE, at(15, 110.0), &vp, &mut host);
    ann.pointer_move(MOUSE, at(25, 130.0), &vp);
    ann.pointer_up(MOUSE, Some(Point::new(-30.0, 500.0)), &vp, &mut host);

    assert_eq!(ann.drawings().trend_lines[0], original);
    assert_eq!(commits.get(), 0);
    assert!(host.gestures_enabled);
    assert_eq!(host.captured, None);
    assert!(ann.interaction().is_idle());
}

#[test]
fn cancelled_drag_reverts() {
    let vp = viewport();
    let mut host = RecordingHost::default();
    let original = line((10, 100.0), (20, 120.0));
    let (mut ann, commits) = annotator_with(original.clone());
    ann.pointer_down(MOUSE, at(15, 110.0), &vp, &mut host);
    ann.pointer_move(MOUSE, at(25, 130.0), &vp);
    ann.cancel_interaction(&mut host);
    ann.pointer_up(MOUSE, Some(at(25, 130.0)), &vp, &mut host);
    assert_eq!(ann.drawings().trend_lines[0], original);
    assert_eq!(commits.get(), 0);
}

#[test]
fn edits_wait_for_the_drag_to_finish() {
    let vp = viewport();
    let mut host = RecordingHost::default();
    let original = line((10, 100.0), (20, 120.0));
    let (mut ann, _) = annotator_with(original.clone());
    ann.pointer_down(MOUSE, at(15, 110.0), &vp, &mut host);
    assert!(!ann.delete(&original.id).redraw);
    assert_eq!(ann.drawings().len(), 1);
    ann.pointer_up(MOUSE, Some(at(16, 110.0)), &vp, &mut host);
    assert!(ann.delete(&original.id).redraw);
    assert!(ann.drawings().is_empty());
}

#[test]
fn move_past_the_data_keeps_last_valid_staging() {
    let vp = viewport();
    let drawing = Drawing::TrendLine(line((90, 100.0), (95, 110.0)));
    let mut session = DragController::begin(&drawing, DragMode::Move, at(92, 104.0), MOUSE, &vp).unwrap();

    assert!(DragController::update(&mut session, at(95, 104.0), &vp));
    assert_eq!(session.staged.end().time, time(98));
    // End would land on bar 101, past the last bar.
    assert!(!DragController::update(&mut session, at(98, 104.0), &vp));
    assert_eq!(session.staged.start().time, time(93));
    assert_eq!(session.staged.end().time, time(98));

    match DragController::finish(session, Some(at(98, 104.0)), &vp) {
        DragOutcome::Commit(d) => {
            assert_eq!(d.start().time, time(93));
            assert_eq!(d.end().time, time(98));
        }
        other => panic!("expected commit, got {other:?}"),
    }
}

#[test]
fn zero_move_is_unchanged() {
    let vp = viewport();
    let drawing = Drawing::TrendLine(line((10, 100.0), (20, 120.0)));
    let session = DragController::begin(&drawing, DragMode::Move, at(15, 110.0), MOUSE, &vp).unwrap();
    assert_eq!(DragController::finish(session, None, &vp), DragOutcome::Unchanged);
}

#[test]
fn no_snapshot_outside_the_data() {
    let vp = viewport();
    let drawing = Drawing::TrendLine(TrendLine::new(
        PointInTime::new(time(0) - 5 * DAY, 100.0),
        PointInTime::new(time(20), 120.0),
        &DrawingDefaults::default(),
    ));
    assert!(DragController::begin(&drawing, DragMode::Move, at(15, 110.0), MOUSE, &vp).is_none());
}

//! Map-bound polygon drawing tests
//!
//! - Listener attached only while drawing
//! - Restarts never leave a second listener behind
//! - Late clicks from a stale listener are ignored

mod common;

use agro_field_engine::services::DrawingSession;
use common::*;
use shared::{CaptureError, CaptureState};

// ============================================================================
// Listener Lifecycle
// ============================================================================

#[test]
fn test_listener_attached_only_while_drawing() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());
    assert_eq!(map.listener_count(), 0);

    session.start_drawing();
    assert_eq!(map.listener_count(), 1);
    assert!(session.has_listener());

    for p in square_polygon() {
        map.click(p);
    }
    session.finish_drawing().unwrap();

    assert_eq!(map.listener_count(), 0);
    assert!(!session.has_listener());

    // Clicks after finishing go nowhere
    map.click(coord(11.1, 7.8));
    assert_eq!(session.points(), square_polygon());
}

#[test]
fn test_restart_detaches_previous_listener() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());

    session.start_drawing();
    map.click(coord(11.0, 7.0));
    session.start_drawing();

    assert_eq!(map.listener_count(), 1);
    assert_eq!(map.detached().len(), 1);
    assert!(session.points().is_empty());

    map.click(coord(11.2, 7.2));
    assert_eq!(session.points(), vec![coord(11.2, 7.2)]);
}

#[test]
fn test_stale_listener_fired_late_is_ignored() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());

    session.start_drawing();
    let stale = map.snapshot_listeners();
    session.start_drawing();

    // The surface delivers a click to the old callback after detaching it
    for listener in &stale {
        listener(coord(1.0, 1.0));
    }
    map.click(coord(2.0, 2.0));

    assert_eq!(session.points(), vec![coord(2.0, 2.0)]);
}

#[test]
fn test_clear_detaches_and_empties() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());

    session.start_drawing();
    map.click(coord(11.0, 7.0));
    session.clear();

    assert_eq!(map.listener_count(), 0);
    assert_eq!(session.state(), CaptureState::Idle);
    assert!(session.points().is_empty());
}

#[test]
fn test_drop_detaches_listener() {
    let map = RecordingMap::new();
    {
        let mut session = DrawingSession::new(map.clone());
        session.start_drawing();
        assert_eq!(map.listener_count(), 1);
    }
    assert_eq!(map.listener_count(), 0);
}

// ============================================================================
// Finishing
// ============================================================================

#[test]
fn test_short_polygon_is_discarded() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());

    session.start_drawing();
    map.click(coord(11.0, 7.0));
    map.click(coord(11.0, 7.1));

    let result = session.finish_drawing();

    assert_eq!(
        result,
        Err(CaptureError::TooFewPoints {
            required: 3,
            actual: 2
        })
    );
    assert!(session.points().is_empty());
    assert!(!session.is_drawing());
    assert_eq!(map.listener_count(), 0);
}

#[test]
fn test_valid_polygon_keeps_click_order() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map.clone());

    session.start_drawing();
    for p in square_polygon() {
        map.click(p);
    }
    let polygon = session.finish_drawing().unwrap();

    assert_eq!(polygon.points(), square_polygon().as_slice());
    assert_eq!(session.finalized(), Some(polygon));
}

#[test]
fn test_finish_while_idle_is_rejected() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map);

    assert_eq!(session.finish_drawing(), Err(CaptureError::NotDrawing));
}

#[test]
fn test_direct_clicks_respect_state() {
    let map = RecordingMap::new();
    let mut session = DrawingSession::new(map);

    assert!(!session.handle_click(coord(1.0, 1.0)));
    session.start_drawing();
    assert!(session.handle_click(coord(1.0, 1.0)));
    assert_eq!(session.points().len(), 1);
}

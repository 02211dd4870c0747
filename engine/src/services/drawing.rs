//! Map-bound polygon drawing
//!
//! Wraps the pure [`PolygonCapture`] state machine and owns the click
//! listener registration on the map. The map only ever holds the listener
//! for the current draw.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use shared::{CaptureError, CaptureState, Coordinate, FinalizedPolygon, PolygonCapture};
use tracing::{debug, info, warn};

use crate::external::map::{ClickListener, ListenerId, MapSurface};

fn lock(capture: &Mutex<PolygonCapture>) -> MutexGuard<'_, PolygonCapture> {
    capture.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct DrawingSession {
    map: Arc<dyn MapSurface>,
    capture: Arc<Mutex<PolygonCapture>>,
    listener: Option<ListenerId>,
}

impl DrawingSession {
    pub fn new(map: Arc<dyn MapSurface>) -> Self {
        Self {
            map,
            capture: Arc::new(Mutex::new(PolygonCapture::new())),
            listener: None,
        }
    }

    /// Begin a new draw, discarding any previous points.
    ///
    /// The previous listener is detached before the new one is attached.
    /// Clicks delivered late to an old listener are dropped by generation.
    pub fn start_drawing(&mut self) {
        self.detach_listener();
        let generation = lock(&self.capture).start_drawing();

        let capture = Arc::clone(&self.capture);
        let listener: ClickListener = Arc::new(move |coordinate| {
            lock(&capture).handle_click_for(generation, coordinate);
        });
        self.listener = Some(self.map.on_click(listener));

        info!(generation, "Polygon drawing started");
    }

    /// Record a vertex directly; a no-op unless drawing
    pub fn handle_click(&self, coordinate: Coordinate) -> bool {
        lock(&self.capture).handle_click(coordinate)
    }

    /// Stop drawing and validate.
    ///
    /// With fewer than three points the polygon is cleared and
    /// `TooFewPoints` returned; the session is idle either way.
    pub fn finish_drawing(&mut self) -> Result<FinalizedPolygon, CaptureError> {
        self.detach_listener();
        let result = lock(&self.capture).finish_drawing();

        match &result {
            Ok(polygon) => info!(points = polygon.len(), "Polygon finalized"),
            Err(CaptureError::TooFewPoints { required, actual }) => {
                warn!(required, actual, "Polygon discarded; too few points")
            }
            Err(CaptureError::OutOfRange(e)) => warn!(error = %e, "Polygon discarded"),
            Err(CaptureError::NotDrawing) => debug!("Finish requested while idle"),
        }
        result
    }

    /// Abandon the draw without validation
    pub fn clear(&mut self) {
        self.detach_listener();
        lock(&self.capture).clear();
        debug!("Polygon cleared");
    }

    pub fn state(&self) -> CaptureState {
        lock(&self.capture).state()
    }

    pub fn is_drawing(&self) -> bool {
        lock(&self.capture).is_drawing()
    }

    pub fn points(&self) -> Vec<Coordinate> {
        lock(&self.capture).points().to_vec()
    }

    pub fn finalized(&self) -> Option<FinalizedPolygon> {
        lock(&self.capture).finalized()
    }

    pub fn has_listener(&self) -> bool {
        self.listener.is_some()
    }

    fn detach_listener(&mut self) {
        if let Some(id) = self.listener.take() {
            self.map.off_click(id);
        }
    }
}

impl Drop for DrawingSession {
    fn drop(&mut self) {
        self.detach_listener();
    }
}

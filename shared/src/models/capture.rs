//! Polygon capture state machine
//!
//! Turns a sequence of map clicks into a validated closed polygon:
//! `Idle -> Drawing -> Idle`. Finishing with fewer than
//! [`MIN_POLYGON_POINTS`] points discards the draft.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Coordinate, CoordinateError};

/// Smallest point count that forms a valid field boundary
pub const MIN_POLYGON_POINTS: usize = 3;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureState {
    #[default]
    Idle,
    Drawing,
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CaptureError {
    #[error("Polygon requires at least {required} points to be valid; got {actual}")]
    TooFewPoints { required: usize, actual: usize },

    #[error("Polygon vertex out of range: {0}")]
    OutOfRange(#[from] CoordinateError),

    #[error("Polygon capture is not drawing")]
    NotDrawing,
}

/// A point sequence that passed the minimum-size and range validations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Coordinate>", into = "Vec<Coordinate>")]
pub struct FinalizedPolygon(Vec<Coordinate>);

impl FinalizedPolygon {
    pub fn points(&self) -> &[Coordinate] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<Coordinate>> for FinalizedPolygon {
    type Error = CaptureError;

    fn try_from(points: Vec<Coordinate>) -> Result<Self, Self::Error> {
        crate::validation::validate_polygon(&points)?;
        crate::validation::validate_coordinates(&points)?;
        Ok(Self(points))
    }
}

impl From<FinalizedPolygon> for Vec<Coordinate> {
    fn from(polygon: FinalizedPolygon) -> Self {
        polygon.0
    }
}

/// Drawing state and the in-progress (or finalized) point sequence
#[derive(Debug, Clone, Default)]
pub struct PolygonCapture {
    state: CaptureState,
    points: Vec<Coordinate>,
    /// Bumped on every `start_drawing`; lets listeners detect they are stale
    generation: u64,
}

impl PolygonCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin (or restart) a draw; previously accumulated points are discarded.
    ///
    /// Returns the generation number of the new draw.
    pub fn start_drawing(&mut self) -> u64 {
        self.points.clear();
        self.state = CaptureState::Drawing;
        self.generation += 1;
        self.generation
    }

    /// Append a vertex while drawing. Returns whether the point was recorded;
    /// out-of-range coordinates are never recorded.
    pub fn handle_click(&mut self, coordinate: Coordinate) -> bool {
        if self.state != CaptureState::Drawing {
            return false;
        }
        if Coordinate::new(coordinate.latitude, coordinate.longitude).is_err() {
            return false;
        }
        self.points.push(coordinate);
        true
    }

    /// Like [`handle_click`](Self::handle_click), but ignores clicks that
    /// belong to an earlier draw.
    pub fn handle_click_for(&mut self, generation: u64, coordinate: Coordinate) -> bool {
        generation == self.generation && self.handle_click(coordinate)
    }

    /// Stop drawing and validate the result.
    ///
    /// With too few points the draft is cleared and `TooFewPoints` returned;
    /// the capture is back in `Idle` either way.
    pub fn finish_drawing(&mut self) -> Result<FinalizedPolygon, CaptureError> {
        if self.state != CaptureState::Drawing {
            return Err(CaptureError::NotDrawing);
        }
        self.state = CaptureState::Idle;

        match FinalizedPolygon::try_from(self.points.clone()) {
            Ok(polygon) => Ok(polygon),
            Err(e) => {
                self.points.clear();
                Err(e)
            }
        }
    }

    /// Back to `Idle` with an empty polygon, without validation
    pub fn clear(&mut self) {
        self.state = CaptureState::Idle;
        self.points.clear();
    }

    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == CaptureState::Drawing
    }

    pub fn points(&self) -> &[Coordinate] {
        &self.points
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The finalized polygon, if the last draw completed successfully
    pub fn finalized(&self) -> Option<FinalizedPolygon> {
        if self.is_drawing() {
            return None;
        }
        FinalizedPolygon::try_from(self.points.clone()).ok()
    }
}

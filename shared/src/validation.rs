//! Validation utilities for field delineation input

use crate::models::{CaptureError, MIN_POLYGON_POINTS};
use crate::types::{Coordinate, CoordinateError};

// ============================================================================
// Geometry Validations
// ============================================================================

/// A field boundary needs at least three vertices
pub fn validate_polygon(points: &[Coordinate]) -> Result<(), CaptureError> {
    if points.len() < MIN_POLYGON_POINTS {
        return Err(CaptureError::TooFewPoints {
            required: MIN_POLYGON_POINTS,
            actual: points.len(),
        });
    }
    Ok(())
}

/// Range-check every vertex of a polygon
pub fn validate_coordinates(points: &[Coordinate]) -> Result<(), CoordinateError> {
    points
        .iter()
        .try_for_each(|p| Coordinate::new(p.latitude, p.longitude).map(|_| ()))
}

// ============================================================================
// Search Validations
// ============================================================================

/// Normalize a free-text place query; blank input yields `None`
pub fn normalize_place_query(query: &str) -> Option<&str> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// ISO 3166-1 alpha-2 country code used to confine geocoding
pub fn validate_country_code(code: &str) -> Result<(), &'static str> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err("Country code must be two ASCII letters");
    }
    Ok(())
}

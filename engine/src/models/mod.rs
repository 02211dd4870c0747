//! Domain models
//!
//! Re-exports the shared crate's models so engine code and embedders import
//! them from one place.

pub use shared::models::*;
pub use shared::types::{centroid, Coordinate, CoordinateError};

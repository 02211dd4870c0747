//! Field delineation and derived-metrics engine
//!
//! Turns a polygon drawn on a map into agronomic metrics by chaining the
//! geometry backend, weather fallbacks, crop prediction and AI advice. Also
//! hosts the device location tracker, place search and map-bound polygon
//! drawing that feed the pipeline.

pub mod config;
pub mod error;
pub mod external;
pub mod models;
pub mod services;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult, ErrorDetail};

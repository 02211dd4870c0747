//! Weather fallback chain
//!
//! Fills temperature and rainfall the geometry backend left out by asking
//! each configured source in order, keeping the first value seen per field.

use std::sync::Arc;

use shared::{Coordinate, GeometryResult, WeatherReading};
use tracing::{debug, info, warn};

use crate::external::weather::WeatherSource;

/// Ordered weather sources; earlier sources win field by field
#[derive(Clone)]
pub struct WeatherFallbackChain {
    sources: Vec<Arc<dyn WeatherSource>>,
}

impl WeatherFallbackChain {
    pub fn new(primary: Arc<dyn WeatherSource>, secondary: Arc<dyn WeatherSource>) -> Self {
        Self {
            sources: vec![primary, secondary],
        }
    }

    pub fn with_sources(sources: Vec<Arc<dyn WeatherSource>>) -> Self {
        Self { sources }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Reading at the centroid of the field bounds; empty bounds yield an
    /// empty reading
    pub async fn resolve(&self, geometry: &GeometryResult) -> WeatherReading {
        match geometry.bounds_centroid() {
            Some(center) => self.resolve_at(center).await,
            None => {
                warn!("Polygon bounds are empty; skipping weather lookup");
                WeatherReading::EMPTY
            }
        }
    }

    /// Query sources in order until both fields are known.
    ///
    /// A failing source is logged and skipped. No defaults are applied here.
    pub async fn resolve_at(&self, center: Coordinate) -> WeatherReading {
        let mut merged = WeatherReading::EMPTY;

        for source in &self.sources {
            if merged.is_complete() {
                break;
            }
            match source.reading(center).await {
                Ok(reading) => {
                    debug!(source = source.name(), ?reading, "Weather source answered");
                    merged = merged.or(reading);
                }
                Err(e) => {
                    warn!(source = source.name(), error = %e, "Weather source failed");
                }
            }
        }

        if !merged.is_complete() {
            info!(%center, ?merged, "Weather fallback exhausted");
        }
        merged
    }
}

//! Place search resolver
//!
//! Turns a free-text query into a map position inside the configured
//! country. A hit moves the camera and leaves manual mode.

use std::sync::Arc;

use shared::{normalize_place_query, Coordinate};
use tracing::{debug, info};

use crate::config::{GeocodingConfig, TrackingConfig};
use crate::error::AppResult;
use crate::external::geocoding::Geocoder;
use crate::external::map::MapSurface;
use crate::services::tracking::SharedLocation;

#[derive(Debug, Clone, PartialEq)]
pub enum PlaceLookup {
    /// Blank query; nothing was requested
    Skipped,
    Found {
        coordinate: Coordinate,
        display_name: String,
    },
    NotFound {
        message: String,
    },
}

pub struct PlaceResolver {
    geocoder: Arc<dyn Geocoder>,
    map: Arc<dyn MapSurface>,
    location: SharedLocation,
    country_code: String,
    country_name: String,
    zoom: u8,
}

impl PlaceResolver {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        map: Arc<dyn MapSurface>,
        location: SharedLocation,
        geocoding: &GeocodingConfig,
        tracking: &TrackingConfig,
    ) -> Self {
        Self {
            geocoder,
            map,
            location,
            country_code: geocoding.country_code.clone(),
            country_name: geocoding.country_name.clone(),
            zoom: tracking.fly_to_zoom,
        }
    }

    /// Look up `query`; `Err(LookupFailed)` only on transport failure
    pub async fn resolve(&self, query: &str) -> AppResult<PlaceLookup> {
        let Some(query) = normalize_place_query(query) else {
            debug!("Empty place query; skipping lookup");
            return Ok(PlaceLookup::Skipped);
        };

        let matches = self.geocoder.search(query, &self.country_code).await?;

        let Some(best) = matches.into_iter().next() else {
            info!(query, country = %self.country_code, "No place found");
            return Ok(PlaceLookup::NotFound {
                message: format!("No results found in {}", self.country_name),
            });
        };

        self.location.send_modify(|s| {
            s.position = Some(best.coordinate);
            s.manual_mode = false;
        });
        self.map.fly_to(best.coordinate, self.zoom);
        info!(query, coordinate = %best.coordinate, "Place found");

        Ok(PlaceLookup::Found {
            coordinate: best.coordinate,
            display_name: best.display_name,
        })
    }
}

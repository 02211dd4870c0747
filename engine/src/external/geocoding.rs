//! Place search via Nominatim, restricted to a single country

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Deserialize;
use shared::Coordinate;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::external::read_json;

/// A ranked place search hit
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeMatch {
    pub coordinate: Coordinate,
    pub display_name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Ranked matches for `query` inside `country_code`; empty when nothing matched
    async fn search(&self, query: &str, country_code: &str) -> AppResult<Vec<GeocodeMatch>>;
}

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim search client
#[derive(Clone)]
pub struct NominatimClient {
    client: Client,
    base_url: String,
    user_agent: String,
}

impl NominatimClient {
    pub fn new(client: Client, base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
        }
    }

    /// Drop hits whose coordinates do not parse or fall out of range
    fn convert_places(places: Vec<NominatimPlace>) -> Vec<GeocodeMatch> {
        places
            .into_iter()
            .filter_map(|place| {
                let latitude = place.lat.trim().parse::<f64>().ok()?;
                let longitude = place.lon.trim().parse::<f64>().ok()?;
                match Coordinate::new(latitude, longitude) {
                    Ok(coordinate) => Some(GeocodeMatch {
                        coordinate,
                        display_name: place.display_name,
                    }),
                    Err(e) => {
                        warn!(error = %e, "Skipping geocoding hit");
                        None
                    }
                }
            })
            .collect()
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &str, country_code: &str) -> AppResult<Vec<GeocodeMatch>> {
        let url = format!("{}/search", self.base_url);
        debug!(query, country_code, "Searching place");

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, &self.user_agent)
            .query(&[
                ("countrycodes", country_code),
                ("format", "json"),
                ("q", query),
            ])
            .send()
            .await
            .map_err(|e| AppError::LookupFailed(format!("Geocoding request failed: {}", e)))?;

        let places: Vec<NominatimPlace> =
            read_json(response, "geocoding", AppError::LookupFailed).await?;

        Ok(Self::convert_places(places))
    }
}

//! External API integrations and device/UI collaborator seams

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use crate::error::{AppError, AppResult};

pub mod advice;
pub mod geocoding;
pub mod geometry;
pub mod location;
pub mod map;
pub mod prediction;
pub mod weather;

pub use advice::{AdviceBackend, AdviceClient, AdviceRequest, ADVICE_PROMPT};
pub use geocoding::{GeocodeMatch, Geocoder, NominatimClient};
pub use geometry::{GeometryBackend, GeometryClient};
pub use location::{
    LocationError, LocationSource, PositionOptions, PositionWatch, UnsupportedLocation, WatchId,
};
pub use map::{ClickListener, ListenerId, MapSurface};
pub use prediction::{PredictionBackend, PredictionClient};
pub use weather::{NasaPowerClient, OpenMeteoClient, WeatherSource};

/// Build the HTTP client shared by every backend client
pub fn http_client(timeout: Option<Duration>) -> AppResult<Client> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// Reject non-2xx responses and decode the JSON body.
///
/// `service` names the caller in error messages and maps the failure onto
/// that caller's error variant.
pub(crate) async fn read_json<T: DeserializeOwned>(
    response: Response,
    service: &str,
    into_error: fn(String) -> AppError,
) -> AppResult<T> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(into_error(format!("{} error: {} - {}", service, status, body)));
    }

    response
        .json()
        .await
        .map_err(|e| into_error(format!("Failed to parse {} response: {}", service, e)))
}

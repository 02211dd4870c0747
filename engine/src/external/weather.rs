//! Weather API clients for the fallback chain
//!
//! Open-Meteo supplies current conditions; NASA POWER supplies the latest
//! daily point values. Both normalize to [`WeatherReading`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinate, WeatherReading};
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::external::read_json;

/// NASA POWER marks missing days with this value
const POWER_FILL_VALUE: f64 = -999.0;

/// Days of daily data requested from NASA POWER, ending yesterday
const POWER_WINDOW_DAYS: u64 = 7;

/// A weather provider queried by coordinate
#[async_trait]
pub trait WeatherSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn reading(&self, at: Coordinate) -> AppResult<WeatherReading>;
}

/// Open-Meteo forecast response (current block only)
#[derive(Debug, Deserialize)]
struct OpenMeteoResponse {
    #[serde(default)]
    current: Option<OpenMeteoCurrent>,
}

#[derive(Debug, Deserialize)]
struct OpenMeteoCurrent {
    temperature_2m: Option<f64>,
    precipitation: Option<f64>,
}

/// NASA POWER daily point response
#[derive(Debug, Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Debug, Deserialize)]
struct PowerProperties {
    parameter: PowerParameters,
}

/// Date-keyed (`YYYYMMDD`) series; keys sort chronologically
#[derive(Debug, Deserialize)]
struct PowerParameters {
    #[serde(rename = "T2M", default)]
    temperature: BTreeMap<String, f64>,
    #[serde(rename = "PRECTOTCORR", alias = "PRECTOT", default)]
    precipitation: BTreeMap<String, f64>,
}

/// Open-Meteo current conditions client
#[derive(Clone)]
pub struct OpenMeteoClient {
    client: Client,
    base_url: String,
}

impl OpenMeteoClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, "https://api.open-meteo.com")
    }

    /// Create a client with custom base URL (for testing)
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn convert_response(data: OpenMeteoResponse) -> WeatherReading {
        data.current
            .map(|c| WeatherReading::new(c.temperature_2m, c.precipitation))
            .unwrap_or(WeatherReading::EMPTY)
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    fn name(&self) -> &'static str {
        "open-meteo"
    }

    async fn reading(&self, at: Coordinate) -> AppResult<WeatherReading> {
        let url = format!("{}/v1/forecast", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", at.latitude.to_string()),
                ("longitude", at.longitude.to_string()),
                ("current", "temperature_2m,precipitation".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::WeatherSource {
                source_name: self.name(),
                message: format!("request failed: {}", e),
            })?;

        let data: OpenMeteoResponse = read_json(response, "Open-Meteo", |message| {
            AppError::WeatherSource {
                source_name: "open-meteo",
                message,
            }
        })
        .await?;

        let reading = Self::convert_response(data);
        debug!(%at, ?reading, "Open-Meteo reading");
        Ok(reading)
    }
}

/// NASA POWER daily point client
#[derive(Clone)]
pub struct NasaPowerClient {
    client: Client,
    base_url: String,
}

impl NasaPowerClient {
    pub fn new(client: Client) -> Self {
        Self::with_base_url(client, "https://power.larc.nasa.gov")
    }

    /// Create a client with custom base URL (for testing)
    pub fn with_base_url(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Query for the daily window ending the day before `today`
    fn query(at: Coordinate, today: NaiveDate) -> Vec<(&'static str, String)> {
        let end = today.checked_sub_days(Days::new(1)).unwrap_or(today);
        let start = end
            .checked_sub_days(Days::new(POWER_WINDOW_DAYS - 1))
            .unwrap_or(end);

        vec![
            ("parameters", "T2M,PRECTOTCORR".to_string()),
            ("community", "RE".to_string()),
            ("longitude", at.longitude.to_string()),
            ("latitude", at.latitude.to_string()),
            ("start", start.format("%Y%m%d").to_string()),
            ("end", end.format("%Y%m%d").to_string()),
            ("format", "JSON".to_string()),
        ]
    }

    fn convert_response(data: PowerResponse) -> WeatherReading {
        let parameters = data.properties.parameter;
        WeatherReading::new(
            latest_valid(&parameters.temperature),
            latest_valid(&parameters.precipitation),
        )
    }
}

/// Most recent value that is not the fill marker
fn latest_valid(series: &BTreeMap<String, f64>) -> Option<f64> {
    series
        .values()
        .rev()
        .copied()
        .find(|v| v.is_finite() && *v > POWER_FILL_VALUE)
}

#[async_trait]
impl WeatherSource for NasaPowerClient {
    fn name(&self) -> &'static str {
        "nasa-power"
    }

    async fn reading(&self, at: Coordinate) -> AppResult<WeatherReading> {
        let url = format!("{}/api/temporal/daily/point", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&Self::query(at, Utc::now().date_naive()))
            .send()
            .await
            .map_err(|e| AppError::WeatherSource {
                source_name: self.name(),
                message: format!("request failed: {}", e),
            })?;

        let data: PowerResponse = read_json(response, "NASA POWER", |message| {
            AppError::WeatherSource {
                source_name: "nasa-power",
                message,
            }
        })
        .await?;

        let reading = Self::convert_response(data);
        debug!(%at, ?reading, "NASA POWER reading");
        Ok(reading)
    }
}

//! Weather data models

use serde::{Deserialize, Serialize};

use crate::models::defaults::MetricDefaults;
use crate::models::field::GeometryResult;

/// Normalized reading shared by every weather source.
///
/// A `None` field means the source had no usable value for it.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherReading {
    /// Air temperature (°C)
    pub temperature: Option<f64>,
    /// Precipitation (mm)
    pub rainfall: Option<f64>,
}

impl WeatherReading {
    pub const EMPTY: WeatherReading = WeatherReading {
        temperature: None,
        rainfall: None,
    };

    pub fn new(temperature: Option<f64>, rainfall: Option<f64>) -> Self {
        Self {
            temperature,
            rainfall,
        }
    }

    /// Both fields are known
    pub fn is_complete(&self) -> bool {
        self.temperature.is_some() && self.rainfall.is_some()
    }

    /// Fill this reading's gaps from `other`; fields already present win.
    pub fn or(self, other: WeatherReading) -> WeatherReading {
        WeatherReading {
            temperature: self.temperature.or(other.temperature),
            rainfall: self.rainfall.or(other.rainfall),
        }
    }
}

/// Temperature and rainfall after fallbacks and defaults have been applied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ResolvedClimate {
    pub temperature_c: f64,
    pub rainfall_mm: f64,
}

impl ResolvedClimate {
    /// Backend values first, then the fallback reading, then the defaults
    pub fn resolve(
        geometry: &GeometryResult,
        fallback: WeatherReading,
        defaults: &MetricDefaults,
    ) -> Self {
        Self {
            temperature_c: geometry
                .avg_temp_c
                .or(fallback.temperature)
                .unwrap_or(defaults.temperature_c),
            rainfall_mm: geometry
                .rainfall_total_mm
                .or(fallback.rainfall)
                .unwrap_or(defaults.rainfall_mm),
        }
    }
}

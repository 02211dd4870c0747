//! Common types used across the platform

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A geographic position in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// Rejected coordinate values
#[derive(Debug, Clone, Copy, Error, PartialEq)]
pub enum CoordinateError {
    #[error("Latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("Longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

impl Coordinate {
    /// Create a validated coordinate
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Create a coordinate from a trusted source without range checks
    pub fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// `[lat, lng]` pair, the order the geometry backend expects for polygons
    pub fn as_lat_lng(&self) -> [f64; 2] {
        [self.latitude, self.longitude]
    }

    /// `[lng, lat]` pair, the order used for polygon bounds
    pub fn as_lng_lat(&self) -> [f64; 2] {
        [self.longitude, self.latitude]
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Arithmetic mean of the latitude and longitude components.
///
/// Returns `None` for an empty slice.
pub fn centroid(points: &[Coordinate]) -> Option<Coordinate> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (lat_sum, lng_sum) = points.iter().fold((0.0, 0.0), |(lat, lng), p| {
        (lat + p.latitude, lng + p.longitude)
    });
    Some(Coordinate::new_unchecked(lat_sum / n, lng_sum / n))
}

/// Serde adapter for `[[lat, lng], ...]` sequences
pub mod lat_lng_pairs {
    use super::Coordinate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Coordinate], serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = points.iter().map(Coordinate::as_lat_lng).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Coordinate>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs
            .into_iter()
            .map(|[lat, lng]| Coordinate::new_unchecked(lat, lng))
            .collect())
    }
}

/// Serde adapter for `[[lng, lat], ...]` sequences
pub mod lng_lat_pairs {
    use super::Coordinate;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(points: &[Coordinate], serializer: S) -> Result<S::Ok, S::Error> {
        let pairs: Vec<[f64; 2]> = points.iter().map(Coordinate::as_lng_lat).collect();
        pairs.serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Coordinate>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs
            .into_iter()
            .map(|[lng, lat]| Coordinate::new_unchecked(lat, lng))
            .collect())
    }
}

/// Tolerant decoders for loosely typed JSON coming from backends and forms.
///
/// Numbers may arrive as numbers, numeric strings, `null`, or placeholder
/// text such as `"NA"`; anything that is not a finite number decodes to `None`.
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    pub fn optional_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
        .filter(|v| v.is_finite()))
    }

    pub fn optional_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<String>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        })
    }
}

//! Field geometry models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::capture::FinalizedPolygon;
use crate::types::{centroid, lat_lng_pairs, lenient, lng_lat_pairs, Coordinate};

/// Polygon snapshot submitted to the geometry backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldMetricsRequest {
    #[serde(with = "lat_lng_pairs")]
    pub polygon: Vec<Coordinate>,
}

impl FieldMetricsRequest {
    pub fn new(polygon: &FinalizedPolygon) -> Self {
        Self {
            polygon: polygon.points().to_vec(),
        }
    }

    pub fn point_count(&self) -> usize {
        self.polygon.len()
    }
}

/// Area, imagery and (optionally) climate/soil data for a field.
///
/// Optional values were not supplied by the backend and must be derived or
/// defaulted downstream. Fields the backend sends beyond these are kept in
/// `extra` so the full result can be forwarded to the advice service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeometryResult {
    #[serde(rename = "area_sq_m", alias = "areaSquareMeters")]
    pub area_square_meters: f64,

    #[serde(default, alias = "imageTileUrl")]
    pub image_tile_url: String,

    /// Boundary as returned by the backend, `[lng, lat]` pairs on the wire
    #[serde(default, with = "lng_lat_pairs", alias = "polygonBounds")]
    pub polygon_bounds: Vec<Coordinate>,

    #[serde(
        default,
        deserialize_with = "lenient::optional_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub state: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(
        default,
        alias = "rainfallTotalMm",
        deserialize_with = "lenient::optional_f64"
    )]
    pub rainfall_total_mm: Option<f64>,

    #[serde(default, alias = "avgTempC", deserialize_with = "lenient::optional_f64")]
    pub avg_temp_c: Option<f64>,

    #[serde(
        rename = "soil_pH",
        default,
        alias = "soilPh",
        alias = "soil_ph",
        deserialize_with = "lenient::optional_f64"
    )]
    pub soil_ph: Option<f64>,

    #[serde(default, alias = "ndviMean", deserialize_with = "lenient::optional_f64")]
    pub ndvi_mean: Option<f64>,

    #[serde(
        default,
        alias = "soilOrganicCarbonPct",
        deserialize_with = "lenient::optional_f64"
    )]
    pub soil_org_carbon_pct: Option<f64>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl GeometryResult {
    /// The backend left temperature or rainfall out
    pub fn needs_weather_fallback(&self) -> bool {
        self.avg_temp_c.is_none() || self.rainfall_total_mm.is_none()
    }

    /// Representative point for area-level lookups
    pub fn bounds_centroid(&self) -> Option<Coordinate> {
        centroid(&self.polygon_bounds)
    }
}

//! WebAssembly bindings for the field delineation UI
//!
//! Provides client-side computation for:
//! - Polygon drawing from map clicks
//! - Land area conversion
//! - Bounds centroid for weather lookups
//! - Crop label checks gating the advice request
//! - Prediction payload assembly with defaults

use wasm_bindgen::prelude::*;
use web_sys::console;

use shared::{
    centroid, format_land_area, lng_lat_pairs, CaptureError, Coordinate, FieldMetricsRequest,
    GeometryResult, MetricDefaults, PolygonCapture, PredictedCrop, PredictionRequest,
    ResolvedClimate, UserProfile, WeatherReading,
};

fn js_error(context: &str, e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&format!("{}: {}", context, e))
}

/// Click-driven polygon capture for the map page
#[wasm_bindgen]
#[derive(Default)]
pub struct PolygonDrawing {
    capture: PolygonCapture,
}

#[wasm_bindgen]
impl PolygonDrawing {
    #[wasm_bindgen(constructor)]
    pub fn new() -> PolygonDrawing {
        PolygonDrawing::default()
    }

    /// Begin (or restart) drawing; earlier points are discarded
    pub fn start_drawing(&mut self) {
        self.capture.start_drawing();
    }

    /// Returns whether the click was recorded; out-of-range points are refused
    pub fn handle_click(&mut self, lat: f64, lng: f64) -> bool {
        match Coordinate::new(lat, lng) {
            Ok(coordinate) => self.capture.handle_click(coordinate),
            Err(_) => false,
        }
    }

    /// Finish drawing; `false` when the polygon was too small and was cleared
    pub fn finish_drawing(&mut self) -> bool {
        match self.capture.finish_drawing() {
            Ok(_) => true,
            Err(CaptureError::TooFewPoints { required, .. }) => {
                console::warn_1(&JsValue::from_str(&format!(
                    "Polygon requires at least {} points to be valid. Clearing points.",
                    required
                )));
                false
            }
            Err(CaptureError::OutOfRange(_)) | Err(CaptureError::NotDrawing) => false,
        }
    }

    pub fn clear(&mut self) {
        self.capture.clear();
    }

    #[wasm_bindgen(getter)]
    pub fn is_drawing(&self) -> bool {
        self.capture.is_drawing()
    }

    #[wasm_bindgen(getter)]
    pub fn point_count(&self) -> usize {
        self.capture.points().len()
    }

    /// Points as `[[lat, lng], ...]` for the map overlay
    pub fn points(&self) -> js_sys::Array {
        self.capture
            .points()
            .iter()
            .map(|p| {
                let pair = js_sys::Array::new();
                pair.push(&JsValue::from_f64(p.latitude));
                pair.push(&JsValue::from_f64(p.longitude));
                JsValue::from(pair)
            })
            .collect()
    }

    /// Body for `POST /calculate`; only available for a finalized polygon
    pub fn request_json(&self) -> Result<String, JsValue> {
        let polygon = self
            .capture
            .finalized()
            .ok_or_else(|| JsValue::from_str("No finalized polygon"))?;
        serde_json::to_string(&FieldMetricsRequest::new(&polygon))
            .map_err(|e| js_error("Failed to encode polygon", e))
    }
}

/// Square meters to a two-decimal hectare string
#[wasm_bindgen]
pub fn land_area_hectares(area_sq_m: f64) -> String {
    format_land_area(area_sq_m)
}

/// Centroid `[lat, lng]` of `polygon_bounds` given as `[[lng, lat], ...]`;
/// `null` for empty bounds
#[wasm_bindgen]
pub fn bounds_centroid(bounds_json: &str) -> Result<JsValue, JsValue> {
    let mut deserializer = serde_json::Deserializer::from_str(bounds_json);
    let bounds = lng_lat_pairs::deserialize(&mut deserializer)
        .map_err(|e| js_error("Invalid bounds JSON", e))?;

    Ok(match centroid(&bounds) {
        Some(c) => {
            let pair = js_sys::Array::new();
            pair.push(&JsValue::from_f64(c.latitude));
            pair.push(&JsValue::from_f64(c.longitude));
            pair.into()
        }
        None => JsValue::NULL,
    })
}

/// `Calculating...` and `Error` report stage status, not a crop
#[wasm_bindgen]
pub fn is_sentinel_label(label: &str) -> bool {
    PredictedCrop::from(label.to_string()).is_sentinel()
}

/// Advice is requested once per result, and never for a sentinel label
#[wasm_bindgen]
pub fn should_request_advice(label: &str, advice_present: bool) -> bool {
    !advice_present && !is_sentinel_label(label)
}

/// Assemble the `POST /predict` body from the stored profile, the geometry
/// result and an optional fallback weather reading, using built-in defaults
#[wasm_bindgen]
pub fn prediction_request_json(
    profile_json: &str,
    geometry_json: &str,
    weather_json: Option<String>,
) -> Result<String, JsValue> {
    let profile: UserProfile = if profile_json.trim().is_empty() {
        UserProfile::default()
    } else {
        serde_json::from_str(profile_json).map_err(|e| js_error("Invalid profile JSON", e))?
    };
    let geometry: GeometryResult =
        serde_json::from_str(geometry_json).map_err(|e| js_error("Invalid geometry JSON", e))?;
    let weather: WeatherReading = match weather_json {
        Some(json) => serde_json::from_str(&json).map_err(|e| js_error("Invalid weather JSON", e))?,
        None => WeatherReading::EMPTY,
    };

    let defaults = MetricDefaults::default();
    let climate = ResolvedClimate::resolve(&geometry, weather, &defaults);
    let request = PredictionRequest::build(&profile, &geometry, climate, &defaults);

    serde_json::to_string(&request).map_err(|e| js_error("Failed to encode request", e))
}

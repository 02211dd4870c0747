//! Derived field metrics and the crop prediction payload

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::crop::PredictedCrop;
use crate::models::defaults::MetricDefaults;
use crate::models::field::GeometryResult;
use crate::models::profile::UserProfile;
use crate::models::weather::ResolvedClimate;

const SQUARE_METERS_PER_HECTARE: i64 = 10_000;

/// Convert square meters to hectares, rounded half away from zero to 2 places
pub fn land_area_hectares(area_square_meters: f64) -> Decimal {
    let area = Decimal::from_f64_retain(area_square_meters).unwrap_or_default();
    let mut hectares = (area / Decimal::from(SQUARE_METERS_PER_HECTARE))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    hectares.rescale(2);
    hectares
}

/// Land area as displayed, e.g. `"8.58"`
pub fn format_land_area(area_square_meters: f64) -> String {
    land_area_hectares(area_square_meters).to_string()
}

/// Human-readable calculation date, e.g. `"Oct 19, 2026"`
pub fn format_calculation_date(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y").to_string()
}

/// Feature vector sent to the crop prediction backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRequest {
    pub state: String,
    pub rainfall_total_mm: f64,
    pub avg_temp_c: f64,
    pub ndvi_mean: f64,
    pub soil_ph: f64,
    pub soil_org_carbon_pct: f64,
    pub fertilizer_rate_kg_per_ha: f64,
    pub pesticide_rate_l_per_ha: f64,
    pub farm_size_ha: f64,
    pub irrigated_area_ha: f64,
}

impl PredictionRequest {
    /// Merge profile fields with geometry-derived fields, defaulting each
    /// missing value independently.
    ///
    /// The state comes from the profile, then the geometry result, then the
    /// defaults table.
    pub fn build(
        profile: &UserProfile,
        geometry: &GeometryResult,
        climate: ResolvedClimate,
        defaults: &MetricDefaults,
    ) -> Self {
        let state = profile
            .state
            .clone()
            .or_else(|| geometry.state.clone())
            .unwrap_or_else(|| defaults.state.clone());

        Self {
            state,
            rainfall_total_mm: climate.rainfall_mm,
            avg_temp_c: climate.temperature_c,
            ndvi_mean: geometry.ndvi_mean.unwrap_or(defaults.ndvi_mean),
            soil_ph: geometry.soil_ph.unwrap_or(defaults.soil_ph),
            soil_org_carbon_pct: geometry
                .soil_org_carbon_pct
                .unwrap_or(defaults.soil_org_carbon_pct),
            fertilizer_rate_kg_per_ha: profile
                .fertilizer_rate_kg_per_ha
                .unwrap_or(defaults.fertilizer_rate_kg_per_ha),
            pesticide_rate_l_per_ha: profile
                .pesticide_rate_l_per_ha
                .unwrap_or(defaults.pesticide_rate_l_per_ha),
            farm_size_ha: profile.farm_size_ha.unwrap_or(defaults.farm_size_ha),
            irrigated_area_ha: profile
                .irrigated_area_ha
                .unwrap_or(defaults.irrigated_area_ha),
        }
    }
}

/// Output of one calculation cycle. Every field is always defined.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
    pub temperature: f64,
    pub rainfall: f64,
    pub soil_ph: f64,
    /// Hectares with two decimals
    pub land_area_ha: String,
    pub ndvi: f64,
    pub soil_organic_carbon: f64,
    pub predicted_crop: PredictedCrop,
    pub image_tile_url: String,
    pub computed_at: DateTime<Utc>,
    pub calculation_date: String,
}

impl DerivedMetrics {
    pub fn assemble(
        geometry: &GeometryResult,
        climate: ResolvedClimate,
        predicted_crop: PredictedCrop,
        defaults: &MetricDefaults,
        computed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            temperature: climate.temperature_c,
            rainfall: climate.rainfall_mm,
            soil_ph: geometry.soil_ph.unwrap_or(defaults.soil_ph),
            land_area_ha: format_land_area(geometry.area_square_meters),
            ndvi: geometry.ndvi_mean.unwrap_or(defaults.ndvi_mean),
            soil_organic_carbon: geometry
                .soil_org_carbon_pct
                .unwrap_or(defaults.soil_org_carbon_pct),
            predicted_crop,
            image_tile_url: geometry.image_tile_url.clone(),
            computed_at,
            calculation_date: format_calculation_date(computed_at),
        }
    }
}
